use chrono::{DateTime, FixedOffset, Utc};

use crate::TranslationRecord;

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Records whose text contains `query`, ignoring case. Empty query keeps all.
pub fn filter_records<'a>(
    records: &'a [TranslationRecord],
    query: &str,
) -> Vec<&'a TranslationRecord> {
    let query = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| query.is_empty() || r.convert_data.to_lowercase().contains(&query))
        .collect()
}

/// `yyyy-MM-dd HH:mm:ss` in Korea Standard Time, "N/A" when missing
pub fn format_timestamp_kst(timestamp: Option<DateTime<Utc>>) -> String {
    let Some(timestamp) = timestamp else {
        return "N/A".to_string();
    };

    match FixedOffset::east_opt(KST_OFFSET_SECS) {
        Some(kst) => timestamp
            .with_timezone(&kst)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "N/A".to_string(),
    }
}
