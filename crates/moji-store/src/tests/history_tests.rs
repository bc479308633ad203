use chrono::{TimeZone, Utc};

use crate::{TranslationRecord, filter_records, format_timestamp_kst};

#[test]
fn filter_ignores_case_and_blank_query() {
    let records = vec![
        TranslationRecord::new("Hello World", "", ""),
        TranslationRecord::new("안녕 세계", "", ""),
        TranslationRecord::new("hello again", "", ""),
    ];

    let hits: Vec<&str> = filter_records(&records, "HELLO")
        .into_iter()
        .map(|r| r.convert_data.as_str())
        .collect();
    assert_eq!(hits, ["Hello World", "hello again"]);

    assert_eq!(filter_records(&records, "세계").len(), 1);
    assert_eq!(filter_records(&records, "  ").len(), 3);
    assert!(filter_records(&records, "bonjour").is_empty());
}

#[test]
fn timestamps_render_in_kst() {
    let utc = Utc.with_ymd_and_hms(2024, 5, 31, 20, 30, 15).single();
    assert_eq!(format_timestamp_kst(utc), "2024-06-01 05:30:15");
    assert_eq!(format_timestamp_kst(None), "N/A");
}
