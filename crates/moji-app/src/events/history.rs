use anyhow::Context;
use moji_store::{DocumentStore, TranslationRecord, filter_records, format_timestamp_kst};
use moji_types::{AppEvent, HistoryEntry};

use crate::events::EventContext;

pub async fn handle_fetch_history(ctx: &mut EventContext, query: &str) -> anyhow::Result<()> {
    let owner = ctx.state.config.read().await.store.user_id.clone();

    let records = ctx
        .services
        .documents
        .list(&owner)
        .await
        .with_context(|| format!("Failed to load history for '{owner}'"))?;

    let entries: Vec<HistoryEntry> = filter_records(&records, query)
        .into_iter()
        .map(to_entry)
        .collect();

    tracing::debug!(
        "[HISTORY] {} of {} records match '{}'",
        entries.len(),
        records.len(),
        query
    );

    ctx.view.update(|s| s.history = entries.clone());
    ctx.notify(AppEvent::ShowHistory(entries)).await;

    Ok(())
}

fn to_entry(record: &TranslationRecord) -> HistoryEntry {
    HistoryEntry {
        timestamp: format_timestamp_kst(record.timestamp),
        text: record.convert_data.clone(),
        translation: record.search_data.clone(),
        image_url: record.image_url.clone(),
    }
}
