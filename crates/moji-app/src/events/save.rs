use moji_types::AppEvent;

use crate::events::EventContext;

/// Persist the current output (and picked image, if any)
pub async fn handle_save_result(ctx: &mut EventContext) -> anyhow::Result<()> {
    let view = ctx.view.get();
    if view.output_text.trim().is_empty() {
        ctx.notify(AppEvent::error("Nothing to save")).await;
        return Ok(());
    }

    let owner = ctx.state.config.read().await.store.user_id.clone();

    let saved = moji_store::save_result(
        ctx.services.objects.as_ref(),
        ctx.services.documents.as_ref(),
        &owner,
        &view.output_text,
        view.last_translation.as_deref().unwrap_or_default(),
        view.image_path.as_deref(),
    )
    .await;

    match saved {
        Ok(saved) => {
            let message = if saved.record.image_url.is_empty() {
                "Saved".to_string()
            } else {
                "Uploaded and saved".to_string()
            };
            ctx.notify(AppEvent::info(message)).await;
        }
        Err(e) => {
            tracing::warn!("[STORE] Save failed: {}", e);
            ctx.notify(AppEvent::error(format!("Save failed: {e}"))).await;
        }
    }

    Ok(())
}
