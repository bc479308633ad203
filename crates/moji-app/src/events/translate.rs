use moji_translator::{SessionError, Ticket};
use moji_types::AppEvent;

use crate::events::{Completion, EventContext};

/// Download the model if needed, then translate the current output text.
///
/// The work runs on its own task and reports back with the ticket it was
/// issued under; the loop keeps handling events meanwhile.
pub async fn handle_translate(ctx: &mut EventContext) -> anyhow::Result<()> {
    let text = ctx.view.get().output_text;
    if text.trim().is_empty() {
        ctx.notify(AppEvent::error("Nothing to translate")).await;
        return Ok(());
    }

    let Some(ticket) = ctx.session.ticket().cloned() else {
        let message = failure_message(&SessionError::NotConfigured);
        ctx.view.update(|s| {
            s.translated_text = message.clone();
            s.last_translation = None;
        });
        ctx.notify(AppEvent::error(message)).await;
        return Ok(());
    };

    tracing::info!(
        "[TRANSLATE] {} chars, {} (generation {})",
        text.chars().count(),
        ticket.pair,
        ticket.generation
    );

    let download = ctx.session.ensure_model_available();
    let translate = ctx.session.translate(&text);
    let completion_tx = ctx.completion_tx.clone();

    ctx.pending_translations += 1;
    ctx.refresh_loading();

    tokio::spawn(async move {
        let outcome = match download.await {
            Ok(()) => translate.await,
            Err(e) => Err(e),
        };

        if let Err(e) = completion_tx
            .send(Completion::Translated { ticket, outcome })
            .await
        {
            tracing::warn!("[TRANSLATE] Event loop gone before result arrived: {}", e);
        }
    });

    Ok(())
}

pub async fn handle_translated(
    ctx: &mut EventContext,
    ticket: Ticket,
    outcome: Result<String, SessionError>,
) -> anyhow::Result<()> {
    ctx.pending_translations = ctx.pending_translations.saturating_sub(1);
    ctx.refresh_loading();

    if !ctx.session.is_current(&ticket) {
        tracing::debug!(
            "[TRANSLATE] Dropping stale result for {} (generation {})",
            ticket.pair,
            ticket.generation
        );
        return Ok(());
    }

    match outcome {
        Ok(text) => {
            tracing::debug!("[TRANSLATE] Done: {} chars", text.chars().count());
            ctx.view.update(|s| {
                s.translated_text = text.clone();
                s.last_translation = Some(text.clone());
            });
            ctx.notify(AppEvent::ShowTranslation {
                text,
                from_lang: ticket.pair.source.to_string(),
                to_lang: ticket.pair.target.to_string(),
            })
            .await;
        }
        Err(e) => {
            tracing::warn!("[TRANSLATE] Failed: {}", e);
            let message = failure_message(&e);
            ctx.view.update(|s| {
                s.translated_text = message.clone();
                s.last_translation = None;
            });
            ctx.notify(AppEvent::error(message)).await;
        }
    }

    Ok(())
}

/// Text shown in place of a translation
pub fn failure_message(error: &SessionError) -> String {
    match error {
        SessionError::ModelDownloadFailed(_) | SessionError::TranslationFailed(_) => {
            error.to_string()
        }
        other => format!("Translation failed: {other}"),
    }
}
