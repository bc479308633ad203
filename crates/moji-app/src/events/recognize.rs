use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use moji_ocr::TextRecognizer;
use moji_types::{AppEvent, TextSource};

use crate::events::{Completion, EventContext};

pub async fn handle_load_image(ctx: &mut EventContext, path: PathBuf) -> anyhow::Result<()> {
    let ocr_enabled = ctx.state.config.read().await.ocr.enabled;
    if !ocr_enabled {
        ctx.notify(AppEvent::error("Text recognition is disabled"))
            .await;
        return Ok(());
    }

    tracing::debug!(">>> [OCR] Loading {}", path.display());

    ctx.view.update(|s| {
        s.image_path = Some(path.clone());
        s.translated_text.clear();
        s.last_translation = None;
    });
    ctx.pending_recognitions += 1;
    ctx.refresh_loading();

    let recognizer = ctx.services.recognizer.clone();
    let completion_tx = ctx.completion_tx.clone();

    tokio::spawn(async move {
        let outcome = recognize_file(recognizer, path.clone()).await;

        if let Err(e) = completion_tx
            .send(Completion::Recognized { path, outcome })
            .await
        {
            tracing::warn!(">>> [OCR] Event loop gone before result arrived: {}", e);
        }
    });

    Ok(())
}

async fn recognize_file(
    recognizer: Arc<dyn TextRecognizer>,
    path: PathBuf,
) -> anyhow::Result<String> {
    let png = tokio::task::spawn_blocking(move || moji_ocr::load_image(&path))
        .await
        .context("Image task panicked")??;
    recognizer.recognize(&png).await
}

pub async fn handle_recognized(
    ctx: &mut EventContext,
    path: PathBuf,
    outcome: anyhow::Result<String>,
) -> anyhow::Result<()> {
    ctx.pending_recognitions = ctx.pending_recognitions.saturating_sub(1);
    ctx.refresh_loading();

    match outcome {
        Ok(raw) => {
            let text = moji_ocr::clean_text(&raw);
            tracing::debug!(">>> [OCR] Got text: {} chars", text.chars().count());

            if text.is_empty() {
                ctx.notify(AppEvent::info("No text found")).await;
            }

            ctx.view.update(|s| {
                s.output_text = text.clone();
                s.output_source = Some(TextSource::Ocr);
            });
            ctx.notify(AppEvent::RawTextInput {
                text,
                source: TextSource::Ocr,
            })
            .await;
        }
        Err(e) => {
            tracing::error!(">>> [OCR] Failed for {}: {:#}", path.display(), e);
            ctx.notify(AppEvent::error(format!("Text recognition failed: {e:#}")))
                .await;
        }
    }

    Ok(())
}
