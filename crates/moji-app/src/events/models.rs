use moji_translator::{LanguageCode, SessionError};
use moji_types::AppEvent;

use crate::events::{Completion, EventContext};

/// Delete a model off the loop; the outcome comes back as a `Completion`
pub async fn handle_release_model(ctx: &mut EventContext, code: String) -> anyhow::Result<()> {
    let release = ctx.session.release_model(code.as_str());
    let completion_tx = ctx.completion_tx.clone();

    tokio::spawn(async move {
        let outcome = release.await;
        if let Err(e) = completion_tx
            .send(Completion::ModelReleased {
                language: code,
                outcome,
            })
            .await
        {
            tracing::warn!("[MODELS] Event loop gone before deletion finished: {}", e);
        }
    });

    Ok(())
}

pub async fn handle_model_released(
    ctx: &mut EventContext,
    language: String,
    outcome: Result<(), SessionError>,
) -> anyhow::Result<()> {
    match outcome {
        Ok(()) => {
            tracing::info!("[MODELS] Released '{}'", language);
            ctx.notify(AppEvent::info(format!("Model '{language}' deleted")))
                .await;
        }
        Err(e) => {
            tracing::warn!("[MODELS] {}", e);
            ctx.notify(AppEvent::error(e.to_string())).await;
        }
    }

    handle_list_models(ctx).await
}

pub async fn handle_list_models(ctx: &mut EventContext) -> anyhow::Result<()> {
    let listing = ctx.session.downloaded_models();
    let completion_tx = ctx.completion_tx.clone();

    tokio::spawn(async move {
        let outcome = listing.await;
        if let Err(e) = completion_tx.send(Completion::ModelsListed(outcome)).await {
            tracing::warn!("[MODELS] Event loop gone before listing finished: {}", e);
        }
    });

    Ok(())
}

pub async fn handle_models_listed(
    ctx: &mut EventContext,
    outcome: Result<Vec<LanguageCode>, SessionError>,
) -> anyhow::Result<()> {
    let models: Vec<String> = match outcome {
        Ok(models) => models.into_iter().map(|code| code.to_string()).collect(),
        Err(e) => {
            tracing::warn!("[MODELS] {}", e);
            ctx.notify(AppEvent::error(e.to_string())).await;
            return Ok(());
        }
    };

    ctx.view.update(|s| s.downloaded_models = models.clone());
    ctx.notify(AppEvent::ShowModels(models)).await;

    Ok(())
}
