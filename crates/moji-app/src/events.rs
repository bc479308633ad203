use std::path::PathBuf;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use moji_translator::{LanguageCode, SessionError, Ticket, TranslationSession};
use moji_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::services::Services;
use crate::state::AppState;
use crate::view::ViewModel;

pub mod history;
pub mod language;
pub mod models;
pub mod recognize;
pub mod save;
pub mod translate;

use history::handle_fetch_history;
use language::{configure_initial, handle_language_change};
use models::{
    handle_list_models, handle_model_released, handle_models_listed, handle_release_model,
};
use recognize::{handle_load_image, handle_recognized};
use save::handle_save_result;
use translate::{handle_translate, handle_translated};

/// Results of work the loop spawned, fed back into the loop
pub enum Completion {
    Translated {
        ticket: Ticket,
        outcome: Result<String, SessionError>,
    },
    Recognized {
        path: PathBuf,
        outcome: anyhow::Result<String>,
    },
    ModelReleased {
        language: String,
        outcome: Result<(), SessionError>,
    },
    ModelsListed(Result<Vec<LanguageCode>, SessionError>),
}

/// Everything a handler may touch. The session is owned here and only
/// the loop task holds this context.
pub struct EventContext {
    pub state: Arc<AppState>,
    pub services: Services,
    pub view: ViewModel,
    pub session: TranslationSession,
    pub app_to_ui_tx: AsyncSender<AppEvent>,
    pub completion_tx: AsyncSender<Completion>,
    pub pending_translations: usize,
    pub pending_recognitions: usize,
}

impl EventContext {
    /// Best effort; a closed front end is not an error for the loop
    pub async fn notify(&self, event: AppEvent) {
        if let Err(e) = self.app_to_ui_tx.send(event).await {
            tracing::debug!("[EVENT_LOOP] Front end gone: {}", e);
        }
    }

    pub fn refresh_loading(&self) {
        let loading = self.pending_translations + self.pending_recognitions > 0;
        self.view.update(|s| s.is_loading = loading);
    }
}

/// App's main loop
pub async fn event_loop(
    state: Arc<AppState>,
    services: Services,
    view: ViewModel,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let (completion_tx, completion_rx) = kanal::bounded_async(64);

    let session = TranslationSession::new(services.backend.clone(), services.network_policy);

    let mut ctx = EventContext {
        state,
        services,
        view,
        session,
        app_to_ui_tx,
        completion_tx,
        pending_translations: 0,
        pending_recognitions: 0,
    };

    configure_initial(&mut ctx).await;
    ctx.notify(AppEvent::BackendReady).await;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = ui_to_app_rx.recv() => {
                let event = event?;
                if matches!(event, AppEvent::Shutdown) {
                    tracing::info!("[EVENT_LOOP] Shutdown requested");
                    break;
                }

                tracing::debug!(
                    "[EVENT_LOOP] Event received: {:?}",
                    std::mem::discriminant(&event)
                );
                if let Err(e) = handle_events(&mut ctx, event).await {
                    tracing::error!("[EVENT_LOOP] Handler failed: {:#}", e);
                    ctx.notify(AppEvent::error(format!("{e:#}"))).await;
                }
            }
            done = completion_rx.recv() => {
                // The loop holds a sender itself, so this never reports closed
                let done = done?;
                if let Err(e) = handle_completion(&mut ctx, done).await {
                    tracing::error!("[EVENT_LOOP] Completion failed: {:#}", e);
                    ctx.notify(AppEvent::error(format!("{e:#}"))).await;
                }
            }
        }
    }

    Ok(())
}

async fn handle_events(ctx: &mut EventContext, event: AppEvent) -> anyhow::Result<()> {
    match event {
        AppEvent::TextInput(text) => {
            ctx.view.update(|s| {
                s.output_text = text;
                s.output_source = Some(moji_types::TextSource::Manual);
                s.translated_text.clear();
                s.last_translation = None;
                s.image_path = None;
            });
        }
        AppEvent::Translate => handle_translate(ctx).await?,
        AppEvent::SetSourceLanguage(code) => {
            let target = ctx.view.get().target_language;
            handle_language_change(ctx, code, target).await?;
        }
        AppEvent::SetTargetLanguage(code) => {
            let source = ctx.view.get().source_language;
            handle_language_change(ctx, source, code).await?;
        }
        AppEvent::SwapLanguages => {
            let view = ctx.view.get();
            handle_language_change(ctx, view.target_language, view.source_language).await?;
        }
        AppEvent::LoadImage(path) => handle_load_image(ctx, path).await?,
        AppEvent::SaveResult => handle_save_result(ctx).await?,
        AppEvent::FetchHistory { query } => handle_fetch_history(ctx, &query).await?,
        AppEvent::ReleaseModel(code) => handle_release_model(ctx, code).await?,
        AppEvent::ListModels => handle_list_models(ctx).await?,
        AppEvent::Shutdown => {}
        AppEvent::BackendReady
        | AppEvent::Notice { .. }
        | AppEvent::RawTextInput { .. }
        | AppEvent::ShowTranslation { .. }
        | AppEvent::ShowHistory(_)
        | AppEvent::ShowModels(_) => {
            // Front end bound events, nothing to do in the backend
        }
    }

    Ok(())
}

async fn handle_completion(ctx: &mut EventContext, done: Completion) -> anyhow::Result<()> {
    match done {
        Completion::Translated { ticket, outcome } => handle_translated(ctx, ticket, outcome).await,
        Completion::Recognized { path, outcome } => handle_recognized(ctx, path, outcome).await,
        Completion::ModelReleased { language, outcome } => {
            handle_model_released(ctx, language, outcome).await
        }
        Completion::ModelsListed(outcome) => handle_models_listed(ctx, outcome).await,
    }
}
