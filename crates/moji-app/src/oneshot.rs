use std::time::Duration;

use anyhow::{Context, bail};
use kanal::{AsyncReceiver, AsyncSender};
use moji_types::{AppEvent, NoticeLevel};

use crate::repl::format_event;

/// One request plus the event that marks it finished
pub struct Step {
    pub event: AppEvent,
    pub done: fn(&AppEvent) -> bool,
}

impl Step {
    pub fn new(event: AppEvent, done: fn(&AppEvent) -> bool) -> Self {
        Self { event, done }
    }
}

pub fn is_translation(event: &AppEvent) -> bool {
    matches!(event, AppEvent::ShowTranslation { .. })
}

pub fn is_recognized(event: &AppEvent) -> bool {
    matches!(event, AppEvent::RawTextInput { .. })
}

pub fn is_history(event: &AppEvent) -> bool {
    matches!(event, AppEvent::ShowHistory(_))
}

pub fn is_models(event: &AppEvent) -> bool {
    matches!(event, AppEvent::ShowModels(_))
}

pub fn is_info_notice(event: &AppEvent) -> bool {
    matches!(
        event,
        AppEvent::Notice {
            level: NoticeLevel::Info,
            ..
        }
    )
}

/// Fire-and-wait: send setup events, then each step in order, printing what
/// comes back. An error notice ends the run with that error.
pub async fn run_steps(
    app_to_ui_rx: &AsyncReceiver<AppEvent>,
    ui_to_app_tx: &AsyncSender<AppEvent>,
    setup: Vec<AppEvent>,
    steps: Vec<Step>,
    timeout: Duration,
) -> anyhow::Result<()> {
    wait_for(app_to_ui_rx, |e| matches!(e, AppEvent::BackendReady), timeout).await?;

    for event in setup {
        ui_to_app_tx.send(event).await?;
    }

    for step in steps {
        ui_to_app_tx.send(step.event).await?;
        wait_for(app_to_ui_rx, step.done, timeout).await?;
    }

    Ok(())
}

async fn wait_for(
    app_to_ui_rx: &AsyncReceiver<AppEvent>,
    done: impl Fn(&AppEvent) -> bool,
    timeout: Duration,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::time::timeout(timeout, app_to_ui_rx.recv())
            .await
            .context("Timed out waiting for the app")??;

        if let AppEvent::Notice {
            level: NoticeLevel::Error,
            message,
        } = &event
            && !done(&event)
        {
            bail!("{message}");
        }

        if let Some(text) = format_event(&event) {
            println!("{text}");
        }

        if done(&event) {
            return Ok(());
        }
    }
}
