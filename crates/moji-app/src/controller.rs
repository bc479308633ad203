use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use moji_types::{AppEvent, ViewState};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::services::Services;
use crate::state::AppState;
use crate::view::ViewModel;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256),
            ui_to_app: kanal::bounded_async(64),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    view: ViewModel,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            view: ViewModel::new(ViewState::default()),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// Front end side of the channels: (events from the app, sender into the app)
    pub fn ui_handle(&self) -> (AsyncReceiver<AppEvent>, AsyncSender<AppEvent>) {
        (
            self.channels.app_to_ui.1.clone(),
            self.channels.ui_to_app.0.clone(),
        )
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn_tasks(&self, services: Services) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            self.state.clone(),
            services,
            self.view.clone(),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
