use std::sync::Arc;

use moji_types::ViewState;
use tokio::sync::watch;

/// Observable view state. Only the event loop writes; any number of front
/// ends subscribe.
#[derive(Clone)]
pub struct ViewModel {
    tx: Arc<watch::Sender<ViewState>>,
}

impl ViewModel {
    pub fn new(initial: ViewState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn get(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut ViewState)) {
        self.tx.send_modify(f);
    }
}
