use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::{LanguageCode, LanguagePair, NetworkPolicy, TranslationBackend, TranslatorClient};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Translator is not configured")]
    NotConfigured,

    #[error("Model download failed: {0}")]
    ModelDownloadFailed(String),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Model deletion failed: {0}")]
    ModelDeletionFailed(String),

    #[error("Listing models failed: {0}")]
    ModelListFailed(String),
}

/// Identifies the binding an operation was issued against.
///
/// The session never cancels in-flight work; owners compare tickets to drop
/// outcomes that belong to a superseded pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub pair: LanguagePair,
}

enum SessionState {
    Unconfigured,
    Configured {
        ticket: Ticket,
        client: Arc<dyn TranslatorClient>,
    },
}

/// Holds at most one translator bound to a language pair.
///
/// Single writer: `configure` needs `&mut self`. The async operations return
/// `'static` futures owning a handle to the client they were issued on, so
/// the owner can reconfigure while they are still running.
pub struct TranslationSession {
    backend: Arc<dyn TranslationBackend>,
    policy: NetworkPolicy,
    state: SessionState,
    generation: u64,
}

impl TranslationSession {
    pub fn new(backend: Arc<dyn TranslationBackend>, policy: NetworkPolicy) -> Self {
        Self {
            backend,
            policy,
            state: SessionState::Unconfigured,
            generation: 0,
        }
    }

    /// Bind a new pair, discarding the previous binding.
    ///
    /// On `InvalidLanguage` the previous binding stays in place.
    pub fn configure(
        &mut self,
        source: impl Into<LanguageCode>,
        target: impl Into<LanguageCode>,
    ) -> Result<Ticket, SessionError> {
        let pair = LanguagePair::new(source, target);

        for code in [&pair.source, &pair.target] {
            if code.as_str().is_empty() || !self.backend.is_supported(code) {
                return Err(SessionError::InvalidLanguage(code.to_string()));
            }
        }

        let client = self
            .backend
            .client(&pair)
            .map_err(|e| SessionError::InvalidLanguage(e.to_string()))?;

        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
            pair,
        };

        tracing::debug!(
            "[SESSION] Bound {} (generation {})",
            ticket.pair,
            ticket.generation
        );

        self.state = SessionState::Configured {
            ticket: ticket.clone(),
            client,
        };

        Ok(ticket)
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        match &self.state {
            SessionState::Unconfigured => None,
            SessionState::Configured { ticket, .. } => Some(ticket),
        }
    }

    pub fn pair(&self) -> Option<&LanguagePair> {
        self.ticket().map(|t| &t.pair)
    }

    /// Whether an outcome issued under `ticket` belongs to the current binding
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.ticket() == Some(ticket)
    }

    pub fn network_policy(&self) -> NetworkPolicy {
        self.policy
    }

    pub fn set_network_policy(&mut self, policy: NetworkPolicy) {
        self.policy = policy;
    }

    /// Download the configured pair's model if it is missing
    pub fn ensure_model_available(&self) -> BoxFuture<'static, Result<(), SessionError>> {
        let Some(client) = self.client() else {
            return future::ready(Err(SessionError::NotConfigured)).boxed();
        };
        let policy = self.policy;

        async move {
            client
                .ensure_model_downloaded(policy)
                .await
                .map_err(|e| SessionError::ModelDownloadFailed(e.to_string()))
        }
        .boxed()
    }

    /// Translate with the configured pair. Does not download anything.
    pub fn translate(&self, text: &str) -> BoxFuture<'static, Result<String, SessionError>> {
        let Some(client) = self.client() else {
            return future::ready(Err(SessionError::NotConfigured)).boxed();
        };
        let text = text.to_string();

        async move {
            client
                .translate(&text)
                .await
                .map_err(|e| SessionError::TranslationFailed(e.to_string()))
        }
        .boxed()
    }

    /// Delete a downloaded model, independent of the current binding
    pub fn release_model(
        &self,
        language: impl Into<LanguageCode>,
    ) -> BoxFuture<'static, Result<(), SessionError>> {
        let backend = Arc::clone(&self.backend);
        let language = language.into();

        async move {
            backend
                .delete_model(&language)
                .await
                .map_err(|e| SessionError::ModelDeletionFailed(e.to_string()))
        }
        .boxed()
    }

    pub fn downloaded_models(&self) -> BoxFuture<'static, Result<Vec<LanguageCode>, SessionError>> {
        let backend = Arc::clone(&self.backend);

        async move {
            backend
                .downloaded_models()
                .await
                .map_err(|e| SessionError::ModelListFailed(e.to_string()))
        }
        .boxed()
    }

    fn client(&self) -> Option<Arc<dyn TranslatorClient>> {
        match &self.state {
            SessionState::Unconfigured => None,
            SessionState::Configured { client, .. } => Some(Arc::clone(client)),
        }
    }
}
