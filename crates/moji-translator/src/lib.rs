pub mod deepl;
pub mod language;
pub mod memory;
pub mod session;


use std::sync::Arc;

pub use deepl::DeeplBackend;
pub use language::{LanguageCode, LanguagePair, SUPPORTED_LANGUAGES};
pub use memory::{CallCounts, Connection, MemoryBackend, Phrasebook};
pub use session::{SessionError, Ticket, TranslationSession};

/// Download condition handed to the backend when fetching a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkPolicy {
    Any,
    #[default]
    WifiOnly,
}

/// Translation provider interface.
///
/// Constructing a client is synchronous and does no I/O; everything that
/// touches models or the network happens on the client or the model manager.
#[async_trait::async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Bind a client to a language pair
    fn client(&self, pair: &LanguagePair) -> Result<Arc<dyn TranslatorClient>, TranslateError>;

    /// Whether the backend knows this language at all
    fn is_supported(&self, language: &LanguageCode) -> bool;

    /// Delete a downloaded model. Deleting a model that is not present succeeds.
    async fn delete_model(&self, language: &LanguageCode) -> Result<(), TranslateError>;

    /// Models currently present on this device
    async fn downloaded_models(&self) -> Result<Vec<LanguageCode>, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

/// Client bound to one language pair
#[async_trait::async_trait]
pub trait TranslatorClient: Send + Sync {
    fn pair(&self) -> &LanguagePair;

    /// Download the models for this pair if they are missing
    async fn ensure_model_downloaded(&self, policy: NetworkPolicy) -> Result<(), TranslateError>;

    /// Translate with already present models
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
    pub on_device: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Model for '{0}' is not downloaded")]
    ModelNotDownloaded(String),

    #[error("No network connection")]
    NetworkUnavailable,

    #[error("Wi-Fi connection required to download models")]
    WifiRequired,

    #[error("No phrasebook entry for '{0}'")]
    MissingPhrase(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,
}
