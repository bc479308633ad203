use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    LanguageCode, LanguagePair, NetworkPolicy, ProviderMetadata, TranslateError,
    TranslationBackend, TranslatorClient,
};

/// Simulated connection the in-memory backend downloads over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connection {
    #[default]
    Wifi,
    Cellular,
    Offline,
}

impl FromStr for Connection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wifi" | "wi-fi" => Ok(Connection::Wifi),
            "cellular" | "mobile" => Ok(Connection::Cellular),
            "offline" | "none" => Ok(Connection::Offline),
            other => Err(format!("unknown connection kind '{other}'")),
        }
    }
}

/// Phrase tables keyed by pair ("ko:en" -> source phrase -> translation)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phrasebook {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Phrasebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small Korean/English table so the offline backend is usable out of the box
    pub fn builtin() -> Self {
        let pairs = [
            ("안녕", "hello"),
            ("안녕하세요", "hello"),
            ("테스트", "test"),
            ("감사합니다", "thank you"),
            ("번역", "translation"),
            ("사진", "photo"),
            ("글자", "letter"),
            ("세계", "world"),
        ];

        let mut book = Self::new();
        for (ko, en) in pairs {
            book.insert(&LanguagePair::new("ko", "en"), ko, en);
            book.insert(&LanguagePair::new("en", "ko"), en, ko);
        }
        book
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, pair: &LanguagePair, phrase: &str, translation: &str) {
        self.tables
            .entry(pair.key())
            .or_default()
            .insert(phrase.to_string(), translation.to_string());
    }

    pub fn with(mut self, pair: &LanguagePair, phrase: &str, translation: &str) -> Self {
        self.insert(pair, phrase, translation);
        self
    }

    /// Whole phrase first, then token by token
    pub fn lookup(&self, pair: &LanguagePair, text: &str) -> Result<String, TranslateError> {
        let text = text.trim();
        if text.is_empty() || pair.source == pair.target {
            return Ok(text.to_string());
        }

        let table = self.tables.get(&pair.key());

        if let Some(hit) = table.and_then(|t| t.get(text)) {
            return Ok(hit.clone());
        }

        let mut words = Vec::new();
        for token in text.split_whitespace() {
            match table.and_then(|t| t.get(token)) {
                Some(word) => words.push(word.as_str()),
                None => return Err(TranslateError::MissingPhrase(token.to_string())),
            }
        }

        Ok(words.join(" "))
    }
}

/// Call counters, mostly for asserting what reached the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub downloads: usize,
    pub translations: usize,
    pub deletions: usize,
}

struct Inner {
    phrasebook: Phrasebook,
    downloaded: BTreeSet<LanguageCode>,
    connection: Connection,
    fail_deletions: bool,
    calls: CallCounts,
}

/// In-process backend with a phrasebook and a simulated model store.
///
/// English ships pre-installed, every other language has to be downloaded
/// before translating.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    pub fn new(phrasebook: Phrasebook) -> Self {
        let mut downloaded = BTreeSet::new();
        downloaded.insert(LanguageCode::new("en"));

        Self {
            inner: Arc::new(Mutex::new(Inner {
                phrasebook,
                downloaded,
                connection: Connection::default(),
                fail_deletions: false,
                calls: CallCounts::default(),
            })),
        }
    }

    pub fn with_connection(self, connection: Connection) -> Self {
        self.set_connection(connection);
        self
    }

    pub fn set_connection(&self, connection: Connection) {
        self.lock().connection = connection;
    }

    /// Make every following model deletion fail
    pub fn set_fail_deletions(&self, fail: bool) {
        self.lock().fail_deletions = fail;
    }

    pub fn mark_downloaded(&self, language: impl Into<LanguageCode>) {
        self.lock().downloaded.insert(language.into());
    }

    pub fn is_downloaded(&self, language: &LanguageCode) -> bool {
        self.lock().downloaded.contains(language)
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(Phrasebook::builtin())
    }
}

#[async_trait]
impl TranslationBackend for MemoryBackend {
    fn client(&self, pair: &LanguagePair) -> Result<Arc<dyn TranslatorClient>, TranslateError> {
        for code in [&pair.source, &pair.target] {
            if !self.is_supported(code) {
                return Err(TranslateError::UnsupportedLanguage(code.to_string()));
            }
        }

        Ok(Arc::new(MemoryClient {
            backend: self.clone(),
            pair: pair.clone(),
        }))
    }

    fn is_supported(&self, language: &LanguageCode) -> bool {
        language.is_catalogued()
    }

    async fn delete_model(&self, language: &LanguageCode) -> Result<(), TranslateError> {
        let mut inner = self.lock();
        inner.calls.deletions += 1;

        if inner.fail_deletions {
            return Err(TranslateError::ApiError(format!(
                "model manager refused to delete '{language}'"
            )));
        }
        if !self.is_supported(language) {
            return Err(TranslateError::UnsupportedLanguage(language.to_string()));
        }

        inner.downloaded.remove(language);
        Ok(())
    }

    async fn downloaded_models(&self) -> Result<Vec<LanguageCode>, TranslateError> {
        Ok(self.lock().downloaded.iter().cloned().collect())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "memory".to_string(),
            requires_api_key: false,
            on_device: true,
        }
    }
}

struct MemoryClient {
    backend: MemoryBackend,
    pair: LanguagePair,
}

#[async_trait]
impl TranslatorClient for MemoryClient {
    fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    async fn ensure_model_downloaded(&self, policy: NetworkPolicy) -> Result<(), TranslateError> {
        let mut inner = self.backend.lock();
        inner.calls.downloads += 1;

        let missing: Vec<LanguageCode> = [&self.pair.source, &self.pair.target]
            .into_iter()
            .filter(|code| !inner.downloaded.contains(*code))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        match (inner.connection, policy) {
            (Connection::Offline, _) => return Err(TranslateError::NetworkUnavailable),
            (Connection::Cellular, NetworkPolicy::WifiOnly) => {
                return Err(TranslateError::WifiRequired);
            }
            _ => {}
        }

        for code in missing {
            tracing::debug!("[MEMORY] Downloaded model '{}'", code);
            inner.downloaded.insert(code);
        }

        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let mut inner = self.backend.lock();
        inner.calls.translations += 1;

        for code in [&self.pair.source, &self.pair.target] {
            if !inner.downloaded.contains(code) {
                return Err(TranslateError::ModelNotDownloaded(code.to_string()));
            }
        }

        inner.phrasebook.lookup(&self.pair, text)
    }
}
