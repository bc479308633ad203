use std::sync::Arc;

use anyhow::{Context, bail};
use moji_config::Config;
use moji_ocr::{TesseractRecognizer, TextRecognizer};
use moji_store::{DocumentStore, LocalStore, ObjectStore};
use moji_translator::{
    Connection, DeeplBackend, MemoryBackend, NetworkPolicy, Phrasebook, ProviderMetadata,
    TranslationBackend,
};

/// External collaborators the event loop talks to
#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn TranslationBackend>,
    pub network_policy: NetworkPolicy,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub objects: Arc<dyn ObjectStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Services {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = build_backend(config)?;
        let metadata = backend.metadata();
        tracing::info!(
            "Translation provider: {} ({})",
            metadata.name,
            if metadata.on_device { "on-device models" } else { "remote" }
        );
        if let Some(warning) = missing_key_warning(&metadata, config) {
            tracing::warn!("{warning}");
        }

        let network_policy = if config.translator.require_wifi {
            NetworkPolicy::WifiOnly
        } else {
            NetworkPolicy::Any
        };

        let store = Arc::new(LocalStore::new(&config.store.root));

        Ok(Self {
            backend,
            network_policy,
            recognizer: Arc::new(TesseractRecognizer::new(
                config.ocr.command.clone(),
                config.ocr.language.clone(),
            )),
            objects: store.clone(),
            documents: store,
        })
    }
}

fn build_backend(config: &Config) -> anyhow::Result<Arc<dyn TranslationBackend>> {
    match config.translator.provider.as_str() {
        "memory" => {
            let mut phrasebook = Phrasebook::builtin();
            if let Some(path) = &config.translator.phrasebook_path {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read phrasebook {path}"))?;
                phrasebook = Phrasebook::from_json(&data)
                    .with_context(|| format!("Failed to parse phrasebook {path}"))?;
            }

            let connection: Connection = config
                .network
                .connection
                .parse()
                .map_err(anyhow::Error::msg)?;

            Ok(Arc::new(
                MemoryBackend::new(phrasebook).with_connection(connection),
            ))
        }
        "deepl" => Ok(Arc::new(DeeplBackend::new(
            config.translator.api_key.clone(),
            config.translator.api_url.clone(),
        ))),
        other => bail!("Unknown translation provider '{other}'"),
    }
}

/// Providers that need a key cannot translate without one
pub fn missing_key_warning(metadata: &ProviderMetadata, config: &Config) -> Option<String> {
    (metadata.requires_api_key && config.translator.api_key.is_empty()).then(|| {
        format!(
            "{} selected without an API key, translations will fail",
            metadata.name
        )
    })
}
