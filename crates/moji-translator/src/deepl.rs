use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    LanguageCode, LanguagePair, NetworkPolicy, ProviderMetadata, TranslateError,
    TranslationBackend, TranslatorClient,
};

/// Languages DeepL accepts, as catalogue tags
const DEEPL_LANGUAGES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hu", "id", "it", "ja",
    "ko", "lt", "lv", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr", "uk", "zh",
];

/// DeepL v2 HTTP backend. Models live on the server, so there is nothing to
/// download or delete locally.
#[derive(Clone)]
pub struct DeeplBackend {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl DeeplBackend {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl TranslationBackend for DeeplBackend {
    fn client(&self, pair: &LanguagePair) -> Result<Arc<dyn TranslatorClient>, TranslateError> {
        for code in [&pair.source, &pair.target] {
            if !self.is_supported(code) {
                return Err(TranslateError::UnsupportedLanguage(code.to_string()));
            }
        }

        Ok(Arc::new(DeeplClient {
            backend: self.clone(),
            pair: pair.clone(),
        }))
    }

    fn is_supported(&self, language: &LanguageCode) -> bool {
        DEEPL_LANGUAGES.contains(&language.as_str())
    }

    async fn delete_model(&self, language: &LanguageCode) -> Result<(), TranslateError> {
        tracing::debug!("[DEEPL] No local model to delete for '{}'", language);
        Ok(())
    }

    async fn downloaded_models(&self) -> Result<Vec<LanguageCode>, TranslateError> {
        Ok(Vec::new())
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "DeepL".to_string(),
            requires_api_key: true,
            on_device: false,
        }
    }
}

struct DeeplClient {
    backend: DeeplBackend,
    pair: LanguagePair,
}

#[async_trait]
impl TranslatorClient for DeeplClient {
    fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    async fn ensure_model_downloaded(&self, _policy: NetworkPolicy) -> Result<(), TranslateError> {
        if self.backend.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }
        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if self.backend.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }

        let source = self.pair.source.as_str().to_uppercase();
        let target = target_code(&self.pair.target);
        let params = [
            ("text", text),
            ("source_lang", source.as_str()),
            ("target_lang", target.as_str()),
        ];

        let response = self
            .backend
            .client
            .post(&self.backend.api_url)
            .header(
                "Authorization",
                format!("DeepL-Auth-Key {}", self.backend.api_key),
            )
            .form(&params)
            .send()
            .await?;

        if response.status() == 429 {
            return Err(TranslateError::RateLimitExceeded);
        }

        if response.status() == 403 {
            return Err(TranslateError::AuthenticationError);
        }

        if !response.status().is_success() {
            return Err(TranslateError::ApiError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        parse_translation(&json)
    }
}

/// DeepL rejects bare "EN"/"PT" as targets
fn target_code(code: &LanguageCode) -> String {
    match code.as_str() {
        "en" => "EN-US".to_string(),
        "pt" => "PT-PT".to_string(),
        other => other.to_uppercase(),
    }
}

pub(crate) fn parse_translation(json: &serde_json::Value) -> Result<String, TranslateError> {
    json["translations"]
        .get(0)
        .and_then(|t| t["text"].as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_translation() {
        let json = serde_json::json!({
            "translations": [
                { "detected_source_language": "KO", "text": "hello" },
                { "detected_source_language": "KO", "text": "hi" }
            ]
        });
        assert_eq!(parse_translation(&json).unwrap(), "hello");
    }

    #[test]
    fn empty_response_is_api_error() {
        let json = serde_json::json!({ "translations": [] });
        assert!(matches!(
            parse_translation(&json),
            Err(TranslateError::ApiError(_))
        ));
    }

    #[test]
    fn english_target_gets_regional_variant() {
        assert_eq!(target_code(&LanguageCode::new("en")), "EN-US");
        assert_eq!(target_code(&LanguageCode::new("ko")), "KO");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let backend = DeeplBackend::new(String::new(), "http://127.0.0.1:9/v2/translate".into());
        let client = backend.client(&LanguagePair::new("ko", "en")).unwrap();

        assert!(matches!(
            client.ensure_model_downloaded(NetworkPolicy::Any).await,
            Err(TranslateError::AuthenticationError)
        ));
        assert!(matches!(
            client.translate("안녕").await,
            Err(TranslateError::AuthenticationError)
        ));
    }

    #[test]
    fn rejects_languages_deepl_lacks() {
        let backend = DeeplBackend::new("key".into(), "http://localhost".into());
        assert!(matches!(
            backend.client(&LanguagePair::new("ko", "sw")),
            Err(TranslateError::UnsupportedLanguage(code)) if code == "sw"
        ));
    }
}
