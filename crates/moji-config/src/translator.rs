use serde::{Deserialize, Serialize};

fn default_provider() -> String {
    "memory".to_string()
}

fn default_from_lang() -> String {
    "ko".to_string()
}

fn default_to_lang() -> String {
    "en".to_string()
}

fn default_api_url() -> String {
    "https://api-free.deepl.com/v2/translate".to_string()
}

fn default_require_wifi() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TranslatorConfig {
    /// "memory" (on-device phrasebook) or "deepl"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_from_lang")]
    pub from_lang: String,
    #[serde(default = "default_to_lang")]
    pub to_lang: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Only download models over Wi-Fi
    #[serde(default = "default_require_wifi")]
    pub require_wifi: bool,
    /// Extra phrase tables for the memory provider
    #[serde(default)]
    pub phrasebook_path: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            from_lang: default_from_lang(),
            to_lang: default_to_lang(),
            api_key: String::new(),
            api_url: default_api_url(),
            require_wifi: default_require_wifi(),
            phrasebook_path: None,
        }
    }
}
