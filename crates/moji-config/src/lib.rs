use std::env;

use serde::{Deserialize, Serialize};

use self::network::NetworkConfig;
use self::ocr::OcrConfig;
use self::store::StoreConfig;
use self::translator::TranslatorConfig;

pub mod network;
pub mod ocr;
pub mod store;
pub mod translator;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub translator: TranslatorConfig,
    pub ocr: OcrConfig,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            translator: TranslatorConfig::default(),
            ocr: OcrConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unset or unparsable keys are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MOJI_PROVIDER") {
            self.translator.provider = v;
        }
        if let Some(v) = lookup("MOJI_FROM_LANG") {
            self.translator.from_lang = v;
        }
        if let Some(v) = lookup("MOJI_TO_LANG") {
            self.translator.to_lang = v;
        }
        if let Some(v) = lookup("DEEPL_API_KEY") {
            self.translator.api_key = v;
        }
        if let Some(v) = lookup("MOJI_REQUIRE_WIFI").and_then(|v| v.parse().ok()) {
            self.translator.require_wifi = v;
        }
        if let Some(v) = lookup("MOJI_PHRASEBOOK") {
            self.translator.phrasebook_path = Some(v);
        }
        if let Some(v) = lookup("MOJI_CONNECTION") {
            self.network.connection = v;
        }
        if let Some(v) = lookup("MOJI_OCR_COMMAND") {
            self.ocr.command = v;
        }
        if let Some(v) = lookup("MOJI_OCR_LANG") {
            self.ocr.language = v;
        }
        if let Some(v) = lookup("MOJI_STORE_ROOT") {
            self.store.root = v;
        }
        if let Some(v) = lookup("MOJI_USER_ID") {
            self.store.user_id = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "translator": { "to_lang": "ja" } }"#).unwrap();

        assert_eq!(config.translator.from_lang, "ko");
        assert_eq!(config.translator.to_lang, "ja");
        assert!(config.translator.require_wifi);
        assert_eq!(config.ocr.command, "tesseract");
        assert_eq!(config.store.user_id, "local");
    }

    #[test]
    fn overrides_replace_fields() {
        let vars: HashMap<&str, &str> = [
            ("MOJI_FROM_LANG", "ja"),
            ("MOJI_REQUIRE_WIFI", "false"),
            ("MOJI_CONNECTION", "offline"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.translator.from_lang, "ja");
        assert!(!config.translator.require_wifi);
        assert_eq!(config.network.connection, "offline");
        assert_eq!(config.translator.to_lang, "en");
    }

    #[test]
    fn unparsable_override_keeps_value() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "MOJI_REQUIRE_WIFI").then(|| "sometimes".to_string()));

        assert!(config.translator.require_wifi);
    }
}
