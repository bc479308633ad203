use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_command() -> String {
    "tesseract".to_string()
}

fn default_language() -> String {
    "kor".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Recognizer executable
    #[serde(default = "default_command")]
    pub command: String,
    /// Recognizer language model, e.g. "kor", "kor+eng"
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: default_command(),
            language: default_language(),
        }
    }
}
