use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved recognition/translation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    #[serde(default)]
    pub id: String,
    /// Recognized or typed text
    #[serde(default)]
    pub convert_data: String,
    /// Translation of `convert_data`, empty when none was made
    #[serde(default)]
    pub search_data: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TranslationRecord {
    pub fn new(
        convert_data: impl Into<String>,
        search_data: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            convert_data: convert_data.into(),
            search_data: search_data.into(),
            image_url: image_url.into(),
            timestamp: Some(Utc::now()),
        }
    }
}
