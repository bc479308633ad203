use serde::{Deserialize, Serialize};

fn default_connection() -> String {
    "wifi".to_string()
}

/// Connection the on-device provider pretends to download over
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// "wifi", "cellular" or "offline"
    #[serde(default = "default_connection")]
    pub connection: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connection: default_connection(),
        }
    }
}
