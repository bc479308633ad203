use serde::{Deserialize, Serialize};

fn default_root() -> String {
    "moji-data".to_string()
}

fn default_user_id() -> String {
    "local".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding uploaded images and saved documents
    #[serde(default = "default_root")]
    pub root: String,
    /// Owner of saved results; also the collection they land in
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            user_id: default_user_id(),
        }
    }
}
