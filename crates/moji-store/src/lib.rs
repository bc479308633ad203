pub mod history;
pub mod local;
pub mod record;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use history::{filter_records, format_timestamp_kst};
pub use local::LocalStore;
pub use record::TranslationRecord;

/// Collection for results saved without an image
pub const SHARED_COLLECTION: &str = "logID";

/// Blob storage for picked images
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a file under `owner/` and return a URL to it
    async fn put_file(&self, owner: &str, path: &Path) -> Result<String, StoreError>;
}

/// Document storage for saved results
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn add(&self, collection: &str, record: &TranslationRecord) -> Result<(), StoreError>;

    /// All records of a collection, oldest first
    async fn list(&self, collection: &str) -> Result<Vec<TranslationRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("Path has no file name: {0}")]
    MissingFileName(PathBuf),
}

/// Where a saved result ended up
#[derive(Debug, Clone)]
pub struct SavedResult {
    pub collection: String,
    pub record: TranslationRecord,
}

/// Persist a result.
///
/// With an image the file is uploaded first and the record lands in the
/// owner's collection; without one the record goes to the shared collection.
/// A failed upload stores nothing.
pub async fn save_result(
    objects: &dyn ObjectStore,
    documents: &dyn DocumentStore,
    owner: &str,
    output: &str,
    translation: &str,
    image: Option<&Path>,
) -> Result<SavedResult, StoreError> {
    let (collection, image_url) = match image {
        Some(path) => {
            let url = objects.put_file(owner, path).await?;
            tracing::debug!("[STORE] Uploaded {} -> {}", path.display(), url);
            (owner.to_string(), url)
        }
        None => (SHARED_COLLECTION.to_string(), String::new()),
    };

    let record = TranslationRecord::new(output, translation, image_url);
    documents.add(&collection, &record).await?;
    tracing::info!("[STORE] Saved record {} to '{}'", record.id, collection);

    Ok(SavedResult { collection, record })
}
