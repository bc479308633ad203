use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{DocumentStore, ObjectStore, StoreError, TranslationRecord};

/// Filesystem-backed object and document store.
///
/// ```text
/// <root>/objects/<owner>/<file name>
/// <root>/documents/<collection>/<id>.json
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn objects_dir(&self, owner: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("objects").join(checked_name(owner)?))
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join("documents").join(checked_name(collection)?))
    }
}

/// Owner and collection names become single path components
fn checked_name(name: &str) -> Result<&str, StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', ':'])
        || name.chars().any(char::is_control);

    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name)
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put_file(&self, owner: &str, path: &Path) -> Result<String, StoreError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| StoreError::MissingFileName(path.to_path_buf()))?;

        let dir = self.objects_dir(owner)?;
        fs::create_dir_all(&dir).await?;

        let source = fs::canonicalize(path).await?;
        let dest = fs::canonicalize(&dir).await?.join(file_name);

        // Copying a file onto itself truncates it
        if source == dest {
            tracing::debug!("[STORE] {} is already stored", dest.display());
        } else {
            fs::copy(&source, &dest).await?;
        }

        Ok(format!("file://{}", dest.display()))
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn add(&self, collection: &str, record: &TranslationRecord) -> Result<(), StoreError> {
        let dir = self.collection_dir(collection)?;
        fs::create_dir_all(&dir).await?;

        let file = dir.join(format!("{}.json", checked_name(&record.id)?));
        fs::write(&file, serde_json::to_vec_pretty(record)?).await?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<TranslationRecord>, StoreError> {
        let dir = self.collection_dir(collection)?;

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let data = fs::read(&path).await?;
            match serde_json::from_slice::<TranslationRecord>(&data) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("[STORE] Skipping {}: {}", path.display(), e),
            }
        }

        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }
}
