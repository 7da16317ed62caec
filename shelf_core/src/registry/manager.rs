use std::io::ErrorKind;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;

use super::error::RegistryError;
use super::models::{DocumentEntry, ResolvedDocument};
use super::validation::DocumentValidator;

pub const DEFAULT_EXTENSION: &str = ".mobi";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub upload_dir: PathBuf,
    pub extension: String,
    pub max_upload_bytes: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            extension: DEFAULT_EXTENSION.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Validated access to the flat document directory.
///
/// Every operation sanitizes the client-supplied name before it is joined
/// onto the directory; raw names never reach a filesystem call.
#[derive(Debug, Clone)]
pub struct DocumentRegistry {
    config: RegistryConfig,
    validator: DocumentValidator,
}

impl DocumentRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let validator = DocumentValidator::new(config.extension.clone());

        Self { config, validator }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub async fn initialize(&self) -> Result<(), RegistryError> {
        async_fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(RegistryError::DirectoryRead)
    }

    /// Lists the documents in the directory, most recently modified first.
    /// A directory that cannot be read yields an empty list.
    pub async fn list_documents(&self) -> Vec<DocumentEntry> {
        match self.scan_documents().await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!("Error while reading upload directory {}: {}", self.config.upload_dir.display(), e);
                Vec::new()
            }
        }
    }

    /// Same scan as [`list_documents`](Self::list_documents) but reports
    /// directory read failures instead of hiding them. An entry whose
    /// metadata cannot be read is skipped, not fatal.
    pub async fn scan_documents(&self) -> Result<Vec<DocumentEntry>, RegistryError> {
        self.initialize().await?;

        let mut dir = async_fs::read_dir(&self.config.upload_dir)
            .await
            .map_err(RegistryError::DirectoryRead)?;

        let mut documents = Vec::new();

        while let Some(entry) = dir.next_entry().await.map_err(RegistryError::DirectoryRead)? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };

            if !self.validator.has_required_extension(&name) {
                continue;
            }

            let metadata = match async_fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", name, e);
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let last_modified: DateTime<Utc> = match metadata.modified() {
                Ok(modified) => modified.into(),
                Err(e) => {
                    tracing::warn!("Skipping {}, no modification time: {}", name, e);
                    continue;
                }
            };

            documents.push(DocumentEntry {
                name,
                last_modified,
                size_bytes: metadata.len(),
            });
        }

        documents.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(documents)
    }

    pub async fn resolve_for_download(&self, raw_name: &str) -> Result<ResolvedDocument, RegistryError> {
        let name = self.validator.validate_existing_name(raw_name)?;
        let path = self.config.upload_dir.join(&name);

        match async_fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(ResolvedDocument {
                path,
                name,
                size_bytes: metadata.len(),
            }),
            _ => Err(RegistryError::NotFound { name }),
        }
    }

    /// Opens a resolved document for streaming. The returned length is read
    /// from the open handle, so it matches what the handle will yield even if
    /// the file changed after resolution.
    pub async fn open(&self, document: &ResolvedDocument) -> Result<(async_fs::File, u64), RegistryError> {
        let stream_error = |source: std::io::Error| RegistryError::StreamError {
            name: document.name.clone(),
            source,
        };

        let file = async_fs::File::open(&document.path).await.map_err(stream_error)?;
        let length = file.metadata().await.map_err(stream_error)?.len();

        Ok((file, length))
    }

    pub async fn delete_document(&self, raw_name: &str) -> Result<String, RegistryError> {
        let document = self.resolve_for_download(raw_name).await?;

        async_fs::remove_file(&document.path)
            .await
            .map_err(|source| RegistryError::DeleteError {
                name: document.name.clone(),
                source,
            })?;

        tracing::info!("Deleted document {}", document.name);
        Ok(document.name)
    }

    /// Writes an uploaded document under its sanitized name.
    ///
    /// Existing documents are never overwritten: the file is created with
    /// `create_new`, so a concurrent upload of the same name that slips past
    /// the existence check still fails with `AlreadyExists`.
    pub async fn store_upload<S, E>(&self, raw_name: &str, content: S) -> Result<String, RegistryError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let name = self.validator.validate_upload_name(raw_name)?;
        let path = self.config.upload_dir.join(&name);

        match async_fs::try_exists(&path).await {
            Ok(true) => return Err(RegistryError::AlreadyExists { name }),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Could not check whether {} exists: {}", path.display(), e);
            }
        }

        async_fs::create_dir_all(&self.config.upload_dir)
            .await
            .map_err(|e| RegistryError::WriteError {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let mut file = match async_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RegistryError::AlreadyExists { name });
            }
            Err(e) => {
                return Err(RegistryError::WriteError {
                    name,
                    reason: e.to_string(),
                });
            }
        };

        if let Err(reason) = write_stream(&mut file, content).await {
            drop(file);
            if let Err(e) = async_fs::remove_file(&path).await {
                tracing::warn!("Failed to remove partial upload {}: {}", path.display(), e);
            }
            return Err(RegistryError::WriteError { name, reason });
        }

        tracing::info!("Stored document {}", name);
        Ok(name)
    }
}

async fn write_stream<S, E>(file: &mut async_fs::File, content: S) -> Result<(), String>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    futures_util::pin_mut!(content);

    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        file.write_all(&chunk).await.map_err(|e| e.to_string())?;
    }

    file.flush().await.map_err(|e| e.to_string())?;
    file.sync_all().await.map_err(|e| e.to_string())?;

    Ok(())
}
