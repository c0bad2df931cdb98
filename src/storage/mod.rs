//! Blob storage for uploaded photos and documents.
//!
//! Files are written through OpenDAL and served from a public base URL that fronts
//! the same bucket or directory. The returned URL is what gets stored in the sheet.

use async_trait::async_trait;
use opendal::{Operator, services};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, AppResult};

pub const PHOTOS: &str = "photos";
pub const DOCUMENTS: &str = "documents";

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` under `key` and return the URL it is publicly served from.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String>;
}

pub struct OpendalStorage {
    operator: Operator,
    public_base_url: String,
}

impl OpendalStorage {
    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        let operator = match &config.backend {
            StorageBackend::Fs { root } => Operator::new(services::Fs::default().root(root))?.finish(),
            StorageBackend::S3 {
                endpoint,
                bucket,
                region,
                access_key_id,
                secret_access_key,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .region(region)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key);
                Operator::new(builder)?.finish()
            }
            StorageBackend::Memory => Operator::new(services::Memory::default())?.finish(),
        };

        Ok(Self::new(operator, &config.public_base_url))
    }

    pub fn new(operator: Operator, public_base_url: &str) -> Self {
        Self {
            operator,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStorage for OpendalStorage {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> AppResult<String> {
        let size = bytes.len();
        let supports_content_type = self.operator.info().full_capability().write_with_content_type;

        let result = if supports_content_type && !content_type.is_empty() {
            self.operator.write_with(key, bytes).content_type(content_type).await
        } else {
            self.operator.write(key, bytes).await
        };
        if let Err(e) = result {
            error!(key = %key, error = %e, "Blob upload failed");
            return Err(AppError::dependency(format!("upload of {key} failed: {e}")));
        }

        info!(key = %key, size, content_type = %content_type, "Blob stored");
        Ok(self.public_url(key))
    }
}

/// `<prefix>/<owner>-<uuid>.<ext>`, with the owner reduced to path-safe characters
/// and the extension taken from the uploaded file name.
pub fn object_key(prefix: &str, owner: &str, filename: Option<&str>) -> String {
    let owner: String = owner
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '@') { c } else { '_' })
        .collect();
    let extension = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{prefix}/{owner}-{}.{ext}", Uuid::new_v4()),
        None => format!("{prefix}/{owner}-{}", Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_storage() -> OpendalStorage {
        let operator = Operator::new(services::Memory::default()).unwrap().finish();
        OpendalStorage::new(operator, "https://files.company.com/")
    }

    #[actix_web::test]
    async fn put_stores_bytes_and_returns_public_url() {
        let storage = memory_storage();
        let url = storage
            .put("documents/a.pdf", "application/pdf", b"%PDF-1.7".to_vec())
            .await
            .unwrap();
        assert_eq!(url, "https://files.company.com/documents/a.pdf");

        let stored = storage.operator.read("documents/a.pdf").await.unwrap();
        assert_eq!(stored.to_vec(), b"%PDF-1.7".to_vec());
    }

    #[test]
    fn object_keys_are_path_safe() {
        let key = object_key(PHOTOS, "Asha Rao@Company.com", Some("me.JPG"));
        assert!(key.starts_with("photos/asha_rao@company.com-"), "{key}");
        assert!(key.ends_with(".jpg"), "{key}");
        assert!(!key.contains(' '));

        let bare = object_key(DOCUMENTS, "a@x.com", Some("../../etc/passwd"));
        assert!(bare.starts_with("documents/a@x.com-"));
        assert!(!bare.contains(".."), "{bare}");
    }
}
