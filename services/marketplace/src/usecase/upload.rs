use bytes::Bytes;

use crate::domain::repository::FileStore;
use crate::domain::types::{UPLOAD_EXTENSIONS, upload_extension};
use crate::error::MarketplaceError;

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Store a non-empty upload of an accepted type and return its public URL.
pub(crate) async fn store_upload<F: FileStore>(
    files: &F,
    upload: Upload,
) -> Result<String, MarketplaceError> {
    if upload.bytes.is_empty() {
        return Err(MarketplaceError::invalid("file is empty"));
    }
    if upload_extension(upload.file_name.as_deref()).is_none() {
        return Err(MarketplaceError::invalid(format!(
            "unsupported file type, expected one of: {}",
            UPLOAD_EXTENSIONS.join(", ")
        )));
    }
    files.save(upload.file_name.as_deref(), &upload.bytes).await
}

pub struct UploadFileUseCase<F: FileStore> {
    pub files: F,
}

impl<F: FileStore> UploadFileUseCase<F> {
    pub async fn execute(&self, upload: Upload) -> Result<String, MarketplaceError> {
        store_upload(&self.files, upload).await
    }
}
