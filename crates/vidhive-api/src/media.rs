use std::collections::HashMap;
use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::error;

use vidhive_types::ObjectId;

use crate::error::ApiError;

/// 100 MB upload ceiling, applied as the router's body limit.
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// A parsed multipart form: text fields by name, file fields by name.
#[derive(Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl UploadForm {
    pub async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?;
                form.files.insert(name, bytes);
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    /// Required text field; missing or blank is a 400 with the given message.
    pub fn require_text(&self, name: &str, message: &'static str) -> Result<&str, ApiError> {
        match self.fields.get(name).map(String::as_str) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ApiError::bad_request(message)),
        }
    }

    pub fn file(&self, name: &str) -> Option<&Bytes> {
        self.files.get(name).filter(|bytes| !bytes.is_empty())
    }
}

/// Persist an uploaded blob under the media root and return the public path
/// it will be served from.
pub async fn save_media(media_root: &Path, bytes: &[u8]) -> Result<String, ApiError> {
    let id = ObjectId::new();

    tokio::fs::create_dir_all(media_root).await.map_err(|e| {
        error!("Failed to create media root {}: {}", media_root.display(), e);
        ApiError::internal("Failed to upload file")
    })?;

    let path = media_root.join(id.as_str());
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        error!("Failed to write media file {}: {}", path.display(), e);
        ApiError::internal("Failed to upload file")
    })?;

    Ok(format!("/media/{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn saved_media_lands_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let url = save_media(dir.path(), b"blob").await.unwrap();

        let id = url.strip_prefix("/media/").unwrap();
        let stored = std::fs::read(dir.path().join(id)).unwrap();
        assert_eq!(stored, b"blob");
    }
}
