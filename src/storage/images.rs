use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;
use url::Url;

use crate::errors::{AppError, AppResult};
use crate::review::PendingImage;

/// Stores a review's image and hands back a URL it can be fetched from.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: &PendingImage, review_id: &str) -> AppResult<String>;
}

/// Writes images under `<root>/<review_id>/` and serves them from
/// `<public_base_url>/images/`.
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: Url,
}

impl LocalImageStore {
    pub fn new(root: PathBuf, public_base_url: &str) -> AppResult<Self> {
        let public_base_url = Url::parse(public_base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                AppError::BadRequest(format!("invalid public base url {:?}", public_base_url))
            })?;
        Ok(Self {
            root,
            public_base_url,
        })
    }

    /// Public URL for a stored file; each part is percent-encoded as a
    /// single path segment.
    fn public_url(&self, review_id: &str, file_name: &str) -> AppResult<String> {
        let mut url = self.public_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::BadRequest("public base url cannot hold a path".into()))?
            .pop_if_empty()
            .extend(["images", review_id, file_name]);
        Ok(url.into())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, image: &PendingImage, review_id: &str) -> AppResult<String> {
        if review_id.contains("..") || review_id.contains('/') || review_id.is_empty() {
            return Err(AppError::BadRequest(format!("invalid review id {:?}", review_id)));
        }

        let mut file_name = sanitize_filename::sanitize(&image.file_name);
        if file_name.is_empty() {
            let ext = mime_guess::get_mime_extensions_str(&image.content_type)
                .and_then(|exts| exts.first())
                .unwrap_or(&"img");
            file_name = format!("image.{}", ext);
        }

        let dir = self.root.join(review_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), &image.bytes).await?;

        tracing::info!(review_id, file = %file_name, bytes = image.bytes.len(), "review image stored");
        self.public_url(review_id, &file_name)
    }
}

pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}
