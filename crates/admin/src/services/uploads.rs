//! Product image storage.
//!
//! Images are written under `<uploads_dir>/products/` and served by the
//! storefront at `/uploads/products/<file>`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use clothesline_core::ProductId;

/// URL prefix the storefront serves the uploads directory under.
const PUBLIC_PREFIX: &str = "/uploads/";

const PRODUCT_DIR: &str = "products";

/// Errors raised while storing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The multipart body had no `image` field.
    #[error("an `image` file field is required")]
    MissingImage,

    /// The file was empty.
    #[error("image file is empty")]
    Empty,

    /// The content type is not an accepted image format.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Writing to disk failed.
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Map an image content type to a file extension.
///
/// Only raster formats browsers display directly are accepted; SVG is
/// refused because it can carry script.
fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Writes product images to the uploads directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write an image for `product_id` and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` or `UploadError::Empty` for bad
    /// input and `UploadError::Io` if the file cannot be written.
    pub async fn save(
        &self,
        product_id: &ProductId,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let dir = self.root.join(PRODUCT_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{product_id}-{}.{ext}", Uuid::new_v4().simple());
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        Ok(format!("{PUBLIC_PREFIX}{PRODUCT_DIR}/{file_name}"))
    }

    /// Delete a previously stored image. Failures are logged, not returned.
    ///
    /// URLs that do not point into the product image directory are ignored,
    /// so externally hosted image URLs are left alone.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.local_path(url) else {
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove old product image");
        }
    }

    fn local_path(&self, url: &str) -> Option<PathBuf> {
        let file_name = url
            .strip_prefix(PUBLIC_PREFIX)?
            .strip_prefix(PRODUCT_DIR)?
            .strip_prefix('/')?;
        let is_plain_name = !file_name.is_empty()
            && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
        is_plain_name.then(|| self.root.join(PRODUCT_DIR).join(file_name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for("image/webp; charset=binary"), Some("webp"));
    }

    #[test]
    fn test_extension_for_rejects_svg_and_non_images() {
        assert_eq!(extension_for("image/svg+xml"), None);
        assert_eq!(extension_for("text/html"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn test_local_path_stays_inside_product_dir() {
        let store = ImageStore::new("/srv/uploads");
        assert_eq!(
            store.local_path("/uploads/products/PROD-0001-abc.jpg"),
            Some(PathBuf::from("/srv/uploads/products/PROD-0001-abc.jpg"))
        );
        assert_eq!(store.local_path("/uploads/products/../secret"), None);
        assert_eq!(store.local_path("/uploads/products/"), None);
        assert_eq!(store.local_path("https://cdn.example.com/a.jpg"), None);
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_public_url() {
        let root = std::env::temp_dir().join(format!("clothesline-test-{}", Uuid::new_v4()));
        let store = ImageStore::new(&root);
        let id = ProductId::from_sequence(7).unwrap();

        let url = store.save(&id, "image/png", b"\x89PNG").await.unwrap();
        assert!(url.starts_with("/uploads/products/PROD-0007-"));
        assert!(url.ends_with(".png"));

        let path = store.local_path(&url).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\x89PNG");

        store.remove(&url).await;
        assert!(!path.exists());
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_bad_input() {
        let store = ImageStore::new(std::env::temp_dir());
        let id = ProductId::from_sequence(1).unwrap();
        assert!(matches!(
            store.save(&id, "image/svg+xml", b"<svg/>").await,
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save(&id, "image/png", b"").await,
            Err(UploadError::Empty)
        ));
    }
}
