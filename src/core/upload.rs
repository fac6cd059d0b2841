//! Photo uploads as base64 data URLs
//!
//! The backend takes images inline in JSON bodies. Files are size-checked
//! before they are read and encoded.

use base64::Engine;
use std::path::Path;
use thiserror::Error;

/// Largest accepted upload (5 MB)
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large: {size} bytes (limit is 5MB)")]
    TooLarge { size: u64 },

    #[error("Unsupported image type: {0}. Use png, jpg, jpeg, gif or webp")]
    UnsupportedType(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// MIME type for an image file extension
pub fn mime_for(path: &Path) -> Result<&'static str, UploadError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(UploadError::UnsupportedType(ext)),
    }
}

/// Encode bytes as `data:{mime};base64,...`
pub fn encode_bytes(bytes: &[u8], mime: &str) -> Result<String, UploadError> {
    let size = bytes.len() as u64;
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", mime, encoded))
}

/// Read an image file and encode it as a data URL
pub fn encode_file(path: &Path) -> Result<String, UploadError> {
    let mime = mime_for(path)?;
    let io_err = |source: std::io::Error| UploadError::Io {
        path: path.display().to_string(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }

    let bytes = std::fs::read(path).map_err(io_err)?;
    encode_bytes(&bytes, mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_bytes() {
        assert_eq!(encode_bytes(b"hi", "image/png").unwrap(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(mime_for(Path::new("a/photo.JPG")).unwrap(), "image/jpeg");
        assert_eq!(mime_for(Path::new("b.webp")).unwrap(), "image/webp");
        assert!(matches!(mime_for(Path::new("c.pdf")), Err(UploadError::UnsupportedType(_))));
    }

    #[test]
    fn test_oversize_rejected_before_encoding() {
        let bytes = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        assert!(matches!(
            encode_bytes(&bytes, "image/png"),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_encode_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bio.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert_eq!(encode_file(&path).unwrap(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            encode_file(&tmp.path().join("none.png")),
            Err(UploadError::Io { .. })
        ));
    }
}
