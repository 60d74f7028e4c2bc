//! Local-disk image storage for project uploads.
//!
//! # Invariants
//! - Stored files live directly under `<root>/projects/` with generated
//!   `<uuid>.<ext>` names; caller-supplied names are never used as paths.
//! - Only `image/*` content with an allowed extension is accepted.

use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// URL prefix under which stored project images are served.
pub const PUBLIC_PREFIX: &str = "/api/uploads/projects";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const PROJECTS_DIR: &str = "projects";
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug)]
pub enum UploadError {
    NoFile,
    UnsupportedType(String),
    TooLarge { limit: usize },
    InvalidFilename(String),
    NotFound(String),
    Io(std::io::Error),
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFile => write!(f, "No file uploaded"),
            Self::UnsupportedType(detail) => {
                write!(f, "Only image files are allowed ({detail})")
            }
            Self::TooLarge { limit } => write!(f, "File exceeds the {limit} byte limit"),
            Self::InvalidFilename(name) => write!(f, "invalid file name `{name}`"),
            Self::NotFound(name) => write!(f, "file `{name}` not found"),
            Self::Io(err) => write!(f, "upload storage error: {err}"),
        }
    }
}

impl Error for UploadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    /// Public path, e.g. `/api/uploads/projects/<file>`.
    pub path: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Directory served at `PUBLIC_PREFIX`.
    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    /// Validates and writes one image, returning its public path.
    pub fn store(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::NoFile);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let content_type = content_type.unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(UploadError::UnsupportedType(format!(
                "content type `{content_type}`"
            )));
        }
        let extension = allowed_extension(original_name).ok_or_else(|| {
            UploadError::UnsupportedType(format!("file name `{original_name}`"))
        })?;

        let dir = self.projects_dir();
        std::fs::create_dir_all(&dir)?;
        let filename = format!("{}.{extension}", Uuid::new_v4());
        std::fs::write(dir.join(&filename), bytes)?;

        info!(
            "event=upload_store module=upload status=ok filename={} size={}",
            filename,
            bytes.len()
        );
        Ok(StoredUpload {
            path: format!("{PUBLIC_PREFIX}/{filename}"),
            filename,
            original_name: original_name.to_string(),
            size: bytes.len(),
        })
    }

    /// Removes a previously stored file by its generated name.
    pub fn delete(&self, filename: &str) -> Result<(), UploadError> {
        if !is_plain_filename(filename) {
            warn!("event=upload_delete module=upload status=error error_code=invalid_filename");
            return Err(UploadError::InvalidFilename(filename.to_string()));
        }

        match std::fs::remove_file(self.projects_dir().join(filename)) {
            Ok(()) => {
                info!("event=upload_delete module=upload status=ok filename={filename}");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(UploadError::NotFound(filename.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn allowed_extension(name: &str) -> Option<String> {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();
    ALLOWED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::{allowed_extension, is_plain_filename, UploadError, UploadStore};

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(allowed_extension("Cover.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("photo.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("script.svg"), None);
        assert_eq!(allowed_extension("noext"), None);
    }

    #[test]
    fn traversal_names_are_rejected() {
        assert!(is_plain_filename("abc.png"));
        assert!(!is_plain_filename("../etc/passwd"));
        assert!(!is_plain_filename("a/b.png"));
        assert!(!is_plain_filename(".."));
    }

    #[test]
    fn store_then_delete_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = UploadStore::new(dir.path(), 1024);
        let stored = store
            .store("cover.png", Some("image/png"), b"\x89PNG....")
            .expect("upload should succeed");
        assert!(stored.path.starts_with("/api/uploads/projects/"));
        assert!(stored.filename.ends_with(".png"));
        assert!(store.projects_dir().join(&stored.filename).exists());

        store.delete(&stored.filename).expect("delete should succeed");
        assert!(matches!(
            store.delete(&stored.filename),
            Err(UploadError::NotFound(_))
        ));
    }

    #[test]
    fn non_image_and_oversized_payloads_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = UploadStore::new(dir.path(), 4);
        assert!(matches!(
            store.store("notes.txt", Some("text/plain"), b"abc"),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.store("big.png", Some("image/png"), b"12345"),
            Err(UploadError::TooLarge { limit: 4 })
        ));
        assert!(matches!(
            store.store("empty.png", Some("image/png"), b""),
            Err(UploadError::NoFile)
        ));
    }
}
