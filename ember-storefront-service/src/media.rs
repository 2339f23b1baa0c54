use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level folders of the public media tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Avatars,
    Dishes,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Avatars => "avatars",
            MediaCategory::Dishes => "dishes",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "avatars" => Some(MediaCategory::Avatars),
            "dishes" => Some(MediaCategory::Dishes),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("File already exists")]
    AlreadyExists,
    #[error("Invalid file name")]
    InvalidName,
    #[error("Unexpected internal error")]
    Io(#[from] std::io::Error),
}

/// Disk-backed store for uploaded images, served back under `/media`.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base: String,
}

impl MediaStore {
    /// `public_base` is prefixed onto returned URLs; an empty base yields
    /// site-relative `/media/...` paths.
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base,
        }
    }

    pub fn from_env() -> Self {
        let root = std::env::var("MEDIA_ROOT").expect("MEDIA_ROOT must be set");
        let public_base = std::env::var("PUBLIC_BASE_URL").unwrap_or_default();
        Self::new(root, public_base)
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Writes `bytes` under `{category}/{file_name}` and returns the public
    /// URL. Refuses to clobber an existing file unless `overwrite` is set.
    pub fn store(
        &self,
        category: MediaCategory,
        file_name: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<String, MediaError> {
        if !is_safe_name(file_name) {
            return Err(MediaError::InvalidName);
        }

        let dir = self.root.join(category.as_str());
        fs::create_dir_all(&dir)?;

        let path = dir.join(file_name);
        if !overwrite && path.exists() {
            return Err(MediaError::AlreadyExists);
        }
        fs::write(&path, bytes)?;

        Ok(format!(
            "{}/media/{}/{}",
            self.public_base,
            category.as_str(),
            file_name
        ))
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Maps an uploaded file name to a recognised image extension.
pub fn image_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("png"),
        "jpg" => Some("jpg"),
        "jpeg" => Some("jpeg"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        _ => None,
    }
}
