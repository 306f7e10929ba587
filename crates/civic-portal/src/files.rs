use std::fmt;
use std::path::Path;

use mime::Mime;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Largest local selection accepted for staging (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Reference to an artifact held by the portal's file store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub filename: String,
}

impl StoredFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// Reads `{ "filename": "..." }` out of an arbitrary JSON value, treating a missing or
    /// blank filename as no file at all.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        value
            .get("filename")
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(Self::new)
    }
}

/// Accepts `null`, `{}`, or `{ "filename": "" }` as "no file".
pub fn deserialize_optional_file<'de, D>(deserializer: D) -> Result<Option<StoredFile>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(StoredFile::from_json))
}

/// A file picked on the local machine, not yet sent anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(file_name: impl Into<String>, content_type: Mime, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn exceeds_upload_limit(&self) -> bool {
        self.size() > MAX_UPLOAD_BYTES
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.essence_str() == mime::APPLICATION_PDF.essence_str()
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Resolves stored filenames to `<base>/api/files/<filename>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
    base_url: Url,
}

impl FileLocator {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn url_for(&self, filename: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "files", filename]);
        }
        url.to_string()
    }

    pub fn url_for_file(&self, file: &StoredFile) -> String {
        self.url_for(&file.filename)
    }
}
