use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;
use url::Url;

use crate::error::ApiError;

const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("3gp", "video/3gpp"),
];

const OTHER_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
];

/// Recommended clip length; advisory only.
pub const RECOMMENDED_CLIP_SECS: (u32, u32) = (3, 5);

/// A local clip chosen for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

impl VideoFile {
    /// Validates the path and its declared media type.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let media_type = media_type_for_path(path);
        if !is_video_media_type(&media_type) {
            return Err(ApiError::UnsupportedMediaType { media_type });
        }
        let meta = fs::metadata(path).map_err(|err| ApiError::FileRead {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        if !meta.is_file() {
            return Err(ApiError::FileRead {
                path: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            media_type,
            size_bytes: meta.len(),
        })
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, ApiError> {
        fs::read(&self.path).map_err(|err| ApiError::FileRead {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

/// Terminals paste dropped files as text, often quoted or as `file://` URLs.
///
/// URLs are percent-decoded; bare paths only lose quotes and `\ ` escapes.
pub fn path_from_drop(raw: &str) -> Option<PathBuf> {
    let first = raw.lines().map(str::trim).find(|line| !line.is_empty())?;
    let unquoted = first
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| first.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(first);
    if unquoted.starts_with("file:") {
        return Url::parse(unquoted).ok()?.to_file_path().ok();
    }
    let unescaped = unquoted.replace("\\ ", " ");
    if unescaped.is_empty() {
        None
    } else {
        Some(PathBuf::from(unescaped))
    }
}

pub fn media_type_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    VIDEO_EXTENSIONS
        .iter()
        .chain(OTHER_EXTENSIONS.iter())
        .find(|(known, _)| *known == ext)
        .map(|(_, media)| media.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub fn is_video_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("video/"))
}

/// Live preview handles, the terminal stand-in for browser object URLs.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    next_id: Arc<AtomicU64>,
    live: Arc<Mutex<BTreeMap<u64, String>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, file: &VideoFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let url = format!("preview://{id}/{}", file.file_name);
        if let Ok(mut live) = self.live.lock() {
            live.insert(id, url.clone());
        }
        debug!("opened {url}");
        PreviewHandle {
            id,
            url,
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            size_bytes: file.size_bytes,
            live: Arc::clone(&self.live),
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live
            .lock()
            .map(|live| live.values().any(|u| u == url))
            .unwrap_or(false)
    }
}

/// Revoked when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    live: Arc<Mutex<BTreeMap<u64, String>>>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.id);
        }
        debug!("revoked {}", self.url);
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}
