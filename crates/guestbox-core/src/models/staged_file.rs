use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Content kind of a staged file, inferred from its extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Jpeg,
    Png,
    Gif,
    Mp4,
    Binary,
}

impl ContentKind {
    /// Map a filename to its content kind.
    ///
    /// Only `.jpg`/`.jpeg`, `.png`, `.gif` and `.mp4` are recognized
    /// (case-insensitive); every other name, including names without an
    /// extension, is `Binary`. The file contents are never inspected.
    pub fn from_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => ContentKind::Jpeg,
            Some("png") => ContentKind::Png,
            Some("gif") => ContentKind::Gif,
            Some("mp4") => ContentKind::Mp4,
            _ => ContentKind::Binary,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ContentKind::Jpeg => "image/jpeg",
            ContentKind::Png => "image/png",
            ContentKind::Gif => "image/gif",
            ContentKind::Mp4 => "video/mp4",
            ContentKind::Binary => "application/octet-stream",
        }
    }

    /// Coarse family: "image", "video" or "binary".
    pub fn family(&self) -> &'static str {
        match self {
            ContentKind::Jpeg | ContentKind::Png | ContentKind::Gif => "image",
            ContentKind::Mp4 => "video",
            ContentKind::Binary => "binary",
        }
    }
}

/// A file received from a guest and held in the staging area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    /// Filename exactly as the guest submitted it
    pub original_name: String,
    /// Collision-free name of the local copy
    pub storage_name: String,
    pub content_kind: ContentKind,
    pub size_bytes: u64,
    /// Location of the local copy
    pub path: PathBuf,
}
