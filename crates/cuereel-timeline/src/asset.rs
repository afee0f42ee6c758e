use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Whether an asset is a held still or a short motion clip that may loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Still,
    Motion,
}

impl AssetKind {
    /// Classify a media file by its extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("gif") | Some("webm") | Some("mp4") | Some("mov") => AssetKind::Motion,
            _ => AssetKind::Still,
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Still => write!(f, "still"),
            AssetKind::Motion => write!(f, "motion"),
        }
    }
}

/// A media file resolved for exactly one cue.
///
/// Assets are never shared between cues; identical tag sets on two cues
/// produce two independent resolutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAsset {
    /// Local file location inside the job's working directory (or a
    /// configured fallback path).
    pub path: PathBuf,
    /// The repository's complete tag set for this asset; empty for the
    /// fallback asset.
    pub tags: Vec<String>,
    pub kind: AssetKind,
}

impl ResolvedAsset {
    pub fn new(path: impl Into<PathBuf>, tags: Vec<String>) -> Self {
        let path = path.into();
        let kind = AssetKind::from_path(&path);
        Self { path, tags, kind }
    }

    /// The fixed substitute used when a search returns no candidates or a
    /// fetch fails under the fallback policy.
    pub fn fallback(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(AssetKind::from_path(Path::new("a.gif")), AssetKind::Motion);
        assert_eq!(AssetKind::from_path(Path::new("a.WEBM")), AssetKind::Motion);
        assert_eq!(AssetKind::from_path(Path::new("a.mp4")), AssetKind::Motion);
        assert_eq!(AssetKind::from_path(Path::new("a.png")), AssetKind::Still);
        assert_eq!(AssetKind::from_path(Path::new("a.jpg")), AssetKind::Still);
        assert_eq!(AssetKind::from_path(Path::new("noext")), AssetKind::Still);
    }

    #[test]
    fn test_fallback_has_empty_tags() {
        let asset = ResolvedAsset::fallback("./defaults/default-image.jpg");
        assert!(asset.tags.is_empty());
        assert_eq!(asset.kind, AssetKind::Still);
    }
}
