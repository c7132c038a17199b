//! Media file lookup for recipe and step images.
//!
//! Image paths are stored relative to the media root. Existence is checked
//! at send time; a missing or unsafe path simply yields `None` so callers
//! fall back to text-only rendering.

use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolves stored image paths against the media root directory
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Join a stored relative path onto the media root.
    ///
    /// Absolute paths and paths with `..` components are rejected so a
    /// database row can never point outside the media directory.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let trimmed = relative.trim();
        if trimmed.is_empty() {
            return None;
        }

        let path = Path::new(trimmed);
        let safe = path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !safe {
            debug!(path = %trimmed, "Rejected media path outside media root");
            return None;
        }

        Some(self.root.join(path))
    }

    /// Full path of an existing regular file, if the image is present on disk
    pub async fn existing_file(&self, relative: Option<&str>) -> Option<PathBuf> {
        let path = self.resolve(relative?)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Some(path),
            _ => {
                debug!(path = %path.display(), "Media file not found");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_joins_relative_paths() {
        let media = MediaLibrary::new("/srv/media");
        assert_eq!(
            media.resolve("recipes/borscht.jpg"),
            Some(PathBuf::from("/srv/media/recipes/borscht.jpg"))
        );
        assert_eq!(
            media.resolve("./steps/1.jpg"),
            Some(PathBuf::from("/srv/media/./steps/1.jpg"))
        );
    }

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let media = MediaLibrary::new("/srv/media");
        assert_eq!(media.resolve("../etc/passwd"), None);
        assert_eq!(media.resolve("/etc/passwd"), None);
        assert_eq!(media.resolve("recipes/../../secret"), None);
        assert_eq!(media.resolve("   "), None);
    }

    #[tokio::test]
    async fn test_existing_file_checks_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("recipes")).unwrap();
        std::fs::write(dir.path().join("recipes/soup.jpg"), b"jpeg").unwrap();

        let media = MediaLibrary::new(dir.path());
        assert_eq!(
            media.existing_file(Some("recipes/soup.jpg")).await,
            Some(dir.path().join("recipes/soup.jpg"))
        );
        assert_eq!(media.existing_file(Some("recipes/missing.jpg")).await, None);
        // Directories are not images
        assert_eq!(media.existing_file(Some("recipes")).await, None);
        assert_eq!(media.existing_file(None).await, None);
    }
}
