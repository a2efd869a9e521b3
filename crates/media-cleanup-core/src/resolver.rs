use crate::storage::AttachmentRecord;
use std::path::{Component, Path, PathBuf};

/// Maps an attachment record to the file it declares on disk.
pub trait PathResolver {
    /// `None` when the record declares no file at all.
    fn resolve(&self, record: &AttachmentRecord) -> Option<PathBuf>;
}

/// Resolves declared paths against the upload directory: absolute paths are
/// kept, relative ones are joined onto `base_dir`.
#[derive(Debug, Clone)]
pub struct UploadsResolver {
    base_dir: PathBuf,
}

impl UploadsResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl PathResolver for UploadsResolver {
    fn resolve(&self, record: &AttachmentRecord) -> Option<PathBuf> {
        let declared = record.attached_file.as_deref()?;
        if declared.trim().is_empty() {
            return None;
        }
        let declared = Path::new(declared);
        if declared.is_absolute() {
            Some(declared.to_path_buf())
        } else {
            Some(self.base_dir.join(declared))
        }
    }
}

/// Path of `path` relative to `root`, joined with `/` regardless of platform.
/// Paths outside `root` come back unchanged.
pub fn relative_upload_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .filter_map(|comp| match comp {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}

/// Lexically fold `.` and `..` out of `path`. `..` never climbs above the
/// filesystem root or the start of a relative path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `path` lies inside `root`, after folding `..` and, where the
/// directories exist, after resolving symlinks.
pub fn is_within_root(root: &Path, path: &Path) -> bool {
    let root = normalize_path(root);
    let path = normalize_path(path);
    if !path.starts_with(&root) || path == root {
        return false;
    }

    match (root.canonicalize(), path.parent().map(Path::canonicalize)) {
        (Ok(root), Some(Ok(parent))) => parent.starts_with(root),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: Option<&str>) -> AttachmentRecord {
        AttachmentRecord {
            id: 1,
            attached_file: file.map(str::to_string),
            metadata: None,
        }
    }

    #[test]
    fn test_relative_declared_path_joins_base_dir() {
        let resolver = UploadsResolver::new("/srv/uploads");
        assert_eq!(
            resolver.resolve(&record(Some("2024/05/cat.jpg"))),
            Some(PathBuf::from("/srv/uploads/2024/05/cat.jpg"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_declared_path_kept() {
        let resolver = UploadsResolver::new("/srv/uploads");
        assert_eq!(
            resolver.resolve(&record(Some("/mnt/media/dog.png"))),
            Some(PathBuf::from("/mnt/media/dog.png"))
        );
    }

    #[test]
    fn test_missing_or_blank_declared_path() {
        let resolver = UploadsResolver::new("/srv/uploads");
        assert_eq!(resolver.resolve(&record(None)), None);
        assert_eq!(resolver.resolve(&record(Some("  "))), None);
    }

    #[test]
    fn test_declared_path_is_not_rewritten() {
        let resolver = UploadsResolver::new("/srv/uploads");
        assert_eq!(
            resolver.resolve(&record(Some(" cat .jpg"))),
            Some(PathBuf::from("/srv/uploads/ cat .jpg"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/srv/uploads/../outside/./x.jpg")),
            PathBuf::from("/srv/outside/x.jpg")
        );
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("../a/../b")), PathBuf::from("../b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_within_root() {
        let root = Path::new("/srv/uploads");
        assert!(is_within_root(root, Path::new("/srv/uploads/2024/cat.jpg")));
        assert!(!is_within_root(root, Path::new("/srv/uploads/../outside/cat.jpg")));
        assert!(!is_within_root(root, Path::new("/srv/uploads-old/cat.jpg")));
        assert!(!is_within_root(root, Path::new("/srv/uploads")));
        assert!(!is_within_root(root, Path::new("/etc/passwd")));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_within_root_follows_symlinked_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("uploads");
        let outside = tmp.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        assert!(!is_within_root(&root, &root.join("link").join("victim.txt")));
    }

    #[test]
    fn test_relative_upload_path() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            relative_upload_path(root, Path::new("/srv/uploads/2024/05/cat.jpg")),
            "2024/05/cat.jpg"
        );
        assert_eq!(
            relative_upload_path(root, Path::new("/elsewhere/x.jpg")),
            "/elsewhere/x.jpg"
        );
    }
}
