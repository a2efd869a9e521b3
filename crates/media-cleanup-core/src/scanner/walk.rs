use crate::error::Error;
use crate::resolver::relative_upload_path;
use crate::storage::FileEntry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Files found under the upload root.
#[derive(Debug, Default)]
pub struct UploadListing {
    pub files: Vec<FileEntry>,
    /// Paths that are not valid UTF-8 below the root. They cannot be compared
    /// with store values, so they are neither classified nor deleted.
    pub skipped: Vec<PathBuf>,
}

/// Recursive traversal of the upload root. Every non-directory entry below
/// `root` is returned, sorted by name within each directory. Symlinks are
/// listed but not followed.
///
/// A missing or unreadable root, or any unreadable subdirectory, fails the
/// whole walk.
pub fn collect_upload_files(root: &Path) -> Result<UploadListing, Error> {
    let metadata = fs::metadata(root).map_err(|err| {
        std::io::Error::new(
            err.kind(),
            format!("Error reading upload root {}: {}", root.display(), err),
        )
    })?;
    if !metadata.is_dir() {
        return Err(Error::Other(format!(
            "Upload root {} is not a directory",
            root.display()
        )));
    }

    let mut listing = UploadListing::default();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let utf8 = path
            .strip_prefix(root)
            .map(|rel| rel.to_str().is_some())
            .unwrap_or(false);
        let file_name = match entry.file_name().to_str() {
            Some(name) if utf8 => name.to_string(),
            _ => {
                warn!(
                    "Skipping {}: file name is not valid UTF-8",
                    path.display()
                );
                listing.skipped.push(path);
                continue;
            }
        };

        let relative_path = relative_upload_path(root, &path);
        listing.files.push(FileEntry {
            path,
            file_name,
            relative_path,
        });
    }

    debug!(
        "Walked {}: {} files, {} skipped",
        root.display(),
        listing.files.len(),
        listing.skipped.len()
    );
    Ok(listing)
}
