use super::walk::collect_upload_files;
use crate::config::QueryErrorPolicy;
use crate::error::Error;
use crate::progress::{Phase, ProgressReporter};
use crate::storage::{FileEntry, MetadataStore};
use std::path::Path;
use tracing::{info, warn};

/// Classification of every file under the upload root.
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// Every file found by the walk, hidden ones included.
    pub total: usize,
    /// Files referenced by at least one attachment.
    pub valid: usize,
    /// Dot-files, never looked up and never deleted.
    pub hidden: usize,
    /// Non UTF-8 names, warned about and left alone.
    pub skipped: usize,
    pub orphans: Vec<FileEntry>,
}

/// Find files under `root` that no attachment references, either by exact
/// relative path on the attached-file field or by basename substring inside
/// the metadata blob.
///
/// The substring match is deliberately loose: metadata blobs list the size
/// variants (thumbnails, crops) that have no record of their own. A basename
/// that happens to appear in an unrelated blob is classified valid.
pub fn scan_files(
    root: &Path,
    store: &dyn MetadataStore,
    policy: QueryErrorPolicy,
    reporter: &dyn ProgressReporter,
) -> Result<FileScan, Error> {
    info!("Scanning uploads folder: {}", root.display());

    let listing = collect_upload_files(root)?;
    let total = listing.files.len() + listing.skipped.len();
    info!("You have {} files in total.", total);
    reporter.on_scan_start(Phase::Files, listing.files.len());

    let mut scan = FileScan {
        total,
        skipped: listing.skipped.len(),
        ..FileScan::default()
    };

    for (checked, file) in listing.files.into_iter().enumerate() {
        reporter.on_scan_progress(Phase::Files, checked + 1);

        if file.is_hidden() {
            scan.hidden += 1;
            continue;
        }

        let referenced =
            match store.find_referencing_attachments(&file.relative_path, &file.file_name) {
                Ok(ids) => !ids.is_empty(),
                Err(err) => match policy {
                    QueryErrorPolicy::Propagate => return Err(err),
                    QueryErrorPolicy::TreatAsOrphan => {
                        warn!(
                            "Lookup failed for {}, counting it as orphaned: {}",
                            file.relative_path, err
                        );
                        false
                    }
                },
            };

        if referenced {
            scan.valid += 1;
        } else {
            info!("No attachment found for {}", file.relative_path);
            scan.orphans.push(file);
        }
    }

    reporter.on_scan_complete(Phase::Files, scan.orphans.len());
    info!("There are {} files with valid attachments.", scan.valid);
    info!(
        "There are {} files with no attachment associated.",
        scan.orphans.len()
    );

    Ok(scan)
}
