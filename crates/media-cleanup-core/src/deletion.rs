use crate::progress::{Phase, ProgressReporter};
use crate::resolver::{is_within_root, PathResolver};
use crate::storage::{AttachmentId, AttachmentMetadata, AttachmentRecord, FileEntry, MetadataStore};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Gone before we got to it.
    NotFound,
    PermissionDenied,
    /// The metadata store refused or failed the delete.
    StoreRejected(String),
    Other(String),
}

impl From<&io::Error> for FailureReason {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FailureReason::NotFound,
            io::ErrorKind::PermissionDenied => FailureReason::PermissionDenied,
            _ => FailureReason::Other(err.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => write!(f, "not found"),
            FailureReason::PermissionDenied => write!(f, "permission denied"),
            FailureReason::StoreRejected(msg) => write!(f, "store rejected delete: {}", msg),
            FailureReason::Other(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// `#<id>` for attachments, the absolute path for files.
    pub target: String,
    pub reason: FailureReason,
}

/// Result of a best-effort batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub deleted: usize,
    pub failures: Vec<DeletionFailure>,
}

impl DeletionOutcome {
    fn fail(&mut self, target: String, reason: FailureReason) {
        self.failures.push(DeletionFailure { target, reason });
    }
}

/// Delete each attachment record and the files derived from it.
///
/// A record counts once its rows are gone; failures removing its files are
/// only logged, and files outside `upload_root` are never touched. A record
/// that vanished or that the store refuses to delete is recorded as a failure
/// and the batch carries on.
pub fn delete_attachments(
    ids: &[AttachmentId],
    store: &dyn MetadataStore,
    resolver: &dyn PathResolver,
    upload_root: &Path,
    reporter: &dyn ProgressReporter,
) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();
    reporter.on_delete_start(Phase::Attachments, ids.len());

    for (processed, &id) in ids.iter().enumerate() {
        reporter.on_delete_progress(Phase::Attachments, processed + 1);
        let target = format!("#{}", id);

        let record = match store.get_attachment(id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("Attachment not exists: {}", target);
                outcome.fail(target, FailureReason::NotFound);
                continue;
            }
            Err(e) => {
                warn!("Could not load attachment {}: {}", target, e);
                outcome.fail(target, FailureReason::StoreRejected(e.to_string()));
                continue;
            }
        };

        let artifacts = derived_artifacts(&record, resolver);

        match store.delete_attachment(id) {
            Ok(true) => {}
            Ok(false) => {
                warn!("Attachment not exists: {}", target);
                outcome.fail(target, FailureReason::NotFound);
                continue;
            }
            Err(e) => {
                warn!("Could not delete attachment {}: {}", target, e);
                outcome.fail(target, FailureReason::StoreRejected(e.to_string()));
                continue;
            }
        }

        for artifact in &artifacts {
            remove_artifact(upload_root, artifact);
        }
        debug!("Deleted attachment {}", target);
        outcome.deleted += 1;
    }

    reporter.on_delete_complete(Phase::Attachments, outcome.deleted, outcome.failures.len());
    info!("Deleted {} invalid attachments.", outcome.deleted);
    outcome
}

/// The declared file plus every size variant listed in the metadata. Variants
/// live next to the declared file.
pub fn derived_artifacts(record: &AttachmentRecord, resolver: &dyn PathResolver) -> Vec<PathBuf> {
    let metadata = record.metadata.as_deref().and_then(AttachmentMetadata::parse);

    let main = resolver.resolve(record).or_else(|| {
        let file = metadata.as_ref()?.file.clone()?;
        resolver.resolve(&AttachmentRecord {
            attached_file: Some(file),
            ..record.clone()
        })
    });

    let Some(main) = main else {
        return Vec::new();
    };

    let mut artifacts = vec![main.clone()];
    if let (Some(metadata), Some(dir)) = (metadata, main.parent()) {
        for variant in metadata.variant_files() {
            // Only the basename: variants never point outside their directory.
            if let Some(name) = Path::new(variant).file_name() {
                let path = dir.join(name);
                if !artifacts.contains(&path) {
                    artifacts.push(path);
                }
            }
        }
    }
    artifacts
}

fn remove_artifact(upload_root: &Path, path: &Path) {
    if !is_within_root(upload_root, path) {
        warn!(
            "Refusing to delete {} outside upload root {}",
            path.display(),
            upload_root.display()
        );
        return;
    }
    if fs::symlink_metadata(path).is_err() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) => warn!("Could not delete file: {} ({})", path.display(), e),
    }
}

/// Delete orphaned files one by one, re-checking each exists first.
pub fn delete_files(files: &[FileEntry], reporter: &dyn ProgressReporter) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();
    reporter.on_delete_start(Phase::Files, files.len());

    for (processed, file) in files.iter().enumerate() {
        reporter.on_delete_progress(Phase::Files, processed + 1);
        let target = file.path.to_string_lossy().into_owned();

        // symlink_metadata so dangling links found by the walk are still removable
        if fs::symlink_metadata(&file.path).is_err() {
            warn!("File not exists: {}", target);
            outcome.fail(target, FailureReason::NotFound);
            continue;
        }

        match fs::remove_file(&file.path) {
            Ok(()) => {
                debug!("Deleted {}", target);
                outcome.deleted += 1;
            }
            Err(e) => {
                warn!("Could not delete file: {} ({})", target, e);
                outcome.fail(target, FailureReason::from(&e));
            }
        }
    }

    reporter.on_delete_complete(Phase::Files, outcome.deleted, outcome.failures.len());
    info!("Deleted {} invalid files.", outcome.deleted);
    outcome
}
