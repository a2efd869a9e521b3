use crate::error::Error;
use crate::progress::{Phase, ProgressReporter};
use crate::resolver::PathResolver;
use crate::storage::{AttachmentId, MetadataStore};
use tracing::{debug, info};

/// Ids of all attachments whose resolved file does not exist right now.
/// A record that declares no file at all counts as missing.
pub fn scan_attachments(
    store: &dyn MetadataStore,
    resolver: &dyn PathResolver,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<AttachmentId>, Error> {
    info!("Scanning attachments...");

    let attachments = store.list_attachments()?;
    reporter.on_scan_start(Phase::Attachments, attachments.len());

    let mut missing_files = Vec::new();
    for (checked, attachment) in attachments.iter().enumerate() {
        let exists = match resolver.resolve(attachment) {
            Some(path) => {
                debug!("Attachment #{} -> {}", attachment.id, path.display());
                path.exists()
            }
            None => false,
        };

        if !exists {
            info!("No file found for attachment #{}", attachment.id);
            missing_files.push(attachment.id);
        }
        reporter.on_scan_progress(Phase::Attachments, checked + 1);
    }

    reporter.on_scan_complete(Phase::Attachments, missing_files.len());
    info!(
        "You have {} attachments with no file associated.",
        missing_files.len()
    );

    Ok(missing_files)
}
