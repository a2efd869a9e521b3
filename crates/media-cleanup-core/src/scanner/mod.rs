mod attachments;
mod files;
pub mod walk;

pub use attachments::scan_attachments;
pub use files::{scan_files, FileScan};
