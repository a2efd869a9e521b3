pub mod models;
mod queries;
pub mod sqlite;

pub use models::{AttachmentId, AttachmentMetadata, AttachmentRecord, FileEntry};
pub use sqlite::{Database, StoreSettings};

use crate::error::Error;

/// The metadata store the cleanup reads attachments from and deletes them in.
///
/// `Database` implements it over SQLite; tests substitute their own stores to
/// inject failures.
pub trait MetadataStore {
    /// Every attachment record, unpaged.
    fn list_attachments(&self) -> Result<Vec<AttachmentRecord>, Error>;

    fn get_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentRecord>, Error>;

    /// Records whose attached-file field equals `relative_path` exactly, or
    /// whose metadata field contains `file_name` as a substring.
    fn find_referencing_attachments(
        &self,
        relative_path: &str,
        file_name: &str,
    ) -> Result<Vec<AttachmentId>, Error>;

    /// Remove the record and its meta. Returns false if it was already gone.
    fn delete_attachment(&self, id: AttachmentId) -> Result<bool, Error>;
}

impl MetadataStore for Database {
    fn list_attachments(&self) -> Result<Vec<AttachmentRecord>, Error> {
        Ok(Database::list_attachments(self)?)
    }

    fn get_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentRecord>, Error> {
        Ok(Database::get_attachment(self, id)?)
    }

    fn find_referencing_attachments(
        &self,
        relative_path: &str,
        file_name: &str,
    ) -> Result<Vec<AttachmentId>, Error> {
        Ok(Database::find_referencing_attachments(
            self,
            relative_path,
            file_name,
        )?)
    }

    fn delete_attachment(&self, id: AttachmentId) -> Result<bool, Error> {
        Ok(self.delete_attachment_rows(id)?)
    }
}
