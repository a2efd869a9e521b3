use super::models::*;
use super::sqlite::Database;
use rusqlite::{params, OptionalExtension, Result};
use tracing::debug;

impl Database {
    // ── Attachments ──────────────────────────────────────────────

    /// Insert an attachment post with its attached-file and metadata meta rows.
    pub fn insert_attachment(
        &self,
        title: &str,
        attached_file: Option<&str>,
        metadata: Option<&str>,
    ) -> Result<AttachmentId> {
        let tx = self.connection().unchecked_transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {} (post_type, post_title) VALUES ('attachment', ?1)",
                self.posts_table()
            ),
            params![title],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare_cached(&format!(
                "INSERT INTO {} (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
                self.postmeta_table()
            ))?;
            if let Some(file) = attached_file {
                stmt.execute(params![id, self.settings().attached_file_key, file])?;
            }
            if let Some(meta) = metadata {
                stmt.execute(params![id, self.settings().metadata_key, meta])?;
            }
        }
        tx.commit()?;
        Ok(id)
    }

    fn attachment_select(&self) -> String {
        format!(
            "SELECT p.ID, \
               (SELECT m.meta_value FROM {meta} m WHERE m.post_id = p.ID AND m.meta_key = ?1 \
                ORDER BY m.meta_id LIMIT 1), \
               (SELECT m.meta_value FROM {meta} m WHERE m.post_id = p.ID AND m.meta_key = ?2 \
                ORDER BY m.meta_id LIMIT 1) \
             FROM {posts} p WHERE p.post_type = 'attachment'",
            meta = self.postmeta_table(),
            posts = self.posts_table(),
        )
    }

    /// All attachment posts, unpaged, in ascending id order.
    pub fn list_attachments(&self) -> Result<Vec<AttachmentRecord>> {
        let sql = format!("{} ORDER BY p.ID", self.attachment_select());
        let mut stmt = self.connection().prepare(&sql)?;
        let settings = self.settings();
        let records = stmt
            .query_map(
                params![settings.attached_file_key, settings.metadata_key],
                |row| {
                    Ok(AttachmentRecord {
                        id: row.get(0)?,
                        attached_file: row.get(1)?,
                        metadata: row.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>>>()?;
        debug!("Loaded {} attachment records", records.len());
        Ok(records)
    }

    pub fn get_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentRecord>> {
        let sql = format!("{} AND p.ID = ?3", self.attachment_select());
        let settings = self.settings();
        self.connection()
            .query_row(
                &sql,
                params![settings.attached_file_key, settings.metadata_key, id],
                |row| {
                    Ok(AttachmentRecord {
                        id: row.get(0)?,
                        attached_file: row.get(1)?,
                        metadata: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    /// Ids of posts whose attached-file meta equals `relative_path`, or whose
    /// metadata meta contains `file_name` anywhere in its text, ignoring ASCII
    /// case in both.
    pub fn find_referencing_attachments(
        &self,
        relative_path: &str,
        file_name: &str,
    ) -> Result<Vec<AttachmentId>> {
        // Case-insensitive like the MySQL `_ci` collations WordPress ships with.
        // instr() rather than LIKE so '%' and '_' in file names match literally.
        let mut stmt = self.connection().prepare_cached(&format!(
            "SELECT DISTINCT post_id FROM {} \
             WHERE (meta_key = ?1 AND meta_value = ?2 COLLATE NOCASE) \
                OR (meta_key = ?3 AND instr(lower(meta_value), lower(?4)) > 0)",
            self.postmeta_table()
        ))?;
        let settings = self.settings();
        let ids = stmt
            .query_map(
                params![
                    settings.attached_file_key,
                    relative_path,
                    settings.metadata_key,
                    file_name
                ],
                |row| row.get(0),
            )?
            .collect::<Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// Delete an attachment post and all of its meta rows.
    /// Returns false when no such attachment exists.
    pub fn delete_attachment_rows(&self, id: AttachmentId) -> Result<bool> {
        let tx = self.connection().unchecked_transaction()?;
        let removed = tx.execute(
            &format!(
                "DELETE FROM {} WHERE ID = ?1 AND post_type = 'attachment'",
                self.posts_table()
            ),
            params![id],
        )?;
        if removed > 0 {
            tx.execute(
                &format!("DELETE FROM {} WHERE post_id = ?1", self.postmeta_table()),
                params![id],
            )?;
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn count_attachments(&self) -> Result<i64> {
        self.connection().query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE post_type = 'attachment'",
                self.posts_table()
            ),
            [],
            |row| row.get(0),
        )
    }
}
