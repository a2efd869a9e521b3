use crate::config::AppConfig;
use crate::error::Error;
use rusqlite::Connection;
use tracing::debug;

/// Table and meta-key naming for a WordPress-shaped metadata store.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub table_prefix: String,
    pub attached_file_key: String,
    pub metadata_key: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for StoreSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            table_prefix: config.table_prefix.clone(),
            attached_file_key: config.attached_file_key.clone(),
            metadata_key: config.metadata_key.clone(),
        }
    }
}

pub struct Database {
    conn: Connection,
    settings: StoreSettings,
    posts_table: String,
    postmeta_table: String,
}

impl Database {
    pub fn open(path: &str, settings: StoreSettings) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Self::init(conn, settings)
    }

    pub fn open_in_memory(settings: StoreSettings) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, settings)
    }

    fn init(conn: Connection, settings: StoreSettings) -> Result<Self, Error> {
        // The prefix is spliced into SQL text, so keep it to identifier characters.
        if !settings
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Other(format!(
                "Invalid table prefix '{}'",
                settings.table_prefix
            )));
        }

        let db = Database {
            posts_table: format!("{}posts", settings.table_prefix),
            postmeta_table: format!("{}postmeta", settings.table_prefix),
            conn,
            settings,
        };
        db.configure_pragmas()?;
        db.ensure_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured");
        Ok(())
    }

    /// Create the posts/postmeta tables when missing. Existing tables are
    /// never dropped or altered.
    fn ensure_schema(&self) -> rusqlite::Result<()> {
        let schema = include_str!("schema.sql").replace("{prefix}", &self.settings.table_prefix);
        self.conn.execute_batch(&schema)?;
        debug!(
            "SQLite schema ready ({}, {})",
            self.posts_table, self.postmeta_table
        );
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub(crate) fn posts_table(&self) -> &str {
        &self.posts_table
    }

    pub(crate) fn postmeta_table(&self) -> &str {
        &self.postmeta_table
    }
}
