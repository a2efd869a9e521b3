use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

/// What to do when the reference lookup for a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorPolicy {
    /// Abort the file scan with the store error.
    #[default]
    Propagate,
    /// Log a warning and count the file as orphaned.
    TreatAsOrphan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub upload_dir: String,
    pub table_prefix: String,
    pub attached_file_key: String,
    pub metadata_key: String,
    pub query_error_policy: QueryErrorPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "media.db".to_string(),
            upload_dir: "uploads".to_string(),
            table_prefix: "wp_".to_string(),
            attached_file_key: "_wp_attached_file".to_string(),
            metadata_key: "_wp_attachment_metadata".to_string(),
            query_error_policy: QueryErrorPolicy::Propagate,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("MEDIA_CLEANUP"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
