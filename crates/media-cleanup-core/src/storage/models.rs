use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub type AttachmentId = i64;

/// An attachment post and the two meta values the cleanup cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub id: AttachmentId,
    /// Declared file path, relative to the upload dir or absolute.
    pub attached_file: Option<String>,
    /// Serialized attachment metadata, treated as opaque text while scanning.
    pub metadata: Option<String>,
}

/// A file found under the upload root during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// Path relative to the upload root, always `/`-separated.
    pub relative_path: String,
}

impl FileEntry {
    pub fn is_hidden(&self) -> bool {
        self.file_name.starts_with('.')
    }
}

/// The parts of the metadata blob that name derived files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentMetadata {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SizeVariant {
    pub file: String,
}

impl AttachmentMetadata {
    /// Parse a metadata blob. Anything that is not the expected JSON shape
    /// yields `None`.
    pub fn parse(blob: &str) -> Option<Self> {
        serde_json::from_str(blob).ok()
    }

    pub fn variant_files(&self) -> impl Iterator<Item = &str> {
        self.sizes.values().map(|v| v.file.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_with_sizes() {
        let blob = r#"{"file":"2024/05/cat.jpg","sizes":{
            "thumbnail":{"file":"cat-150x150.jpg"},
            "medium":{"file":"cat-300x200.jpg"}}}"#;
        let meta = AttachmentMetadata::parse(blob).unwrap();
        assert_eq!(meta.file.as_deref(), Some("2024/05/cat.jpg"));
        let mut files: Vec<&str> = meta.variant_files().collect();
        files.sort();
        assert_eq!(files, vec!["cat-150x150.jpg", "cat-300x200.jpg"]);
    }

    #[test]
    fn test_parse_metadata_rejects_garbage() {
        assert!(AttachmentMetadata::parse("a:2:{s:4:\"file\";}").is_none());
    }

    #[test]
    fn test_hidden_file_entry() {
        let entry = FileEntry {
            path: PathBuf::from("/up/.htaccess"),
            file_name: ".htaccess".to_string(),
            relative_path: ".htaccess".to_string(),
        };
        assert!(entry.is_hidden());
    }
}
