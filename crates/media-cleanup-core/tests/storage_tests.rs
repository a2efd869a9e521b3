use media_cleanup_core::storage::{Database, MetadataStore, StoreSettings};

fn open_db() -> Database {
    Database::open_in_memory(StoreSettings::default()).unwrap()
}

#[test]
fn test_insert_and_list_attachments() {
    let db = open_db();
    let a = db
        .insert_attachment("cat", Some("2024/05/cat.jpg"), Some(r#"{"file":"2024/05/cat.jpg"}"#))
        .unwrap();
    let b = db.insert_attachment("no meta", None, None).unwrap();
    assert!(b > a);

    let records = db.list_attachments().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, a);
    assert_eq!(records[0].attached_file.as_deref(), Some("2024/05/cat.jpg"));
    assert!(records[0].metadata.is_some());
    assert_eq!(records[1].id, b);
    assert_eq!(records[1].attached_file, None);
    assert_eq!(records[1].metadata, None);
}

#[test]
fn test_list_ignores_non_attachment_posts() {
    let db = open_db();
    db.insert_attachment("cat", Some("cat.jpg"), None).unwrap();
    db.connection()
        .execute(
            "INSERT INTO wp_posts (post_type, post_title) VALUES ('page', 'About')",
            [],
        )
        .unwrap();

    assert_eq!(db.list_attachments().unwrap().len(), 1);
    assert_eq!(db.count_attachments().unwrap(), 1);
}

#[test]
fn test_find_referencing_by_exact_path() {
    let db = open_db();
    let id = db.insert_attachment("cat", Some("2024/05/cat.jpg"), None).unwrap();

    assert_eq!(
        db.find_referencing_attachments("2024/05/cat.jpg", "cat.jpg").unwrap(),
        vec![id]
    );
    // exact means exact: a different directory does not match the attached-file field
    assert!(db
        .find_referencing_attachments("2023/01/cat.jpg", "cat.jpg")
        .unwrap()
        .is_empty());
}

#[test]
fn test_find_referencing_by_metadata_substring() {
    let db = open_db();
    let id = db
        .insert_attachment(
            "cat",
            Some("2024/05/cat.jpg"),
            Some(r#"{"file":"2024/05/cat.jpg","sizes":{"thumbnail":{"file":"cat-150x150.jpg"}}}"#),
        )
        .unwrap();

    assert_eq!(
        db.find_referencing_attachments("2024/05/cat-150x150.jpg", "cat-150x150.jpg")
            .unwrap(),
        vec![id]
    );
    assert!(db
        .find_referencing_attachments("2024/05/dog.jpg", "dog.jpg")
        .unwrap()
        .is_empty());
}

#[test]
fn test_substring_match_treats_like_wildcards_literally() {
    let db = open_db();
    db.insert_attachment("pct", Some("a.jpg"), Some(r#"{"sizes":{"s":{"file":"100%_off.jpg"}}}"#))
        .unwrap();

    assert_eq!(
        db.find_referencing_attachments("100%_off.jpg", "100%_off.jpg")
            .unwrap()
            .len(),
        1
    );
    // '%' and '_' must not behave as LIKE wildcards
    assert!(db
        .find_referencing_attachments("100xyoff.jpg", "100xyoff.jpg")
        .unwrap()
        .is_empty());
}

#[test]
fn test_find_referencing_ignores_case() {
    let db = open_db();
    let id = db
        .insert_attachment(
            "cat",
            Some("2024/Cat.JPG"),
            Some(r#"{"file":"2024/Cat.JPG","sizes":{"thumbnail":{"file":"cat-150x150.jpg"}}}"#),
        )
        .unwrap();

    assert_eq!(
        db.find_referencing_attachments("2024/cat.jpg", "nomatch.png").unwrap(),
        vec![id]
    );
    assert_eq!(
        db.find_referencing_attachments("2024/Cat-150x150.JPG", "Cat-150x150.JPG")
            .unwrap(),
        vec![id]
    );
}

#[test]
fn test_find_referencing_returns_each_record_once() {
    let db = open_db();
    let id = db
        .insert_attachment("cat", Some("cat.jpg"), Some(r#"{"file":"cat.jpg"}"#))
        .unwrap();
    assert_eq!(db.find_referencing_attachments("cat.jpg", "cat.jpg").unwrap(), vec![id]);
}

#[test]
fn test_delete_attachment_removes_post_and_meta() {
    let db = open_db();
    let id = db
        .insert_attachment("cat", Some("cat.jpg"), Some(r#"{"file":"cat.jpg"}"#))
        .unwrap();

    assert!(MetadataStore::delete_attachment(&db, id).unwrap());
    assert!(db.get_attachment(id).unwrap().is_none());

    let meta_rows: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM wp_postmeta WHERE post_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(meta_rows, 0);

    // second delete finds nothing
    assert!(!MetadataStore::delete_attachment(&db, id).unwrap());
}

#[test]
fn test_custom_meta_keys() {
    let settings = StoreSettings {
        table_prefix: "cms_".to_string(),
        attached_file_key: "file_path".to_string(),
        metadata_key: "file_meta".to_string(),
    };
    let db = Database::open_in_memory(settings).unwrap();
    let id = db
        .insert_attachment("x", Some("x.png"), Some("x-thumb.png"))
        .unwrap();

    let key: String = db
        .connection()
        .query_row(
            "SELECT meta_key FROM cms_postmeta WHERE post_id = ?1 ORDER BY meta_id LIMIT 1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(key, "file_path");
    assert_eq!(
        db.find_referencing_attachments("nope", "x-thumb.png").unwrap(),
        vec![id]
    );
}

#[test]
fn test_open_on_disk_keeps_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("media.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::open(path, StoreSettings::default()).unwrap();
        db.insert_attachment("cat", Some("cat.jpg"), None).unwrap();
    }

    let db = Database::open(path, StoreSettings::default()).unwrap();
    assert_eq!(db.count_attachments().unwrap(), 1);
}
