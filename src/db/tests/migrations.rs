use super::open_temp_db;

#[tokio::test]
async fn test_database_creation() {
    let (db, _temp_file) = open_temp_db().await;

    let mut conn = db.pool.acquire().await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();

    for table in ["users", "sessions", "questions", "quiz_attempts", "schema_version"] {
        assert!(
            tables.contains(&table.to_string()),
            "missing table {table}, got {tables:?}"
        );
    }

    drop(conn);
    db.close().await;
}

#[tokio::test]
async fn test_reopen_does_not_reapply_migrations() {
    let temp_file = tempfile::NamedTempFile::new().unwrap();

    let db = crate::db::Database::new(temp_file.path()).await.unwrap();
    assert_eq!(db.schema_version().await.unwrap(), 1);
    db.close().await;

    // A second open must see v1 and skip CREATE TABLE (which would fail)
    let db = crate::db::Database::new(temp_file.path()).await.unwrap();
    assert_eq!(db.schema_version().await.unwrap(), 1);
    db.close().await;
}
