use crate::db::*;
use crate::types::SessionId;
use std::collections::BTreeMap;
use tempfile::NamedTempFile;

mod migrations;

/// Open a fresh database in a temp file (keep the file alive for the test)
async fn open_temp_db() -> (Database, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    (db, temp_file)
}

/// Insert a user and a session owned by them
async fn seed_session(db: &Database, id: &str) -> SessionId {
    let user_id = db
        .insert_user(&NewUser {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        })
        .await
        .unwrap();

    let session_id = SessionId::parse(id).unwrap();
    db.insert_session(&NewSession {
        id: session_id.clone(),
        user_id,
        total_marks: 7,
        topic: Some("arithmetic".to_string()),
        session_date: 1_700_000_000,
    })
    .await
    .unwrap();

    session_id
}

/// Insert a question whose correct answer is "a"
async fn seed_question(db: &Database, text: &str) -> i64 {
    let mut options = BTreeMap::new();
    options.insert("a".to_string(), "right".to_string());
    options.insert("b".to_string(), "wrong".to_string());

    db.insert_question(&NewQuestion {
        question: text.to_string(),
        options,
        answer: "a".to_string(),
        topic: Some("arithmetic".to_string()),
    })
    .await
    .unwrap()
}
