//! Database fixtures: users, sessions, questions and attempts

use quiz_report::db::{NewAttempt, NewQuestion, NewSession, NewUser};
use quiz_report::config::MailTransportKind;
use quiz_report::{Config, Database, QuizReporter, SessionId};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tempfile::TempDir;

/// Open a fresh database in a temp dir (which must be kept alive)
pub async fn create_database() -> (Database, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("quiz.db"))
        .await
        .expect("Failed to open database");
    (db, temp_dir)
}

/// Seed one session with `attempts` answered questions
///
/// Question `n` is answered wrongly when `n` is in `wrong`, correctly
/// otherwise. The owner's address is `<id>@example.com`.
pub async fn seed_session(db: &Database, id: &str, attempts: usize, wrong: &[usize]) -> SessionId {
    let user_id = db
        .insert_user(&NewUser {
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            email: format!("{id}@example.com"),
        })
        .await
        .expect("Failed to insert user");

    let session_id = SessionId::parse(id).expect("Invalid session id");
    db.insert_session(&NewSession {
        id: session_id.clone(),
        user_id,
        total_marks: (attempts - wrong.len()) as i64,
        topic: Some("computability".into()),
        session_date: 1_717_200_000,
    })
    .await
    .expect("Failed to insert session");

    for n in 1..=attempts {
        let mut options = BTreeMap::new();
        options.insert("a".to_string(), format!("Option A{n}"));
        options.insert("b".to_string(), format!("Option B{n}"));

        let question_id = db
            .insert_question(&NewQuestion {
                question: format!("Q{n}: does the machine halt?"),
                options,
                answer: "a".into(),
                topic: Some("computability".into()),
            })
            .await
            .expect("Failed to insert question");

        // Leave grading to the report for half of the attempts
        let chosen = if wrong.contains(&n) { "b" } else { "a" };
        let is_correct = (n % 2 == 0).then_some(chosen == "a");
        db.insert_attempt(&NewAttempt {
            session_id: session_id.clone(),
            question_id,
            answer: Some(chosen.into()),
            is_correct,
        })
        .await
        .expect("Failed to insert attempt");
    }

    session_id
}

/// Build a reporter over `db` sending mail through the HTTP relay at `mail_endpoint`
pub fn create_reporter(db: Database, temp_dir: &TempDir, mail_endpoint: &str) -> QuizReporter {
    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("quiz.db");
    config.mail.transport = MailTransportKind::Http;
    config.mail.endpoint = mail_endpoint.to_string();
    config.api.bind_address = free_local_addr();
    QuizReporter::with_database(db, config).expect("Failed to build reporter")
}

/// Find a free localhost port
pub fn free_local_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("Failed to read local addr")
}
