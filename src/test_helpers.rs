//! Shared fixtures for service and API tests.

use crate::db::{Database, NewAttempt, NewQuestion, NewSession, NewUser};
use crate::error::{Error, Result};
use crate::render::EmailMessage;
use crate::transport::MessageTransport;
use crate::types::SessionId;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Open a database inside a fresh temp dir (which must be kept alive)
pub(crate) async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
    (db, temp_dir)
}

/// Seed a session with `attempts` answered questions
///
/// Every answer is correct unless its question number is in `wrong`.
pub(crate) async fn seed_quiz(db: &Database, id: &str, attempts: usize, wrong: &[usize]) -> SessionId {
    let user_id = db
        .insert_user(&NewUser {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: format!("{id}@example.com"),
        })
        .await
        .unwrap();

    let session_id = SessionId::parse(id).unwrap();
    db.insert_session(&NewSession {
        id: session_id.clone(),
        user_id,
        total_marks: (attempts - wrong.len()) as i64,
        topic: Some("compilers".into()),
        session_date: 1_700_000_000,
    })
    .await
    .unwrap();

    for n in 1..=attempts {
        let mut options = BTreeMap::new();
        options.insert("a".to_string(), format!("answer {n}"));
        options.insert("b".to_string(), "something else".to_string());

        let question_id = db
            .insert_question(&NewQuestion {
                question: format!("Question number {n}?"),
                options,
                answer: "a".into(),
                topic: Some("compilers".into()),
            })
            .await
            .unwrap();

        let chosen = if wrong.contains(&n) { "b" } else { "a" };
        db.insert_attempt(&NewAttempt {
            session_id: session_id.clone(),
            question_id,
            answer: Some(chosen.into()),
            is_correct: Some(chosen == "a"),
        })
        .await
        .unwrap();
    }

    session_id
}

/// Transport that records messages and rejects chosen parts
#[derive(Default)]
pub(crate) struct RecordingTransport {
    /// Subject fragments (e.g. "Part 2/") that make a send fail
    pub reject: Vec<String>,
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingTransport {
    pub fn rejecting(fragments: &[&str]) -> Self {
        Self {
            reject: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub async fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self
            .sent
            .lock()
            .await
            .iter()
            .map(|m| m.subject.clone())
            .collect();
        subjects.sort();
        subjects
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.reject.iter().any(|f| message.subject.contains(f.as_str())) {
            return Err(Error::Transport("recipient rejected".into()));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// One message accepted by [`FakeSmtpServer`]
#[derive(Clone, Debug)]
pub(crate) struct SmtpDelivery {
    pub from: String,
    pub to: Vec<String>,
    /// Raw DATA section: headers and body
    pub data: String,
}

/// Minimal SMTP server on a random local port
///
/// Accepts everything except messages whose data contains one of the
/// `reject` fragments, which get a 554 after DATA.
pub(crate) struct FakeSmtpServer {
    port: u16,
    accepted: Arc<Mutex<Vec<SmtpDelivery>>>,
    handle: JoinHandle<()>,
}

impl FakeSmtpServer {
    pub async fn start(reject: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let reject: Arc<Vec<String>> = Arc::new(reject.iter().map(|r| r.to_string()).collect());

        let handle = tokio::spawn({
            let accepted = Arc::clone(&accepted);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve_smtp(stream, Arc::clone(&accepted), Arc::clone(&reject)));
                }
            }
        });

        Self {
            port,
            accepted,
            handle,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn messages(&self) -> Vec<SmtpDelivery> {
        self.accepted.lock().await.clone()
    }

    /// Subjects of accepted messages, sorted
    pub async fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self
            .messages()
            .await
            .iter()
            .filter_map(|m| {
                m.data
                    .lines()
                    .find_map(|line| line.strip_prefix("Subject: "))
                    .map(String::from)
            })
            .collect();
        subjects.sort();
        subjects
    }
}

impl Drop for FakeSmtpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_smtp(
    stream: TcpStream,
    accepted: Arc<Mutex<Vec<SmtpDelivery>>>,
    reject: Arc<Vec<String>>,
) {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    if write.write_all(b"220 fake.smtp ESMTP\r\n").await.is_err() {
        return;
    }

    let mut from = String::new();
    let mut to = Vec::new();

    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.to_ascii_uppercase();
        let reply = if command.starts_with("EHLO") || command.starts_with("HELO") {
            "250 fake.smtp\r\n"
        } else if command.starts_with("MAIL FROM:") {
            from = between_angles(&line);
            to.clear();
            "250 OK\r\n"
        } else if command.starts_with("RCPT TO:") {
            to.push(between_angles(&line));
            "250 OK\r\n"
        } else if command == "DATA" {
            if write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.is_err() {
                return;
            }
            let mut data = String::new();
            while let Ok(Some(data_line)) = lines.next_line().await {
                if data_line == "." {
                    break;
                }
                data.push_str(&data_line);
                data.push('\n');
            }
            if reject.iter().any(|r| data.contains(r.as_str())) {
                "554 Message rejected\r\n"
            } else {
                accepted.lock().await.push(SmtpDelivery {
                    from: from.clone(),
                    to: to.clone(),
                    data,
                });
                "250 Queued\r\n"
            }
        } else if command == "QUIT" {
            write.write_all(b"221 Bye\r\n").await.ok();
            return;
        } else {
            "250 OK\r\n"
        };

        if write.write_all(reply.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn between_angles(line: &str) -> String {
    let start = line.find('<').map(|i| i + 1).unwrap_or(0);
    let end = line.rfind('>').unwrap_or(line.len());
    line[start..end].to_string()
}
