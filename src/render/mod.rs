//! Report content and its encodings
//!
//! [`ReportTemplate`] turns a session and its pages into [`Block`]s. The
//! blocks of one page form a [`Section`]; the sections in page order plus a
//! summary form a [`ReportDocument`], which is encoded as PDF. Email parts
//! encode the same section blocks as HTML.
//!
//! Building blocks is a pure function of its inputs: no clock, no I/O, so
//! identical input always yields identical content.

use crate::config::{MailConfig, ReportConfig};
use crate::error::Result;
use crate::pagination::Page;
use crate::types::{AttemptRecord, SessionRecord};
use serde::Serialize;

mod html;
mod pdf;

/// One unit of report content
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Document title
    Title(String),
    /// Section heading
    Heading(String),
    /// Labelled summary value
    Field {
        /// Label, printed before the value
        label: String,
        /// Value text
        value: String,
    },
    /// Emphasised line
    Strong(String),
    /// Plain line
    Text(String),
    /// Indented secondary line, such as an answer option
    Detail(String),
    /// Break between questions
    Separator,
}

impl Block {
    /// The block's text as a single unstyled line
    pub fn text(&self) -> String {
        match self {
            Block::Title(text)
            | Block::Heading(text)
            | Block::Strong(text)
            | Block::Text(text)
            | Block::Detail(text) => text.clone(),
            Block::Field { label, value } => format!("{}: {}", label, value),
            Block::Separator => String::new(),
        }
    }
}

/// Content for one page of attempts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    /// 1-based page number
    pub page_number: usize,
    /// Total pages
    pub page_count: usize,
    /// Content in reading order
    pub blocks: Vec<Block>,
}

/// A complete report, ready to encode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDocument {
    title: String,
    blocks: Vec<Block>,
}

impl ReportDocument {
    /// Document title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Content in reading order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// One line per block, without styling
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Encode as an A4 PDF
    ///
    /// CPU-bound; async callers should run it on the blocking pool.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Render`] if the PDF cannot be written.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        pdf::encode(&self.title, &self.blocks)
    }
}

/// One rendered email part, ready for a transport
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmailMessage {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Immutable rendering settings
#[derive(Clone, Debug)]
pub struct ReportTemplate {
    title: String,
    from: String,
}

impl ReportTemplate {
    /// Build a template from report and mail settings
    pub fn new(report: &ReportConfig, mail: &MailConfig) -> Self {
        Self {
            title: report.title.clone(),
            from: mail.from.clone(),
        }
    }

    /// Heading shown at the top of documents and emails
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Content for one page of attempts
    ///
    /// Questions are numbered across the whole session, not per page.
    pub fn render_section(&self, session: &SessionRecord, page: &Page<AttemptRecord>) -> Section {
        let mut blocks = vec![Block::Heading(format!(
            "Part {} of {}",
            page.number(),
            page.count()
        ))];

        for (index, attempt) in page.records().iter().enumerate() {
            push_attempt(&mut blocks, page.offset() + index + 1, attempt);
        }

        tracing::trace!(
            session_id = %session.session_id,
            page = page.number(),
            blocks = blocks.len(),
            "Section rendered"
        );

        Section {
            page_number: page.number(),
            page_count: page.count(),
            blocks,
        }
    }

    /// Full report around already-rendered sections
    ///
    /// `sections` must be in page order. The final score is
    /// `correct / total` over every attempt in the session.
    pub fn render_document(
        &self,
        session: &SessionRecord,
        total: usize,
        correct: usize,
        sections: Vec<Section>,
    ) -> ReportDocument {
        let mut blocks = vec![
            Block::Title(self.title.clone()),
            field("Participant", &session.user_name),
            field("Email", &session.email),
            field("Session ID", session.session_id.as_str()),
            field(
                "Date",
                &session.taken_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            ),
        ];
        if let Some(topic) = &session.topic {
            blocks.push(field("Topic", topic));
        }
        blocks.push(field("Recorded Marks", &session.score.to_string()));
        blocks.push(Block::Separator);

        if sections.is_empty() {
            blocks.push(Block::Text(
                "No questions were answered in this session.".into(),
            ));
        }
        for section in sections {
            blocks.extend(section.blocks);
        }

        blocks.push(Block::Heading(format!("Final Score: {}/{}", correct, total)));

        ReportDocument {
            title: self.title.clone(),
            blocks,
        }
    }

    /// Self-contained HTML email for one page
    pub fn render_email(&self, session: &SessionRecord, page: &Page<AttemptRecord>) -> EmailMessage {
        let section = self.render_section(session, page);

        EmailMessage {
            from: self.from.clone(),
            to: session.email.clone(),
            subject: format!(
                "{} for Session #{} (Part {}/{})",
                self.title,
                session.session_id,
                page.number(),
                page.count()
            ),
            html: html::email_body(&self.title, session, &section),
        }
    }
}

fn field(label: &str, value: &str) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn push_attempt(blocks: &mut Vec<Block>, number: usize, attempt: &AttemptRecord) {
    blocks.push(Block::Strong(format!(
        "Question {}: {}",
        number, attempt.question
    )));
    for (label, text) in &attempt.options {
        blocks.push(Block::Detail(format!("{}: {}", label, text)));
    }

    let chosen = attempt.chosen.as_deref().unwrap_or("(no answer)");
    blocks.push(Block::Text(format!("Your Answer: {}", chosen)));
    if !attempt.answered_correctly() {
        blocks.push(Block::Text(format!("Correct Answer: {}", attempt.correct)));
    }
    blocks.push(Block::Separator);
}
