//! HTML encoding for email parts

use super::{Block, Section};
use crate::types::SessionRecord;

/// Self-contained HTML page for one section
pub(super) fn email_body(title: &str, session: &SessionRecord, section: &Section) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    html.push_str(&format!(
        "<p>Dear {}, here are the details for part {} of {} of your quiz (session #{}).</p>\n",
        escape(&session.user_name),
        section.page_number,
        section.page_count,
        escape(session.session_id.as_str())
    ));
    for block in &section.blocks {
        html.push_str(&block_html(block));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn block_html(block: &Block) -> String {
    match block {
        Block::Title(text) => format!("<h1>{}</h1>\n", escape(text)),
        Block::Heading(text) => format!("<h2>{}</h2>\n", escape(text)),
        Block::Field { label, value } => {
            format!("<p><b>{}:</b> {}</p>\n", escape(label), escape(value))
        }
        Block::Strong(text) => format!("<p><b>{}</b></p>\n", escape(text)),
        Block::Text(text) => format!("<p>{}</p>\n", escape(text)),
        Block::Detail(text) => format!("<p style=\"margin-left:1.5em\">{}</p>\n", escape(text)),
        Block::Separator => "<hr>\n".to_string(),
    }
}

/// Escape text for element content and quoted attributes
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
