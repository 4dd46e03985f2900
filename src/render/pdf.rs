//! PDF encoding of report blocks
//!
//! Blocks are laid out top to bottom on A4 pages using the built-in
//! Helvetica faces, so no font files are embedded. Layout is computed
//! separately from writing; only [`encode`] touches `printpdf`.

use super::Block;
use crate::error::{Error, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;

/// Millimetres per typographic point
const MM_PER_PT: f32 = 0.352_778;

/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.55;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Style {
    size: f32,
    bold: bool,
    indent: f32,
}

impl Style {
    const fn new(size: f32, bold: bool, indent: f32) -> Self {
        Self { size, bold, indent }
    }

    fn line_height(self) -> f32 {
        self.size * MM_PER_PT * 1.4
    }

    /// Characters that fit on one line
    fn capacity(self) -> usize {
        let usable = PAGE_WIDTH - 2.0 * MARGIN - self.indent;
        let glyph = self.size * MM_PER_PT * GLYPH_WIDTH;
        ((usable / glyph).floor() as usize).max(1)
    }
}

fn style(block: &Block) -> Style {
    match block {
        Block::Title(_) => Style::new(20.0, true, 0.0),
        Block::Heading(_) => Style::new(14.0, true, 0.0),
        Block::Strong(_) => Style::new(11.0, true, 0.0),
        Block::Field { .. } | Block::Text(_) => Style::new(11.0, false, 0.0),
        Block::Detail(_) => Style::new(10.0, false, 6.0),
        Block::Separator => Style::new(6.0, false, 0.0),
    }
}

/// A line of text at its final position, in mm from the bottom-left corner
#[derive(Clone, Debug, PartialEq)]
pub(super) struct PlacedLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    pub x: f32,
    pub y: f32,
}

/// Break `text` into lines of at most `width` characters
///
/// Breaks at whitespace; words longer than a line are split.
pub(super) fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map_or(word.len(), |(index, _)| index);
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Place blocks on pages, starting a new page when the bottom margin is hit
///
/// Always yields at least one page.
pub(super) fn layout(blocks: &[Block]) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![Vec::new()];
    let mut y = top;

    for block in blocks {
        let style = style(block);
        let height = style.line_height();

        if matches!(block, Block::Separator) {
            y -= height;
            continue;
        }
        if matches!(block, Block::Heading(_)) && y < top {
            y -= height / 2.0;
        }

        for text in wrap(&block.text(), style.capacity()) {
            if y - height < MARGIN {
                pages.push(Vec::new());
                y = top;
            }
            y -= height;
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    text,
                    size: style.size,
                    bold: style.bold,
                    x: MARGIN + style.indent,
                    y,
                });
            }
        }
    }

    pages
}

/// Write blocks as a PDF document with a page footer
pub(super) fn encode(title: &str, blocks: &[Block]) -> Result<Vec<u8>> {
    let pages = layout(blocks);
    let total = pages.len();

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Render(format!("failed to load PDF font: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| Error::Render(format!("failed to load PDF font: {}", e)))?;

    for (index, lines) in pages.into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            doc.get_page(page).get_layer(layer)
        };

        for line in lines {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(line.text, line.size, Mm(line.x), Mm(line.y), font);
        }
        layer.use_text(
            format!("Page {} of {}", index + 1, total),
            FOOTER_SIZE,
            Mm(PAGE_WIDTH / 2.0 - 10.0),
            Mm(FOOTER_Y),
            &regular,
        );
    }

    doc.save_to_bytes()
        .map_err(|e| Error::Render(format!("failed to write PDF: {}", e)))
}
