//! Paginated document export.
//!
//! Lays a report out on fixed-height pages and writes it as
//! `<title>_Report.txt`. Units follow an A4 page in millimetres: text starts
//! at [`TOP_MARGIN`], each line takes [`LINE_HEIGHT`], and nothing may pass
//! [`PAGE_BOTTOM`].

use std::path::{Path, PathBuf};

use brandsight_core::{ReviewItem, StoredReport};
use thiserror::Error;

use crate::render::{distribution_lines, parse_suggestion, DATE_FORMAT};

pub const PAGE_BOTTOM: u32 = 280;
pub const TOP_MARGIN: u32 = 20;
pub const LINE_HEIGHT: u32 = 5;
pub const WRAP_COLUMNS: usize = 90;

const PAGE_SEPARATOR: &str = "\u{000C}";
const DOCUMENT_HEADER: &str = "BrandSight Report";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportPage {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub title: String,
    pub pages: Vec<ExportPage>,
}

impl ExportDocument {
    /// File name the document is saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .trim()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let stem = stem.trim_matches(|c| c == '.' || c == ' ');
        if stem.is_empty() {
            "BrandSight_Report.txt".to_string()
        } else {
            format!("{stem}_Report.txt")
        }
    }

    /// Pages joined by form feeds.
    #[must_use]
    pub fn render_text(&self) -> String {
        let pages: Vec<String> = self
            .pages
            .iter()
            .map(|page| {
                let mut text = page.lines.join("\n");
                text.push('\n');
                text
            })
            .collect();
        pages.join(PAGE_SEPARATOR)
    }
}

/// Tracks the write position while filling pages.
struct Layout {
    pages: Vec<ExportPage>,
    cursor: u32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![ExportPage::default()],
            cursor: TOP_MARGIN,
        }
    }

    fn current(&mut self) -> &mut ExportPage {
        if self.pages.is_empty() {
            self.pages.push(ExportPage::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(ExportPage::default());
        self.cursor = TOP_MARGIN;
    }

    fn fits(&self, line_count: usize) -> bool {
        let height = u32::try_from(line_count)
            .unwrap_or(u32::MAX)
            .saturating_mul(LINE_HEIGHT);
        self.cursor.saturating_add(height) <= PAGE_BOTTOM
    }

    fn page_is_blank(&self) -> bool {
        self.pages
            .last()
            .is_none_or(|p| p.lines.iter().all(String::is_empty))
    }

    fn push_line(&mut self, line: String) {
        if !self.fits(1) {
            self.new_page();
        }
        self.current().lines.push(line);
        self.cursor += LINE_HEIGHT;
    }

    /// Place lines that belong together. The block moves to a new page if it
    /// would cross the bottom; a block taller than a page is split.
    fn block(&mut self, lines: Vec<String>) {
        if !self.fits(lines.len()) && !self.page_is_blank() {
            self.new_page();
        }
        for line in lines {
            self.push_line(line);
        }
    }

    /// Vertical space. Dropped at the bottom of a page.
    fn gap(&mut self, lines: usize) {
        for _ in 0..lines {
            if !self.fits(1) {
                return;
            }
            self.current().lines.push(String::new());
            self.cursor += LINE_HEIGHT;
        }
    }

    /// A heading and its rule, placed as one block with the first of
    /// `blocks` so a heading never ends a page.
    fn section(&mut self, title: &str, blocks: Vec<Vec<String>>) {
        let mut blocks = blocks.into_iter();
        let mut lead = vec![title.to_string(), "-".repeat(title.chars().count())];
        lead.extend(blocks.next().unwrap_or_default());
        self.block(lead);
        for block in blocks {
            self.block(block);
        }
    }
}

/// Greedy word wrap at `width` columns. Words longer than a line are split.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 {
                word.len()
            } else {
                line_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        if line_len > 0 || lines.is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Exported line for one review, before wrapping.
#[must_use]
pub fn review_entry(index: usize, review: &ReviewItem) -> String {
    let sentiment = review.sentiment.map_or("UNKNOWN", |s| s.as_str());
    format!(
        "{index}. {} - \"{}\" [Sentiment: {sentiment}, Rating: {}]",
        review.user, review.review, review.rating
    )
}

/// Numbered suggestion heading followed by its indented points, wrapped.
fn suggestion_block(index: usize, text: &str) -> Vec<String> {
    let suggestion = parse_suggestion(text);
    let mut lines = wrap_text(
        &format!("{index}. {}", suggestion.heading_line()),
        WRAP_COLUMNS,
    );
    for point in &suggestion.points {
        let mut wrapped = wrap_text(point, WRAP_COLUMNS - 5).into_iter();
        if let Some(first) = wrapped.next() {
            lines.push(format!("   - {first}"));
        }
        lines.extend(wrapped.map(|l| format!("     {l}")));
    }
    lines
}

/// Lay out a report as a paginated document.
///
/// Every analysed review appears exactly once, in order.
#[must_use]
pub fn build_document(report: &StoredReport) -> ExportDocument {
    let content = &report.content;
    let mut layout = Layout::new();

    layout.block(vec![
        DOCUMENT_HEADER.to_string(),
        "=".repeat(DOCUMENT_HEADER.len()),
    ]);
    layout.gap(1);

    let mut identity = vec![content.title.clone()];
    if !content.icon.is_empty() {
        identity.push(format!("Icon: {}", content.icon));
    }
    identity.push(format!("Date: {}", report.created_at.format(DATE_FORMAT)));
    layout.block(identity);
    layout.gap(1);

    let description = if content.description.trim().is_empty() {
        "Not available."
    } else {
        content.description.as_str()
    };
    layout.section(
        "Description",
        vec![wrap_text(description, WRAP_COLUMNS)],
    );
    layout.gap(1);

    layout.section(
        "Sentiment Distribution",
        vec![distribution_lines(&content.sentiment_distribution)
            .into_iter()
            .map(|l| l.trim_start().to_string())
            .collect()],
    );
    layout.gap(1);

    let suggestions: Vec<Vec<String>> = if content.suggestions.is_empty() {
        vec![vec!["No suggestions.".to_string()]]
    } else {
        content
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, text)| suggestion_block(i + 1, text))
            .collect()
    };
    layout.section("AI Suggestions", suggestions);
    layout.gap(1);

    let reviews: Vec<Vec<String>> = if content.analyzed_reviews.is_empty() {
        vec![vec!["No reviews.".to_string()]]
    } else {
        content
            .analyzed_reviews
            .iter()
            .enumerate()
            .map(|(i, review)| wrap_text(&review_entry(i + 1, review), WRAP_COLUMNS))
            .collect()
    };
    layout.section("Analyzed Reviews", reviews);

    ExportDocument {
        title: content.title.clone(),
        pages: layout.pages,
    }
}

/// Write `document` into `dir` and return the file path.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be written.
pub fn save_document(document: &ExportDocument, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(document.file_name());
    std::fs::write(&path, document.render_text()).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), pages = document.pages.len(), "report exported");
    Ok(path)
}
