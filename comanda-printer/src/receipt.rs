//! Receipt document builder
//!
//! Provides a fluent API for building receipt content once and emitting it
//! in the two shapes the backends consume: a plain-text body for the remote
//! agent and a minimal HTML body for the local bridge.

use crate::transliterate::to_ascii;

/// A receipt fragment
enum Segment {
    Title(String),
    Field { label: String, value: String },
    Label(String),
    Line(String),
    Blank,
}

/// Receipt document builder
///
/// Accumulates segments in display order; `to_text` / `to_html` render the
/// same document for the two transports.
pub struct ReceiptBuilder {
    segments: Vec<Segment>,
}

impl ReceiptBuilder {
    pub fn new() -> Self {
        Self {
            segments: Vec::with_capacity(16),
        }
    }

    /// Receipt heading (order number line)
    pub fn title(&mut self, s: impl Into<String>) -> &mut Self {
        self.segments.push(Segment::Title(s.into()));
        self
    }

    /// A `Label: value` row
    pub fn field(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.segments.push(Segment::Field {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    /// A standalone label row (e.g. "Itens:")
    pub fn label(&mut self, s: impl Into<String>) -> &mut Self {
        self.segments.push(Segment::Label(s.into()));
        self
    }

    /// A plain content row
    pub fn line(&mut self, s: impl Into<String>) -> &mut Self {
        self.segments.push(Segment::Line(s.into()));
        self
    }

    /// Empty spacer row
    pub fn blank(&mut self) -> &mut Self {
        self.segments.push(Segment::Blank);
        self
    }

    /// Render as plain text, one row per line, folded to ASCII
    ///
    /// The agent's printer cannot draw accented characters, so the text
    /// variant is always transliterated.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Title(s) => {
                    out.push_str(s);
                    out.push('\n');
                }
                Segment::Field { label, value } => {
                    out.push_str(label);
                    out.push_str(": ");
                    out.push_str(value);
                    out.push('\n');
                }
                Segment::Label(s) => {
                    out.push_str(s);
                    out.push('\n');
                }
                Segment::Line(s) => {
                    out.push_str(s);
                    out.push('\n');
                }
                Segment::Blank => out.push('\n'),
            }
        }
        to_ascii(&out)
    }

    /// Render as the bridge's HTML body (h2 heading, p rows)
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Title(s) => {
                    out.push_str("<h2>");
                    out.push_str(&escape_html(s));
                    out.push_str("</h2>");
                }
                Segment::Field { label, value } => {
                    out.push_str("<p><b>");
                    out.push_str(&escape_html(label));
                    out.push_str(":</b> ");
                    out.push_str(&escape_html(value));
                    out.push_str("</p>");
                }
                Segment::Label(s) => {
                    out.push_str("<p><b>");
                    out.push_str(&escape_html(s));
                    out.push_str("</b></p>");
                }
                Segment::Line(s) => {
                    out.push_str("<p>");
                    out.push_str(&escape_html(s));
                    out.push_str("</p>");
                }
                Segment::Blank => out.push_str("<br/>"),
            }
        }
        out
    }
}

impl Default for ReceiptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text for the HTML body (customer names and notes are free text)
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
