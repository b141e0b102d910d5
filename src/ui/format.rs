use once_cell::sync::Lazy;
use regex::Regex;

// `.` stops at newlines, so a bold run never spans lines.
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern should compile"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Bold(String),
    LineBreak,
}

/// Message text reduced to the only structure a message may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText {
    segments: Vec<Segment>,
}

impl FormattedText {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Markup for the text; every payload is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => html.push_str(&escape_html(text)),
                Segment::Bold(text) => {
                    html.push_str("<strong>");
                    html.push_str(&escape_html(text));
                    html.push_str("</strong>");
                }
                Segment::LineBreak => html.push_str("<br>"),
            }
        }
        html
    }

    pub fn plain_text(&self) -> String {
        let mut plain = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Bold(text) => plain.push_str(text),
                Segment::LineBreak => plain.push('\n'),
            }
        }
        plain
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }
}

/// Agent text: `**bold**` runs and newlines become structure.
pub fn format_agent_text(raw: &str) -> FormattedText {
    let mut formatted = FormattedText::default();
    for (index, line) in raw.split('\n').enumerate() {
        if index > 0 {
            formatted.segments.push(Segment::LineBreak);
        }

        let mut cursor = 0;
        for captures in BOLD.captures_iter(line) {
            let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            formatted.push_text(&line[cursor..whole.start()]);
            formatted
                .segments
                .push(Segment::Bold(inner.as_str().to_string()));
            cursor = whole.end();
        }
        formatted.push_text(&line[cursor..]);
    }
    formatted
}

/// User text is shown as typed: no bold, no line-break conversion.
pub fn format_user_text(raw: &str) -> FormattedText {
    let mut formatted = FormattedText::default();
    formatted.push_text(raw);
    formatted
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
