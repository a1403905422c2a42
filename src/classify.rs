//! Heuristic content-type rules for resume lines.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. section header keyword
//! 2. job title separator (`|`, ` at `, ` - `), unless the line is contact
//!    details or a bare date range
//! 3. bullet glyph or list numbering
//! 4. contact details
//! 5. date range
//! 6. anything else is a plain paragraph

use crate::model::Paragraph;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentType {
    SectionHeader,
    JobTitle,
    BulletPoint,
    ContactInfo,
    DateRange,
    Paragraph,
    /// Blank spacing paragraph; only assigned by the mapper, never by [`classify`].
    Empty,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::SectionHeader => "section_header",
            ContentType::JobTitle => "job_title",
            ContentType::BulletPoint => "bullet_point",
            ContentType::ContactInfo => "contact_info",
            ContentType::DateRange => "date_range",
            ContentType::Paragraph => "paragraph",
            ContentType::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const SECTION_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "summary",
    "objective",
    "projects",
    "certifications",
    "publications",
    "achievements",
];

pub const CONTACT_KEYWORDS: &[&str] = &["@", "phone", "email", "linkedin"];

pub const BULLET_GLYPHS: &[char] = &['•', '-', '*', '◦', '▪', '‣', '●', '–'];

const JOB_SEPARATORS: &[&str] = &["|", " at ", " - "];

/// Optional context from the paragraph a line came from.
#[derive(Clone, Copy, Default)]
pub struct LineContext {
    pub numbered: bool,
}

impl From<&Paragraph> for LineContext {
    fn from(p: &Paragraph) -> Self {
        LineContext {
            numbered: p.properties.numbering.is_some() || p.list.is_some(),
        }
    }
}

pub fn classify(text: &str) -> ContentType {
    classify_with(text, LineContext::default())
}

pub fn classify_paragraph(paragraph: &Paragraph) -> ContentType {
    classify_with(paragraph.text.trim(), LineContext::from(paragraph))
}

pub fn classify_with(text: &str, ctx: LineContext) -> ContentType {
    let lower = text.to_lowercase();

    if SECTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return ContentType::SectionHeader;
    }
    if JOB_SEPARATORS.iter().any(|s| text.contains(s))
        && !is_contact(&lower)
        && !is_date_range(&lower)
    {
        return ContentType::JobTitle;
    }
    if starts_with_bullet(text) || ctx.numbered {
        return ContentType::BulletPoint;
    }
    if is_contact(&lower) {
        return ContentType::ContactInfo;
    }
    if has_date(&lower) {
        return ContentType::DateRange;
    }
    ContentType::Paragraph
}

pub fn starts_with_bullet(text: &str) -> bool {
    text.trim_start()
        .chars()
        .next()
        .is_some_and(|c| BULLET_GLYPHS.contains(&c))
}

/// Drop a leading bullet glyph and the whitespace after it.
pub fn strip_bullet(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.chars().next() {
        Some(c) if BULLET_GLYPHS.contains(&c) => trimmed[c.len_utf8()..].trim_start(),
        _ => text,
    }
}

fn is_contact(lower: &str) -> bool {
    CONTACT_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn has_date(lower: &str) -> bool {
    lower.chars().any(|c| c.is_ascii_digit())
        && ["20", "19", "present", "current"]
            .iter()
            .any(|k| lower.contains(k))
}

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    "january", "february", "march", "april", "june", "july", "august", "september", "october",
    "november", "december",
];

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) && (s.starts_with("19") || s.starts_with("20"))
}

/// A year, a month and year (`jan 2019`, `03/2019`), or present/current.
fn is_date_token(s: &str) -> bool {
    if s == "present" || s == "current" || is_year(s) {
        return true;
    }
    if let Some((month, year)) = s.split_once('/') {
        return !month.is_empty()
            && month.len() <= 2
            && month.chars().all(|c| c.is_ascii_digit())
            && is_year(year);
    }
    match s.split_whitespace().collect::<Vec<_>>().as_slice() {
        [month, year] => MONTHS.contains(&month.trim_end_matches(['.', ','])) && is_year(year),
        _ => false,
    }
}

/// Every " - " / " – " separated segment is nothing but a date token.
fn is_date_range(lower: &str) -> bool {
    let segments: Vec<&str> = lower
        .split(" - ")
        .flat_map(|s| s.split(" – "))
        .map(str::trim)
        .collect();
    segments.len() >= 2 && segments.iter().all(|s| is_date_token(s))
}
