//! Align generated lines with the original paragraph sequence.
//!
//! Each non-empty original paragraph takes one generated line in two steps:
//! first the earliest pending line whose content type, judged as if it sat in
//! that paragraph, matches the paragraph's, otherwise the pending line at the cursor. Consumed lines are
//! removed from the pool and the cursor always sits on the first pending
//! line. Lines still pending at the end become appended paragraphs styled
//! after an earlier entry of the same type.

use crate::classify::{
    ContentType, LineContext, classify, classify_paragraph, classify_with, starts_with_bullet, strip_bullet,
};
use crate::error::Error;
use crate::model::{Indentation, Paragraph, ParagraphProperties, Run, Spacing};

/// What happens to original paragraphs once every generated line is used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrailingPolicy {
    /// Keep them exactly as they are.
    #[default]
    Preserve,
    /// Remove them from the body (top-level paragraphs only).
    Drop,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuralHints {
    pub has_bold: bool,
    pub has_italic: bool,
    pub has_borders: bool,
    pub alignment: Option<String>,
    pub indentation: Indentation,
    pub spacing: Spacing,
    pub is_bullet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Copy the paragraph unchanged (blank spacing paragraphs, unmatched trailers).
    Preserve,
    /// The generated line equals the original text.
    Unchanged,
    /// Replace the text, keep the formatting.
    Rewrite,
    /// New paragraph cloned from `template_index`.
    Append,
    /// Remove the original paragraph.
    Drop,
}

#[derive(Clone, Debug)]
pub struct MappingEntry {
    pub original_index: Option<usize>,
    /// Paragraph whose formatting an appended entry borrows.
    pub template_index: Option<usize>,
    pub original_text: String,
    pub new_text: String,
    pub disposition: Disposition,
    pub properties: ParagraphProperties,
    pub runs: Vec<Run>,
    pub content_type: ContentType,
    pub hints: StructuralHints,
}

impl MappingEntry {
    pub fn preserve_exact(&self) -> bool {
        matches!(self.disposition, Disposition::Preserve | Disposition::Unchanged)
    }

    fn source_index(&self) -> Option<usize> {
        self.original_index.or(self.template_index)
    }

    pub fn was_bold(&self) -> bool {
        self.runs.iter().any(|r| r.properties.bold)
    }
}

pub fn analyze_structure(paragraphs: &[Paragraph]) -> Vec<StructuralHints> {
    paragraphs
        .iter()
        .map(|p| StructuralHints {
            has_bold: p.has_bold(),
            has_italic: p.has_italic(),
            has_borders: !p.properties.borders.is_empty(),
            alignment: p.properties.alignment.clone(),
            indentation: p.properties.indentation.clone(),
            spacing: p.properties.spacing.clone(),
            is_bullet: p.properties.numbering.is_some() || p.list.is_some(),
        })
        .collect()
}

/// Non-blank generated lines, trimmed.
pub fn generated_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// A typed bullet in a paragraph whose bullet comes from list numbering
/// would render twice.
fn fit_line(paragraph: &Paragraph, line: &str) -> String {
    if paragraph.list.is_some() && starts_with_bullet(line) && !starts_with_bullet(&paragraph.text) {
        strip_bullet(line).to_string()
    } else {
        line.to_string()
    }
}

fn entry_for(
    paragraph: &Paragraph,
    hints: &StructuralHints,
    content_type: ContentType,
    new_text: String,
    disposition: Disposition,
) -> MappingEntry {
    MappingEntry {
        original_index: Some(paragraph.index),
        template_index: None,
        original_text: paragraph.text.trim().to_string(),
        new_text,
        disposition,
        properties: paragraph.properties.clone(),
        runs: paragraph.runs.clone(),
        content_type,
        hints: hints.clone(),
    }
}

pub fn map_content(
    paragraphs: &[Paragraph],
    lines: &[String],
    policy: TrailingPolicy,
) -> Result<Vec<MappingEntry>, Error> {
    if lines.is_empty() {
        return Err(Error::Mapping("generated text has no non-blank lines".into()));
    }

    let hints = analyze_structure(paragraphs);
    let mut pool: Vec<Option<&str>> = lines.iter().map(|l| Some(l.as_str())).collect();
    let mut cursor = 0;
    let mut entries: Vec<MappingEntry> = Vec::with_capacity(paragraphs.len() + 1);

    for (p, hint) in paragraphs.iter().zip(&hints) {
        if p.is_empty {
            entries.push(entry_for(
                p,
                hint,
                ContentType::Empty,
                String::new(),
                Disposition::Preserve,
            ));
            continue;
        }

        let target = classify_paragraph(p);
        let ctx = LineContext::from(p);
        while cursor < pool.len() && pool[cursor].is_none() {
            cursor += 1;
        }

        if cursor >= pool.len() {
            let disposition = match policy {
                TrailingPolicy::Drop if p.top_level => Disposition::Drop,
                _ => Disposition::Preserve,
            };
            entries.push(entry_for(p, hint, target, p.text.trim().to_string(), disposition));
            continue;
        }

        let typed = (cursor..pool.len()).find(|&j| pool[j].is_some_and(|l| classify_with(l, ctx) == target));
        let Some(line) = pool[typed.unwrap_or(cursor)].take() else {
            continue;
        };
        let new_text = fit_line(p, line);
        let disposition = if new_text == p.text.trim() {
            Disposition::Unchanged
        } else {
            Disposition::Rewrite
        };
        log::debug!(
            "Paragraph {} ({target}) <- {:?}{}",
            p.index,
            new_text,
            if typed.is_some() { "" } else { " [positional]" }
        );
        entries.push(entry_for(p, hint, target, new_text, disposition));
    }

    for line in pool.into_iter().flatten() {
        let content_type = classify(line);
        let template = entries
            .iter()
            .rev()
            .find(|e| e.content_type == content_type && e.source_index().is_some())
            .or_else(|| {
                entries
                    .iter()
                    .rev()
                    .find(|e| e.content_type != ContentType::Empty && e.source_index().is_some())
            })
            .or_else(|| entries.last());
        let entry = match template {
            Some(t) => MappingEntry {
                original_index: None,
                template_index: t.source_index(),
                original_text: String::new(),
                new_text: line.to_string(),
                disposition: Disposition::Append,
                properties: t.properties.clone(),
                runs: t.runs.clone(),
                content_type,
                hints: StructuralHints::default(),
            },
            None => MappingEntry {
                original_index: None,
                template_index: None,
                original_text: String::new(),
                new_text: line.to_string(),
                disposition: Disposition::Append,
                properties: ParagraphProperties::default(),
                runs: Vec::new(),
                content_type,
                hints: StructuralHints::default(),
            },
        };
        entries.push(entry);
    }

    log::info!(
        "Mapped {} entries ({} rewritten, {} preserved, {} appended, {} dropped)",
        entries.len(),
        count(&entries, Disposition::Rewrite),
        count(&entries, Disposition::Preserve) + count(&entries, Disposition::Unchanged),
        count(&entries, Disposition::Append),
        count(&entries, Disposition::Drop),
    );
    Ok(entries)
}

fn count(entries: &[MappingEntry], d: Disposition) -> usize {
    entries.iter().filter(|e| e.disposition == d).count()
}
