//! One reconstruction pass over a parsed document.
//!
//! The extracted [`Document`] stays read-only; all edits go to a clone of its
//! body tree, located through the paths recorded at extraction time.
//! Rewrites run in reverse document order so that a paragraph's edits never
//! shift the recorded path of one not yet visited.

use std::time::Instant;

use crate::distribute::replace_paragraph_text;
use crate::docx::{self, extract_runs, paragraph_paths};
use crate::enhance::{enhance_paragraph, restore_borders};
use crate::error::Error;
use crate::mapping::{Disposition, MappingEntry, TrailingPolicy, generated_lines, map_content};
use crate::model::{Document, NodePath};
use crate::ns;
use crate::validate::{DEFAULT_PASS_THRESHOLD, ValidationReport, validate};
use crate::writer::repackage;
use crate::xml::Element;

#[derive(Clone, Debug)]
pub struct ReconstructOptions {
    pub trailing_policy: TrailingPolicy,
    /// Run the advisory validator on the output.
    pub validate: bool,
    /// Compare only this many leading paragraphs.
    pub validation_sample: Option<usize>,
    pub pass_threshold: f32,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            trailing_policy: TrailingPolicy::default(),
            validate: true,
            validation_sample: None,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconstructStats {
    pub rewritten: usize,
    pub unchanged: usize,
    /// Paragraphs where the proportional split failed and words were spread evenly.
    pub even_split_fallbacks: usize,
    pub appended: usize,
    pub dropped: usize,
    pub borders_restored: usize,
}

#[derive(Debug)]
pub struct Reconstruction {
    pub bytes: Vec<u8>,
    pub stats: ReconstructStats,
    pub report: Option<ValidationReport>,
}

fn body_mut(root: &mut Element) -> Result<&mut Element, Error> {
    root.child_mut(ns::WML, "body")
        .ok_or_else(|| Error::Extraction("missing w:body".into()))
}

fn rewrite(root: &mut Element, doc: &Document, entries: &[MappingEntry], stats: &mut ReconstructStats) {
    for entry in entries.iter().rev() {
        match entry.disposition {
            Disposition::Rewrite => {}
            Disposition::Unchanged => {
                stats.unchanged += 1;
                continue;
            }
            _ => continue,
        }
        let Some(paragraph) = entry.original_index.and_then(|i| doc.paragraphs.get(i)) else {
            continue;
        };
        let Some(node) = root.at_path_mut(&paragraph.path) else {
            log::warn!("Paragraph {} not found in the body tree", paragraph.index);
            continue;
        };
        if !replace_paragraph_text(node, &paragraph.runs, &entry.new_text) {
            stats.even_split_fallbacks += 1;
        }
        enhance_paragraph(node, entry);
        stats.rewritten += 1;
    }
}

fn guard_borders(root: &mut Element, doc: &Document, live: &[NodePath]) -> usize {
    if live.len() != doc.paragraphs.len() {
        log::warn!(
            "Paragraph count changed ({} -> {}); skipping border check",
            doc.paragraphs.len(),
            live.len()
        );
        return 0;
    }
    doc.paragraphs
        .iter()
        .zip(live)
        .filter(|(p, _)| !p.properties.borders.is_empty())
        .filter_map(|(p, path)| root.at_path_mut(path).map(|node| restore_borders(node, &p.properties.borders)))
        .sum()
}

/// Strip identifiers that must stay unique within the body.
fn scrub_clone(paragraph: &mut Element) {
    paragraph.strip_descendants(ns::WML, "bookmarkStart");
    paragraph.strip_descendants(ns::WML, "bookmarkEnd");
    paragraph.for_each_mut(&mut |e: &mut Element| {
        e.remove_attr(ns::W14, "paraId");
        e.remove_attr(ns::W14, "textId");
    });
}

fn carries_objects(paragraph: &Element) -> bool {
    ["drawing", "pict", "object", "tbl"]
        .iter()
        .any(|name| paragraph.contains(ns::WML, name))
}

/// Paragraph with only the template's paragraph properties.
fn bare_paragraph(template: Option<&Element>) -> Element {
    let mut p = Element::wml("p");
    if let Some(ppr) = template.and_then(|t| t.child(ns::WML, "pPr")) {
        p.push(ppr.clone());
    }
    p
}

fn appended_paragraph(root: &Element, live: &[NodePath], entry: &MappingEntry) -> (Element, bool) {
    let template = entry
        .template_index
        .and_then(|i| live.get(i))
        .and_then(|path| root.at_path(path));
    let mut paragraph = match template {
        Some(t) if !carries_objects(t) => t.clone(),
        other => bare_paragraph(other),
    };
    scrub_clone(&mut paragraph);
    let runs = extract_runs(&paragraph);
    let proportional = replace_paragraph_text(&mut paragraph, &runs, &entry.new_text);
    enhance_paragraph(&mut paragraph, entry);
    (paragraph, proportional)
}

fn append(root: &mut Element, live: &[NodePath], entries: &[MappingEntry], stats: &mut ReconstructStats) -> Result<(), Error> {
    let mut built = Vec::new();
    for entry in entries.iter().filter(|e| e.disposition == Disposition::Append) {
        let (paragraph, proportional) = appended_paragraph(root, live, entry);
        if !proportional {
            stats.even_split_fallbacks += 1;
        }
        built.push(paragraph);
    }
    if built.is_empty() {
        return Ok(());
    }
    let body = body_mut(root)?;
    let mut at = body
        .position(ns::WML, "sectPr")
        .unwrap_or(body.children.len());
    for paragraph in built {
        body.insert(at, paragraph);
        at += 1;
        stats.appended += 1;
    }
    Ok(())
}

fn drop_trailing(root: &mut Element, live: &[NodePath], entries: &[MappingEntry], stats: &mut ReconstructStats) -> Result<(), Error> {
    let Some(body_index) = root.position(ns::WML, "body") else {
        return Err(Error::Extraction("missing w:body".into()));
    };
    let mut doomed: Vec<usize> = entries
        .iter()
        .filter(|e| e.disposition == Disposition::Drop)
        .filter_map(|e| e.original_index.and_then(|i| live.get(i)))
        .filter_map(|path| match path.as_slice() {
            [b, child] if *b == body_index => Some(*child),
            _ => None,
        })
        .collect();
    doomed.sort_unstable();
    let body = body_mut(root)?;
    for child in doomed.into_iter().rev() {
        body.children.remove(child);
        stats.dropped += 1;
    }
    Ok(())
}

/// Map `text` onto `doc` and produce the bytes of the rewritten package.
pub fn reconstruct_document(doc: &Document, text: &str, options: &ReconstructOptions) -> Result<Reconstruction, Error> {
    let t0 = Instant::now();
    let lines = generated_lines(text);
    let entries = map_content(&doc.paragraphs, &lines, options.trailing_policy)?;
    let t_map = t0.elapsed();

    let t1 = Instant::now();
    let mut stats = ReconstructStats::default();
    let mut body = doc.body.clone();
    rewrite(&mut body.root, doc, &entries, &mut stats);
    let live = paragraph_paths(&body.root);
    stats.borders_restored = guard_borders(&mut body.root, doc, &live);
    append(&mut body.root, &live, &entries, &mut stats)?;
    drop_trailing(&mut body.root, &live, &entries, &mut stats)?;
    let t_rewrite = t1.elapsed();

    let t2 = Instant::now();
    let bytes = repackage(&doc.package, &body)?;
    let t_write = t2.elapsed();

    let t3 = Instant::now();
    let report = if options.validate {
        match docx::parse_bytes(&bytes) {
            Ok(output) => Some(validate(
                &doc.paragraphs,
                &output.paragraphs,
                options.validation_sample,
                options.pass_threshold,
            )),
            Err(e) => {
                log::warn!("Could not re-read output for validation: {e}");
                None
            }
        }
    } else {
        None
    };
    let t_validate = t3.elapsed();

    log::info!(
        "Rewrote {} paragraphs ({} unchanged, {} even-split, {} appended, {} dropped, {} border sides restored)",
        stats.rewritten,
        stats.unchanged,
        stats.even_split_fallbacks,
        stats.appended,
        stats.dropped,
        stats.borders_restored
    );
    log::info!(
        "Timings: map={:.1}ms rewrite={:.1}ms write={:.1}ms validate={:.1}ms",
        t_map.as_secs_f64() * 1000.0,
        t_rewrite.as_secs_f64() * 1000.0,
        t_write.as_secs_f64() * 1000.0,
        t_validate.as_secs_f64() * 1000.0
    );

    Ok(Reconstruction { bytes, stats, report })
}
