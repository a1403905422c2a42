//! Spread replacement text over a paragraph's existing runs so each run keeps
//! its own formatting node.

use std::fmt;

use crate::model::Run;
use crate::ns;
use crate::xml::{Element, Node};

#[derive(Debug)]
pub struct DistributionError(pub String);

impl fmt::Display for DistributionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot distribute text over runs: {}", self.0)
    }
}

impl std::error::Error for DistributionError {}

/// Character-offset view of a paragraph's original formatting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormattingPattern {
    pub bold: Vec<(usize, usize)>,
    pub italic: Vec<(usize, usize)>,
    pub fonts: Vec<(usize, String)>,
    pub sizes: Vec<(usize, String)>,
    /// (start, end, run index)
    pub run_boundaries: Vec<(usize, usize, usize)>,
}

impl FormattingPattern {
    pub fn analyze(runs: &[Run]) -> Self {
        let mut pattern = FormattingPattern::default();
        let mut pos = 0;
        for (i, run) in runs.iter().enumerate() {
            let end = pos + run.text.chars().count();
            let props = &run.properties;
            if props.bold {
                pattern.bold.push((pos, end));
            }
            if props.italic {
                pattern.italic.push((pos, end));
            }
            if let Some(font) = &props.fonts.ascii {
                pattern.fonts.push((pos, font.clone()));
            }
            if let Some(size) = &props.size {
                pattern.sizes.push((pos, size.clone()));
            }
            pattern.run_boundaries.push((pos, end, i));
            pos = end;
        }
        pattern
    }

    pub fn text_len(&self) -> usize {
        self.run_boundaries.last().map(|b| b.1).unwrap_or(0)
    }
}

fn join_slices(words: &[&str], counts: &[usize]) -> Vec<String> {
    let total: usize = counts.iter().sum();
    let mut cursor = 0;
    counts
        .iter()
        .map(|&k| {
            let mut text = words[cursor..cursor + k].join(" ");
            cursor += k;
            if k > 0 && cursor < total {
                text.push(' ');
            }
            text
        })
        .collect()
}

/// Words of `text` split over runs in proportion to each run's original
/// length. The last run that had text takes whatever is left; runs that had
/// no text (tabs, breaks) get nothing.
pub fn proportional_split(
    pattern: &FormattingPattern,
    run_count: usize,
    text: &str,
) -> Result<Vec<String>, DistributionError> {
    if pattern.run_boundaries.len() != run_count {
        return Err(DistributionError(format!(
            "{} run boundaries for {} runs",
            pattern.run_boundaries.len(),
            run_count
        )));
    }
    let total = pattern.text_len();
    if total == 0 {
        return Err(DistributionError("original runs carry no text".into()));
    }
    let Some(last_text_run) = pattern.run_boundaries.iter().rposition(|(s, e, _)| e > s) else {
        return Err(DistributionError("original runs carry no text".into()));
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    let n = words.len();
    let mut counts = vec![0usize; run_count];
    let mut assigned = 0;
    for (i, &(start, end, _)) in pattern.run_boundaries.iter().enumerate() {
        if i == last_text_run {
            counts[i] = n - assigned;
            break;
        }
        if assigned >= n || end == start {
            continue;
        }
        let share = n * (end - start) / total;
        let k = share.max(1).min(n - assigned);
        counts[i] = k;
        assigned += k;
    }
    Ok(join_slices(&words, &counts))
}

/// Same number of words per run, the last run taking the rest.
pub fn even_split(run_count: usize, text: &str) -> Vec<String> {
    if run_count == 0 {
        return Vec::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let n = words.len();
    let per_run = (n / run_count).max(1);
    let mut counts = vec![0usize; run_count];
    let mut assigned = 0;
    for (i, count) in counts.iter_mut().enumerate() {
        let k = if i == run_count - 1 {
            n - assigned
        } else {
            per_run.min(n - assigned)
        };
        *count = k;
        assigned += k;
    }
    join_slices(&words, &counts)
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(' ') || text.ends_with(' ') || text.contains("  ")
}

/// Put `text` into the run's first `w:t`, dropping any further `w:t`
/// elements. The run and its `w:rPr` stay in place even when `text` is empty.
pub fn replace_run_text(run: &mut Element, text: &str) {
    let mut seen = false;
    run.children.retain(|n| match n {
        Node::Element(e) if e.is_wml("t") => !std::mem::replace(&mut seen, true),
        _ => true,
    });
    match run.child_mut(ns::WML, "t") {
        Some(t) => {
            t.set_text(text);
            if needs_preserve(text) {
                t.set_attr(ns::XML, "space", "preserve");
            }
        }
        None if !text.is_empty() => {
            let mut t = Element::wml("t");
            if needs_preserve(text) {
                t.set_attr(ns::XML, "space", "preserve");
            }
            t.set_text(text);
            run.push(t);
        }
        None => {}
    }
}

/// Revision markers only make sense on the paragraph mark.
const MARK_ONLY: &[&str] = &["ins", "del", "moveFrom", "moveTo", "rPrChange"];

/// Append a new run holding `text`, formatted like the paragraph mark.
pub fn synthesize_run(paragraph: &mut Element, text: &str) {
    let mut run = Element::wml("r");
    if let Some(mark) = paragraph
        .child(ns::WML, "pPr")
        .and_then(|ppr| ppr.child(ns::WML, "rPr"))
    {
        let mut rpr = mark.clone();
        for name in MARK_ONLY {
            rpr.remove_children(ns::WML, name);
        }
        run.push(rpr);
    }
    replace_run_text(&mut run, text);
    paragraph.push(run);
}

fn live_run_count(paragraph: &Element, runs: &[Run]) -> usize {
    runs.iter()
        .filter(|r| paragraph.at_path(&r.path).is_some_and(|e| e.is_wml("r")))
        .count()
}

fn apply_texts(paragraph: &mut Element, runs: &[Run], texts: &[String]) {
    for (run, text) in runs.iter().zip(texts) {
        if let Some(live) = paragraph.at_path_mut(&run.path) {
            replace_run_text(live, text);
        }
    }
}

/// Distribute `new_text` over `runs` (the paragraph's original runs, whose
/// paths are relative to `paragraph`).
pub fn distribute(paragraph: &mut Element, runs: &[Run], new_text: &str) -> Result<(), DistributionError> {
    if runs.is_empty() {
        synthesize_run(paragraph, new_text);
        return Ok(());
    }
    let live = live_run_count(paragraph, runs);
    if live != runs.len() {
        return Err(DistributionError(format!(
            "{live} of {} runs found in the live paragraph",
            runs.len()
        )));
    }
    if let [run] = runs {
        if let Some(node) = paragraph.at_path_mut(&run.path) {
            replace_run_text(node, new_text);
        }
        return Ok(());
    }

    let pattern = FormattingPattern::analyze(runs);
    log::debug!(
        "Formatting pattern: {} runs, {} bold spans, {} italic spans, {} font changes, {} size changes",
        pattern.run_boundaries.len(),
        pattern.bold.len(),
        pattern.italic.len(),
        pattern.fonts.len(),
        pattern.sizes.len()
    );
    let texts = proportional_split(&pattern, runs.len(), new_text)?;
    apply_texts(paragraph, runs, &texts);
    Ok(())
}

/// [`distribute`], falling back to an even split when the proportional
/// split is not possible. Returns false if the fallback was used.
pub fn replace_paragraph_text(paragraph: &mut Element, runs: &[Run], new_text: &str) -> bool {
    match distribute(paragraph, runs, new_text) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{e}; using even split");
            let live: Vec<Run> = runs
                .iter()
                .filter(|r| paragraph.at_path(&r.path).is_some_and(|e| e.is_wml("r")))
                .cloned()
                .collect();
            if live.is_empty() {
                synthesize_run(paragraph, new_text);
            } else {
                let texts = even_split(live.len(), new_text);
                apply_texts(paragraph, &live, &texts);
            }
            false
        }
    }
}

