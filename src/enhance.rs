//! Resume-specific clean-up applied to rewritten paragraphs, plus the final
//! border guard. Every operation here is idempotent.

use crate::classify::ContentType;
use crate::docx::{run_paths, run_text};
use crate::mapping::MappingEntry;
use crate::model::{BorderSide, Indentation, ParagraphBorders, Spacing};
use crate::ns;
use crate::xml::Element;

/// Schema order of `w:pPr` children.
const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

/// Schema order of `w:rPr` children.
const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike", "outline",
    "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden", "color",
    "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr", "shd",
    "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish", "oMath",
    "rPrChange",
];

const PBDR_ORDER: &[&str] = &["top", "left", "bottom", "right", "between", "bar"];

fn insertion_index(parent: &Element, local: &str, order: &[&str]) -> usize {
    let Some(rank) = order.iter().position(|n| *n == local) else {
        return parent.children.len();
    };
    parent
        .children
        .iter()
        .position(|n| match n {
            crate::xml::Node::Element(e) if e.name.ns.as_deref() == Some(ns::WML) => order
                .iter()
                .position(|o| *o == e.name.local)
                .is_some_and(|r| r > rank),
            _ => false,
        })
        .unwrap_or(parent.children.len())
}

/// The WML child `local`, created at its schema position if missing.
fn ensure_child<'a>(parent: &'a mut Element, local: &str, order: &[&str]) -> Option<&'a mut Element> {
    let index = match parent.position(ns::WML, local) {
        Some(i) => i,
        None => {
            let i = insertion_index(parent, local, order);
            parent.insert(i, Element::wml(local));
            i
        }
    };
    parent.at_path_mut(&[index])
}

/// Properties element (`pPr` / `rPr`), which is always the first child.
fn ensure_properties<'a>(parent: &'a mut Element, local: &str) -> Option<&'a mut Element> {
    if parent.position(ns::WML, local).is_none() {
        parent.insert(0, Element::wml(local));
    }
    parent.child_mut(ns::WML, local)
}

fn set_toggle_on(run: &mut Element, local: &str) {
    let Some(rpr) = ensure_properties(run, "rPr") else {
        return;
    };
    if let Some(toggle) = ensure_child(rpr, local, RPR_ORDER) {
        let off = toggle
            .attr(ns::WML, "val")
            .is_some_and(|v| v == "0" || v == "false" || v == "off");
        if off {
            toggle.remove_attr(ns::WML, "val");
        }
    }
}

fn clear_toggle(run: &mut Element, local: &str) {
    if let Some(rpr) = run.child_mut(ns::WML, "rPr") {
        rpr.remove_children(ns::WML, local);
    }
}


fn text_runs(paragraph: &Element) -> Vec<Vec<usize>> {
    run_paths(paragraph)
        .into_iter()
        .filter(|p| {
            paragraph
                .at_path(p)
                .is_some_and(|r| !run_text(r).is_empty())
        })
        .collect()
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Split a job line into heading and company on the first separator found.
pub fn split_job_title(text: &str) -> Option<(&str, &str)> {
    [" | ", " at ", " - "]
        .iter()
        .find_map(|sep| text.split_once(sep))
}

fn enhance_section_header(paragraph: &mut Element, entry: &MappingEntry) {
    let caps = is_all_caps(&entry.original_text);
    for path in run_paths(paragraph) {
        let Some(run) = paragraph.at_path_mut(&path) else {
            continue;
        };
        set_toggle_on(run, "b");
        if caps {
            set_toggle_on(run, "caps");
        }
    }
}

fn enhance_job_title(paragraph: &mut Element, entry: &MappingEntry) {
    if split_job_title(&entry.new_text).is_none() {
        return;
    }
    let runs = text_runs(paragraph);
    if runs.len() < 2 {
        return;
    }
    if let Some(first) = paragraph.at_path_mut(&runs[0]) {
        set_toggle_on(first, "b");
    }
    if let Some(second) = paragraph.at_path_mut(&runs[1]) {
        clear_toggle(second, "b");
    }
}

fn apply_indentation(paragraph: &mut Element, original: &Indentation) {
    if original.left.is_none() && original.hanging.is_none() && original.first_line.is_none() {
        return;
    }
    let Some(ppr) = ensure_properties(paragraph, "pPr") else {
        return;
    };
    let Some(ind) = ensure_child(ppr, "ind", PPR_ORDER) else {
        return;
    };
    if let Some(left) = &original.left {
        let attr = if ind.attr(ns::WML, "left").is_none() && ind.attr(ns::WML, "start").is_some() {
            "start"
        } else {
            "left"
        };
        ind.set_attr(ns::WML, attr, left);
    }
    if let Some(hanging) = &original.hanging {
        ind.set_attr(ns::WML, "hanging", hanging);
    }
    if let Some(first_line) = &original.first_line {
        ind.set_attr(ns::WML, "firstLine", first_line);
    }
}

fn apply_spacing(paragraph: &mut Element, original: &Spacing) {
    if original.is_empty() {
        return;
    }
    let Some(ppr) = ensure_properties(paragraph, "pPr") else {
        return;
    };
    let Some(spacing) = ensure_child(ppr, "spacing", PPR_ORDER) else {
        return;
    };
    for (attr, value) in [
        ("before", &original.before),
        ("after", &original.after),
        ("line", &original.line),
        ("lineRule", &original.line_rule),
    ] {
        if let Some(v) = value {
            spacing.set_attr(ns::WML, attr, v);
        }
    }
}

fn enhance_contact_info(paragraph: &mut Element, entry: &MappingEntry) {
    if entry.was_bold() {
        return;
    }
    for path in run_paths(paragraph) {
        if let Some(run) = paragraph.at_path_mut(&path) {
            clear_toggle(run, "b");
        }
    }
}

/// Type-specific normalization of a rewritten paragraph.
pub fn enhance_paragraph(paragraph: &mut Element, entry: &MappingEntry) {
    match entry.content_type {
        ContentType::SectionHeader => {
            enhance_section_header(paragraph, entry);
            apply_spacing(paragraph, &entry.properties.spacing);
        }
        ContentType::JobTitle => enhance_job_title(paragraph, entry),
        ContentType::BulletPoint => {
            apply_indentation(paragraph, &entry.properties.indentation);
            apply_spacing(paragraph, &entry.properties.spacing);
        }
        ContentType::ContactInfo => enhance_contact_info(paragraph, entry),
        _ => {}
    }
}

fn border_matches(side: &Element, original: &BorderSide) -> bool {
    [
        ("val", &original.style),
        ("sz", &original.size),
        ("space", &original.space),
        ("color", &original.color),
        ("shadow", &original.shadow),
    ]
    .iter()
    .all(|(attr, value)| value.is_none() || side.attr(ns::WML, attr) == value.as_deref())
}

/// Re-assert every border side the original paragraph had. Returns the
/// number of sides that had to be restored.
pub fn restore_borders(paragraph: &mut Element, original: &ParagraphBorders) -> usize {
    if original.is_empty() {
        return 0;
    }
    let Some(ppr) = ensure_properties(paragraph, "pPr") else {
        return 0;
    };
    let Some(pbdr) = ensure_child(ppr, "pBdr", PPR_ORDER) else {
        return 0;
    };
    let mut restored = 0;
    for (name, side) in original.sides() {
        let Some(side) = side else {
            continue;
        };
        if pbdr
            .child(ns::WML, name)
            .is_some_and(|live| border_matches(live, side))
        {
            continue;
        }
        let Some(live) = ensure_child(pbdr, name, PBDR_ORDER) else {
            continue;
        };
        for (attr, value) in [
            ("val", &side.style),
            ("sz", &side.size),
            ("space", &side.space),
            ("color", &side.color),
            ("shadow", &side.shadow),
        ] {
            if let Some(v) = value {
                live.set_attr(ns::WML, attr, v);
            }
        }
        restored += 1;
    }
    restored
}
