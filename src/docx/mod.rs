pub mod package;
mod properties;
mod styles;

use std::path::Path;

use crate::error::Error;
use crate::model::{Document, ListKind, NodePath, Paragraph, Part, Run, Table, TableRow};
use crate::ns;
use crate::xml::{Element, XmlDocument};

use package::Package;
use properties::{parse_paragraph_properties, parse_run_properties};
use styles::{NumberingInfo, StylesInfo, parse_numbering, parse_styles};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const NUMBERING_PART: &str = "word/numbering.xml";
pub const THEME_PART: &str = "word/theme/theme1.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub(crate) fn wml<'a>(node: &'a Element, name: &str) -> Option<&'a Element> {
    node.child(ns::WML, name)
}

/// `w:val` of the named WML child.
pub(crate) fn wml_attr<'a>(node: &'a Element, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attr(ns::WML, "val"))
}

/// Parse a WML boolean toggle element (e.g., w:b, w:i, w:strike).
/// Present with no val or val != "0"/"false" means true.
pub(crate) fn wml_bool(parent: &Element, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attr(ns::WML, "val")
            .is_none_or(|v| v != "0" && v != "false" && v != "off")
    })
}

pub(crate) fn w_attr(node: &Element, attr: &str) -> Option<String> {
    node.attr(ns::WML, attr).map(str::to_string)
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    parse_package(Package::open(path)?)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    parse_package(Package::from_bytes(bytes)?)
}

fn read_optional_part(package: &Package, name: &str) -> Option<XmlDocument> {
    let bytes = package.get(name)?;
    match XmlDocument::parse_bytes(bytes) {
        Ok(xml) => Some(xml),
        Err(e) => {
            log::warn!("Ignoring unparsable part {name}: {e}");
            None
        }
    }
}

fn is_header_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}

pub fn parse_package(package: Package) -> Result<Document, Error> {
    let body_bytes = package.get(DOCUMENT_PART).ok_or_else(|| {
        Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into())
    })?;
    let body = XmlDocument::parse_bytes(body_bytes)
        .map_err(|e| Error::Extraction(format!("{DOCUMENT_PART}: {e}")))?;
    if wml(&body.root, "body").is_none() {
        return Err(Error::Extraction("missing w:body".into()));
    }
    if body.root.name.ns.as_deref() == Some(ns::WML) && body.root.name.prefix.as_deref() != Some("w")
    {
        log::warn!("Body uses a non-standard WordprocessingML prefix; new elements are written as w:");
    }

    let styles = read_optional_part(&package, STYLES_PART);
    let numbering = read_optional_part(&package, NUMBERING_PART);
    let theme = read_optional_part(&package, THEME_PART);
    let settings = read_optional_part(&package, SETTINGS_PART);
    let relationships = read_optional_part(&package, DOCUMENT_RELS_PART);
    let content_types = read_optional_part(&package, CONTENT_TYPES_PART);

    let headers_footers: Vec<Part> = package
        .names()
        .filter(|n| is_header_footer(n))
        .filter_map(|n| {
            read_optional_part(&package, n).map(|xml| Part {
                name: n.to_string(),
                xml,
            })
        })
        .collect();

    let styles_info = parse_styles(styles.as_ref());
    let numbering_info = parse_numbering(numbering.as_ref());

    let mut para_paths = Vec::new();
    let mut table_paths = Vec::new();
    collect_blocks(&body.root, &mut Vec::new(), &mut para_paths, &mut table_paths);

    let paragraphs: Vec<Paragraph> = para_paths
        .into_iter()
        .enumerate()
        .filter_map(|(index, path)| {
            let node = body.root.at_path(&path)?;
            let top_level = body
                .root
                .at_path(&path[..path.len() - 1])
                .is_some_and(|parent| parent.is_wml("body"));
            Some(extract_paragraph(
                node,
                index,
                path,
                top_level,
                &styles_info,
                &numbering_info,
            ))
        })
        .collect();

    let tables: Vec<Table> = table_paths
        .into_iter()
        .filter_map(|path| {
            let node = body.root.at_path(&path)?;
            Some(extract_table(node, path))
        })
        .collect();

    log::info!(
        "Extracted {} paragraphs, {} tables, {} header/footer parts",
        paragraphs.len(),
        tables.len(),
        headers_footers.len()
    );

    Ok(Document {
        package,
        body,
        styles,
        numbering,
        theme,
        settings,
        relationships,
        content_types,
        headers_footers,
        paragraphs,
        tables,
    })
}

/// Collect paths of every `w:p` and `w:tbl` in document order, including
/// paragraphs nested in table cells and text boxes.
fn collect_blocks(
    el: &Element,
    path: &mut NodePath,
    paragraphs: &mut Vec<NodePath>,
    tables: &mut Vec<NodePath>,
) {
    for (i, child) in el.children.iter().enumerate() {
        let crate::xml::Node::Element(child) = child else {
            continue;
        };
        path.push(i);
        if child.is_wml("p") {
            paragraphs.push(path.clone());
        } else if child.is_wml("tbl") {
            tables.push(path.clone());
        }
        collect_blocks(child, path, paragraphs, tables);
        path.pop();
    }
}

/// Runs belonging to this paragraph: `w:r` descendants not inside a nested
/// paragraph. Hyperlinks, smart tags and field wrappers are looked through;
/// of a markup-compatibility block only the preferred choice counts.
fn collect_run_paths(el: &Element, path: &mut NodePath, out: &mut Vec<NodePath>) {
    for (i, child) in el.children.iter().enumerate() {
        let crate::xml::Node::Element(child) = child else {
            continue;
        };
        if child.is_wml("p") || child.is_wml("pPr") || child.is(ns::MC, "Fallback") {
            continue;
        }
        path.push(i);
        if child.is_wml("r") {
            out.push(path.clone());
        } else {
            collect_run_paths(child, path, out);
        }
        path.pop();
    }
}

pub(crate) fn run_paths(paragraph: &Element) -> Vec<NodePath> {
    let mut out = Vec::new();
    collect_run_paths(paragraph, &mut Vec::new(), &mut out);
    out
}

pub(crate) fn run_text(run: &Element) -> String {
    run.child_elements()
        .filter(|n| n.is_wml("t"))
        .map(|t| t.text())
        .collect()
}

/// Run text as a reader sees it: tabs become `\t`, line breaks a space so a
/// paragraph stays on one line.
fn run_display_text(run: &Element) -> String {
    let mut out = String::new();
    for child in run.child_elements() {
        if child.is_wml("t") {
            out.push_str(&child.text());
        } else if child.is_wml("tab") {
            out.push('\t');
        } else if child.is_wml("br") || child.is_wml("cr") {
            out.push(' ');
        }
    }
    out
}

fn paragraph_display_text(paragraph: &Element) -> String {
    run_paths(paragraph)
        .iter()
        .filter_map(|p| paragraph.at_path(p))
        .map(run_display_text)
        .collect()
}

/// Paths of every `w:p` under `root`, in document order.
pub(crate) fn paragraph_paths(root: &Element) -> Vec<NodePath> {
    let mut paragraphs = Vec::new();
    collect_blocks(root, &mut Vec::new(), &mut paragraphs, &mut Vec::new());
    paragraphs
}

/// Fresh run records for a paragraph node, paths relative to it.
pub(crate) fn extract_runs(paragraph: &Element) -> Vec<Run> {
    run_paths(paragraph)
        .into_iter()
        .filter_map(|p| paragraph.at_path(&p).map(|r| extract_run(r, p)))
        .collect()
}

fn extract_run(run: &Element, path: NodePath) -> Run {
    Run {
        text: run_text(run),
        properties: parse_run_properties(wml(run, "rPr")),
        has_tab: wml(run, "tab").is_some(),
        has_break: wml(run, "br").is_some() || wml(run, "cr").is_some(),
        path,
    }
}

fn resolve_list(
    props: &crate::model::ParagraphProperties,
    styles: &StylesInfo,
    numbering: &NumberingInfo,
) -> Option<ListKind> {
    // ilvl without numId falls through to the style's list
    if let Some(num) = &props.numbering
        && let Some(id) = num.id.as_deref()
    {
        return numbering.list_kind(id, num.level.as_deref());
    }
    let style_id = props
        .style
        .as_deref()
        .or(styles.default_paragraph_style.as_deref())?;
    let (num_id, level) = styles.style_numbering(style_id)?;
    numbering.list_kind(num_id, level)
}

fn extract_paragraph(
    node: &Element,
    index: usize,
    path: NodePath,
    top_level: bool,
    styles: &StylesInfo,
    numbering: &NumberingInfo,
) -> Paragraph {
    let properties = parse_paragraph_properties(wml(node, "pPr"));
    let runs = extract_runs(node);
    let text = paragraph_display_text(node);
    let list = resolve_list(&properties, styles, numbering);

    Paragraph {
        index,
        is_empty: text.trim().is_empty(),
        text,
        properties,
        list,
        runs,
        contains_drawing: node.contains(ns::WML, "drawing") || node.contains(ns::WML, "pict"),
        contains_table: node.contains(ns::WML, "tbl"),
        top_level,
        path,
    }
}

fn paragraph_texts(el: &Element, out: &mut Vec<String>) {
    for child in el.child_elements() {
        if child.is_wml("p") {
            out.push(paragraph_display_text(child));
        } else {
            paragraph_texts(child, out);
        }
    }
}

fn extract_table(node: &Element, path: NodePath) -> Table {
    let rows = node
        .child_elements()
        .filter(|n| n.is_wml("tr"))
        .map(|tr| TableRow {
            cells: tr
                .child_elements()
                .filter(|n| n.is_wml("tc"))
                .map(|tc| {
                    let mut texts = Vec::new();
                    paragraph_texts(tc, &mut texts);
                    texts.join("\n")
                })
                .collect(),
        })
        .collect();
    Table {
        properties: wml(node, "tblPr").cloned(),
        rows,
        path,
    }
}
