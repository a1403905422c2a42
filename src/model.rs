use crate::docx::package::Package;
use crate::xml::{Element, XmlDocument};

/// Child-index path from the body root to a live node. Stays valid as long
/// as no sibling is inserted or removed in front of it.
pub type NodePath = Vec<usize>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub before: Option<String>,
    pub after: Option<String>,
    pub line: Option<String>,
    pub line_rule: Option<String>,
}

impl Spacing {
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none() && self.line.is_none() && self.line_rule.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Indentation {
    pub left: Option<String>,
    pub right: Option<String>,
    pub first_line: Option<String>,
    pub hanging: Option<String>,
}

impl Indentation {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.first_line.is_none() && self.hanging.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderSide {
    pub style: Option<String>,
    pub size: Option<String>,
    pub space: Option<String>,
    pub color: Option<String>,
    pub shadow: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphBorders {
    pub top: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
    pub left: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub between: Option<BorderSide>,
}

impl ParagraphBorders {
    pub fn is_empty(&self) -> bool {
        self.sides().all(|(_, s)| s.is_none())
    }

    pub fn sides(&self) -> impl Iterator<Item = (&'static str, Option<&BorderSide>)> {
        [
            ("top", self.top.as_ref()),
            ("left", self.left.as_ref()),
            ("bottom", self.bottom.as_ref()),
            ("right", self.right.as_ref()),
            ("between", self.between.as_ref()),
        ]
        .into_iter()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shading {
    pub val: Option<String>,
    pub color: Option<String>,
    pub fill: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TabStop {
    pub position: Option<String>,
    pub alignment: Option<String>,
    pub leader: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Numbering {
    pub level: Option<String>,
    pub id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListKind {
    Bullet,
    Numbered,
}

/// Paragraph-level properties, kept as the raw attribute strings so they can
/// be written back exactly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphProperties {
    pub style: Option<String>,
    pub alignment: Option<String>,
    pub spacing: Spacing,
    pub indentation: Indentation,
    pub borders: ParagraphBorders,
    pub shading: Option<Shading>,
    pub tabs: Vec<TabStop>,
    pub numbering: Option<Numbering>,
    pub page_break_before: bool,
    pub keep_lines: bool,
    pub keep_next: bool,
    pub outline_level: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunFonts {
    pub ascii: Option<String>,
    pub h_ansi: Option<String>,
    pub east_asia: Option<String>,
    pub cs: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProperties {
    pub fonts: RunFonts,
    pub size: Option<String>, // half-points
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<String>,
    pub strike: bool,
    pub caps: bool,
    pub highlight: Option<String>,
    pub vertical_align: Option<String>,
    pub spacing: Option<String>,
    pub position: Option<String>,
    pub style: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Run {
    pub text: String,
    pub properties: RunProperties,
    pub has_tab: bool,
    pub has_break: bool,
    /// Path from the owning paragraph element to this run.
    pub path: NodePath,
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub index: usize,
    /// Run texts in order, with `w:tab` as `\t` and `w:br`/`w:cr` as a space.
    pub text: String,
    pub properties: ParagraphProperties,
    /// List membership from direct numbering or the paragraph style.
    pub list: Option<ListKind>,
    pub runs: Vec<Run>,
    pub is_empty: bool,
    pub contains_drawing: bool,
    pub contains_table: bool,
    /// Direct child of `w:body` (not inside a table cell or text box).
    pub top_level: bool,
    /// Path from the document root element to the `w:p` node.
    pub path: NodePath,
}

impl Paragraph {
    pub fn has_bold(&self) -> bool {
        self.runs.iter().any(|r| r.properties.bold)
    }

    pub fn has_italic(&self) -> bool {
        self.runs.iter().any(|r| r.properties.italic)
    }
}

pub struct TableRow {
    pub cells: Vec<String>,
}

/// Minimal pass-through view of a table.
pub struct Table {
    pub properties: Option<Element>,
    pub rows: Vec<TableRow>,
    pub path: NodePath,
}

pub struct Part {
    pub name: String,
    pub xml: XmlDocument,
}

/// Everything extracted from one package. The paragraph list is a snapshot;
/// rewriting happens on a copy of `body`.
pub struct Document {
    pub package: Package,
    pub body: XmlDocument,
    pub styles: Option<XmlDocument>,
    pub numbering: Option<XmlDocument>,
    pub theme: Option<XmlDocument>,
    pub settings: Option<XmlDocument>,
    pub relationships: Option<XmlDocument>,
    pub content_types: Option<XmlDocument>,
    pub headers_footers: Vec<Part>,
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
}

impl Document {
    /// Body text, one line per paragraph (table cell paragraphs included).
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
