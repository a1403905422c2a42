//! Serialize the rewritten body, repackage, and write output files.

use std::path::{Path, PathBuf};

use crate::classify::{ContentType, classify};
use crate::distribute::replace_run_text;
use crate::docx::package::Package;
use crate::docx::{CONTENT_TYPES_PART, DOCUMENT_PART};
use crate::error::Error;
use crate::ns;
use crate::xml::{Element, XmlDocument};

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// New archive bytes: every original entry, in order, with the body replaced.
pub fn repackage(package: &Package, body: &XmlDocument) -> Result<Vec<u8>, Error> {
    let mut package = package.clone();
    package.replace(DOCUMENT_PART, body.to_bytes());
    package
        .to_bytes()
        .map_err(|e| Error::Write(format!("repackaging failed: {e}")))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through a temporary sibling and rename it into place, so a failed
/// write never leaves a partial file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let tmp = temp_path(path);
    let result = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::Write(format!("{}: {e}", path.display())));
    }
    Ok(())
}

fn text_paragraph(line: &str) -> Element {
    let mut p = Element::wml("p");
    if line.is_empty() {
        return p;
    }
    let mut r = Element::wml("r");
    if classify(line) == ContentType::SectionHeader {
        let mut rpr = Element::wml("rPr");
        rpr.push(Element::wml("b"));
        r.push(rpr);
    }
    replace_run_text(&mut r, line);
    p.push(r);
    p
}

fn fallback_body(text: &str) -> XmlDocument {
    let mut root = Element::wml("document");
    root.declare_namespace("w", ns::WML);
    root.declare_namespace("r", ns::REL);

    let mut body = Element::wml("body");
    for line in text.lines() {
        body.push(text_paragraph(line.trim()));
    }

    let mut sect = Element::wml("sectPr");
    let mut pg_sz = Element::wml("pgSz");
    pg_sz.set_attr(ns::WML, "w", "12240");
    pg_sz.set_attr(ns::WML, "h", "15840");
    let mut pg_mar = Element::wml("pgMar");
    for side in ["top", "right", "bottom", "left"] {
        pg_mar.set_attr(ns::WML, side, "1440");
    }
    sect.push(pg_sz);
    sect.push(pg_mar);
    body.push(sect);
    root.push(body);

    XmlDocument {
        prolog: XML_DECL.to_string(),
        root,
        epilog: String::new(),
    }
}

const FALLBACK_CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ",
    "ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "</Types>"
);

const FALLBACK_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" ",
    "Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" ",
    "Target=\"word/document.xml\"/>",
    "</Relationships>"
);

/// Minimal package with one plain paragraph per line of `text` (blank lines
/// become empty paragraphs, section headers are bold). Used when the
/// original formatting cannot be reused.
pub fn fallback_document(text: &str) -> Result<Vec<u8>, Error> {
    let package = Package::from_parts([
        (CONTENT_TYPES_PART, FALLBACK_CONTENT_TYPES.as_bytes().to_vec()),
        ("_rels/.rels", FALLBACK_RELS.as_bytes().to_vec()),
        (DOCUMENT_PART, fallback_body(text).to_bytes()),
    ]);
    package
        .to_bytes()
        .map_err(|e| Error::Write(format!("fallback document: {e}")))
}
