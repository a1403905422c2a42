#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use zip::write::SimpleFileOptions;

pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

const CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ",
    "ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "</Types>"
);

const ROOT_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" ",
    "Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" ",
    "Target=\"word/document.xml\"/>",
    "</Relationships>"
);

/// Route `log` output through the test harness; `RUST_LOG` picks the level.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A run: optional `w:rPr` inner markup and its text.
pub fn run(rpr: &str, text: &str) -> String {
    let props = if rpr.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{rpr}</w:rPr>")
    };
    let space = if text.starts_with(' ') || text.ends_with(' ') {
        " xml:space=\"preserve\""
    } else {
        ""
    };
    format!("<w:r>{props}<w:t{space}>{text}</w:t></w:r>")
}

/// A paragraph: optional `w:pPr` inner markup and ready-made runs.
pub fn para(ppr: &str, runs: &[String]) -> String {
    let props = if ppr.is_empty() {
        String::new()
    } else {
        format!("<w:pPr>{ppr}</w:pPr>")
    };
    format!("<w:p>{props}{}</w:p>", runs.concat())
}

/// Full `word/document.xml` around the given body paragraphs.
pub fn document_xml(paragraphs: &[String]) -> String {
    format!(
        "{XML_DECL}<w:document xmlns:w=\"{W}\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
         xmlns:w14=\"http://schemas.microsoft.com/office/word/2010/wordml\">\
         <w:body>{}<w:sectPr><w:pgSz w:w=\"12240\" w:h=\"15840\"/></w:sectPr></w:body></w:document>",
        paragraphs.concat()
    )
}

/// Zip the given parts, adding a content-type manifest and package rels.
pub fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut all: Vec<(&str, &str)> = vec![("[Content_Types].xml", CONTENT_TYPES), ("_rels/.rels", ROOT_RELS)];
    all.extend_from_slice(parts);
    for (name, data) in all {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn docx(paragraphs: &[String]) -> Vec<u8> {
    let body = document_xml(paragraphs);
    package(&[("word/document.xml", body.as_str())])
}

pub fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut s = String::new();
    file.read_to_string(&mut s).unwrap();
    s
}

pub fn part_names(docx: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Write `bytes` to a fresh file under the system temp directory.
pub fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "docx-tailor-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Body paragraph as seen in the output: run texts plus the raw node.
pub struct OutParagraph {
    pub runs: Vec<String>,
    pub xml: String,
}

impl OutParagraph {
    pub fn text(&self) -> String {
        self.runs.concat()
    }
}

fn is_w(node: &roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(W) && node.tag_name().name() == name
}

/// Top-level body paragraphs of a package's main part.
pub fn body_paragraphs(docx: &[u8]) -> Vec<OutParagraph> {
    let xml = read_part(docx, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let body = doc
        .root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .unwrap();
    body.children()
        .filter(|n| is_w(n, "p"))
        .map(|p| OutParagraph {
            runs: p
                .descendants()
                .filter(|n| is_w(n, "r"))
                .map(|r| {
                    r.children()
                        .filter(|n| is_w(n, "t"))
                        .map(|t| t.text().unwrap_or_default())
                        .collect()
                })
                .collect(),
            xml: xml[p.range()].to_string(),
        })
        .collect()
}

pub fn texts(docx: &[u8]) -> Vec<String> {
    body_paragraphs(docx).iter().map(OutParagraph::text).collect()
}
