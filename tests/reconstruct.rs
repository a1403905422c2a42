mod common;

use common::{body_paragraphs, docx, document_xml, init_logging, package, para, part_names, read_part, run, temp_file, texts};
use docx_tailor::reconstruct::reconstruct_document;
use docx_tailor::{Error, Fidelity, ReconstructOptions, TrailingPolicy};

const BOTTOM_BORDER: &str = "<w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"2F5496\"/>";
const BULLET_IND: &str = "<w:ind w:left=\"720\" w:hanging=\"360\"/>";

fn resume_body() -> Vec<String> {
    vec![
        para("", &[run("<w:sz w:val=\"32\"/>", "John Doe")]),
        para("", &[]),
        para(
            &format!("<w:pBdr>{BOTTOM_BORDER}</w:pBdr><w:spacing w:before=\"240\" w:after=\"120\"/>"),
            &[run("<w:b/>", "EXPERIENCE")],
        ),
        para("", &[run("<w:b/>", "Engineer"), run("", " | Acme")]),
        para(BULLET_IND, &[run("", "• Did thing one")]),
        format!(
            "<w:p w14:paraId=\"11AA22BB\" w14:textId=\"77EE88FF\"><w:pPr>{BULLET_IND}</w:pPr>\
             <w:bookmarkStart w:id=\"0\" w:name=\"last\"/>{}<w:bookmarkEnd w:id=\"0\"/></w:p>",
            run("", "• Did thing two")
        ),
    ]
}

fn resume() -> Vec<u8> {
    docx(&resume_body())
}

const TAILORED: &str = "Jane Roe\n\nEXPERIENCE\nSenior Engineer | Acme\n• Did thing better\n• Did thing best";

fn rebuild(bytes: &[u8], text: &str, options: &ReconstructOptions) -> docx_tailor::Reconstruction {
    init_logging();
    let doc = docx_tailor::docx::parse_bytes(bytes).unwrap();
    reconstruct_document(&doc, text, options).unwrap()
}

#[test]
fn resume_scenario() {
    let original = resume();
    let result = rebuild(&original, TAILORED, &ReconstructOptions::default());
    let out = body_paragraphs(&result.bytes);
    let before = body_paragraphs(&original);

    assert_eq!(
        texts(&result.bytes),
        [
            "Jane Roe",
            "",
            "EXPERIENCE",
            "Senior Engineer | Acme",
            "• Did thing better",
            "• Did thing best"
        ]
    );
    // blank spacing paragraph untouched
    assert_eq!(out[1].xml, before[1].xml);
    // header unchanged, still bold
    assert_eq!(out[2].xml, before[2].xml);
    assert!(out[2].xml.contains("<w:b/>"));
    // job line split over its two original runs, heading part bold
    assert_eq!(out[3].runs, ["Senior Engineer ", "| Acme"]);
    assert!(out[3].xml.starts_with("<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">Senior Engineer </w:t>"));
    // bullets keep their indentation
    assert!(out[4].xml.contains(BULLET_IND));
    assert!(out[5].xml.contains(BULLET_IND));
    assert!(out[0].xml.contains("<w:sz w:val=\"32\"/>"));

    assert_eq!(result.stats.rewritten, 4);
    assert_eq!(result.stats.unchanged, 1);
    assert_eq!(result.stats.even_split_fallbacks, 0);
    assert!(result.report.is_some());
}

#[test]
fn own_text_reproduces_the_body_byte_for_byte() {
    init_logging();
    let original = resume();
    let doc = docx_tailor::docx::parse_bytes(&original).unwrap();
    let text = doc.plain_text();
    let result = reconstruct_document(&doc, &text, &ReconstructOptions::default()).unwrap();

    assert_eq!(
        read_part(&result.bytes, "word/document.xml"),
        read_part(&original, "word/document.xml")
    );
    assert_eq!(result.stats.rewritten, 0);
    assert_eq!(result.stats.borders_restored, 0);
    let report = result.report.unwrap();
    assert_eq!(report.overall_score, 1.0);
}

#[test]
fn reconstruction_is_idempotent() {
    let first = rebuild(&resume(), TAILORED, &ReconstructOptions::default());
    let second = rebuild(&first.bytes, TAILORED, &ReconstructOptions::default());
    assert_eq!(
        read_part(&second.bytes, "word/document.xml"),
        read_part(&first.bytes, "word/document.xml")
    );
}

#[test]
fn other_parts_pass_through_unchanged() {
    let styles = format!(
        "{}<w:styles xmlns:w=\"{}\"><w:style w:type=\"paragraph\" w:styleId=\"Normal\"/></w:styles>",
        common::XML_DECL,
        common::W
    );
    let header = format!(
        "{}<w:hdr xmlns:w=\"{}\"><w:p><w:r><w:t>Header</w:t></w:r></w:p></w:hdr>",
        common::XML_DECL,
        common::W
    );
    let body = document_xml(&resume_body());
    let original = package(&[
        ("word/document.xml", body.as_str()),
        ("word/styles.xml", styles.as_str()),
        ("word/header1.xml", header.as_str()),
        ("customXml/item1.xml", "<root/>"),
    ]);
    let result = rebuild(&original, TAILORED, &ReconstructOptions::default());

    assert_eq!(part_names(&result.bytes), part_names(&original));
    for name in ["word/styles.xml", "word/header1.xml", "customXml/item1.xml", "[Content_Types].xml", "_rels/.rels"] {
        assert_eq!(read_part(&result.bytes, name), read_part(&original, name), "{name}");
    }
    let doc = docx_tailor::docx::parse_bytes(&original).unwrap();
    assert_eq!(doc.headers_footers.len(), 1);
    assert!(doc.styles.is_some());
    assert!(doc.numbering.is_none());
}

#[test]
fn border_survives_rewrite() {
    let result = rebuild(
        &resume(),
        "John Doe\nPROFESSIONAL EXPERIENCE\nEngineer | Acme\n• Did thing one\n• Did thing two",
        &ReconstructOptions::default(),
    );
    let out = body_paragraphs(&result.bytes);
    assert_eq!(out[2].text(), "PROFESSIONAL EXPERIENCE");
    assert!(out[2].xml.contains(BOTTOM_BORDER));
    assert!(out[2].xml.contains("<w:spacing w:before=\"240\" w:after=\"120\"/>"));
    // all-caps original header gets an explicit caps toggle after the bold one
    assert!(out[2].xml.contains("<w:rPr><w:b/><w:caps/></w:rPr>"));
}

#[test]
fn removed_border_is_restored() {
    let original = resume();
    let mut doc = docx_tailor::docx::parse_bytes(&original).unwrap();
    // simulate an edit that lost the border on the live tree
    let path = doc.paragraphs[2].path.clone();
    let node = doc.body.root.at_path_mut(&path).unwrap();
    node.strip_descendants(docx_tailor::ns::WML, "pBdr");

    let result = reconstruct_document(&doc, &doc.plain_text(), &ReconstructOptions::default()).unwrap();
    assert_eq!(result.stats.borders_restored, 1);
    let out = body_paragraphs(&result.bytes);
    assert!(out[2].xml.contains("<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"2F5496\"/></w:pBdr>"));
}

#[test]
fn overflow_lines_are_appended_with_template_formatting() {
    let text = format!("{TAILORED}\n• Did thing three");
    let result = rebuild(&resume(), &text, &ReconstructOptions::default());
    let out = body_paragraphs(&result.bytes);

    assert_eq!(out.len(), 7);
    assert_eq!(out[6].text(), "• Did thing three");
    assert!(out[6].xml.contains(BULLET_IND));
    assert!(!out[6].xml.contains("paraId"));
    assert!(!out[6].xml.contains("textId"));
    assert!(!out[6].xml.contains("bookmark"));
    // the template itself keeps its identifiers
    assert!(out[5].xml.contains("w14:paraId=\"11AA22BB\""));
    assert!(out[5].xml.contains("bookmarkStart"));
    assert_eq!(result.stats.appended, 1);

    let xml = read_part(&result.bytes, "word/document.xml");
    let appended = xml.find("Did thing three").unwrap();
    assert!(appended < xml.find("<w:sectPr>").unwrap());
}

#[test]
fn blank_paragraphs_survive_any_text_length() {
    for text in ["Jane Roe", TAILORED, "A\nB\nC\nD\nE\nF\nG\nH"] {
        let result = rebuild(&resume(), text, &ReconstructOptions::default());
        let out = body_paragraphs(&result.bytes);
        assert_eq!(out[1].xml, "<w:p></w:p>", "{text:?}");
    }
}

#[test]
fn trailing_paragraphs_preserved_or_dropped() {
    let text = "Jane Roe\nEXPERIENCE";

    let kept = rebuild(&resume(), text, &ReconstructOptions::default());
    assert_eq!(
        texts(&kept.bytes),
        ["Jane Roe", "", "EXPERIENCE", "Engineer | Acme", "• Did thing one", "• Did thing two"]
    );

    let options = ReconstructOptions {
        trailing_policy: TrailingPolicy::Drop,
        ..ReconstructOptions::default()
    };
    let dropped = rebuild(&resume(), text, &options);
    assert_eq!(texts(&dropped.bytes), ["Jane Roe", "", "EXPERIENCE"]);
    assert_eq!(dropped.stats.dropped, 3);
    assert!(read_part(&dropped.bytes, "word/document.xml").contains("<w:sectPr>"));
}

#[test]
fn drop_policy_leaves_table_cells_alone() {
    let table = format!(
        "<w:tbl><w:tblPr/><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>",
        para("", &[run("", "Cell text")])
    );
    let original = docx(&[para("", &[run("", "Intro line")]), table]);
    let options = ReconstructOptions {
        trailing_policy: TrailingPolicy::Drop,
        ..ReconstructOptions::default()
    };
    let result = rebuild(&original, "Only", &options);
    assert_eq!(texts(&result.bytes), ["Only"]);
    assert!(read_part(&result.bytes, "word/document.xml").contains("Cell text"));
    assert_eq!(result.stats.dropped, 0);
}

#[test]
fn numbered_bullet_does_not_get_a_second_glyph() {
    let original = docx(&[para(
        &format!("<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"4\"/></w:numPr>{BULLET_IND}"),
        &[run("", "Did a thing")],
    )]);
    let result = rebuild(&original, "• Did a better thing", &ReconstructOptions::default());
    assert_eq!(texts(&result.bytes), ["Did a better thing"]);
}

#[test]
fn validation_can_be_skipped() {
    let options = ReconstructOptions {
        validate: false,
        ..ReconstructOptions::default()
    };
    let result = rebuild(&resume(), TAILORED, &options);
    assert!(result.report.is_none());
}

#[test]
fn empty_text_is_a_mapping_failure() {
    let doc = docx_tailor::docx::parse_bytes(&resume()).unwrap();
    let err = reconstruct_document(&doc, "\n \n", &ReconstructOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Mapping(_)));
}

#[test]
fn package_without_body_is_rejected() {
    let bytes = package(&[("word/styles.xml", "<styles/>")]);
    assert!(matches!(
        docx_tailor::docx::parse_bytes(&bytes),
        Err(Error::InvalidDocx(_))
    ));
    let broken = package(&[("word/document.xml", "<w:document")]);
    assert!(matches!(
        docx_tailor::docx::parse_bytes(&broken),
        Err(Error::Extraction(_))
    ));
    assert!(matches!(
        docx_tailor::docx::parse_bytes(b"not a zip"),
        Err(Error::InvalidDocx(_))
    ));
}

#[test]
fn file_round_trip_and_text_extraction() {
    let input = temp_file("resume.docx", &resume());
    let output = input.with_file_name("tailored.docx");

    let result =
        docx_tailor::reconstruct_to_file(&input, TAILORED, &output, &ReconstructOptions::default()).unwrap();
    assert_eq!(std::fs::read(&output).unwrap(), result.bytes);
    assert!(!input.with_file_name("tailored.docx.tmp").exists());

    let text = docx_tailor::extract_text(&output).unwrap();
    assert_eq!(
        text,
        "Jane Roe\n\nEXPERIENCE\nSenior Engineer | Acme\n• Did thing better\n• Did thing best"
    );

    let report = docx_tailor::validate_files(&input, &output, &ReconstructOptions::default()).unwrap();
    assert_eq!(report.paragraphs.len(), 6);
}

#[test]
fn failed_write_leaves_nothing_behind() {
    let input = temp_file("resume.docx", &resume());
    let output = input.with_file_name("missing-dir").join("out.docx");
    let err = docx_tailor::reconstruct_to_file(&input, TAILORED, &output, &ReconstructOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));
    assert!(!output.exists());
}

#[test]
fn extract_text_includes_table_cells() {
    let table = format!(
        "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        para("", &[run("", "Rust")]),
        para("", &[run("", "Go")])
    );
    let bytes = docx(&[para("", &[run("", "SKILLS")]), table]);
    let input = temp_file("skills.docx", &bytes);
    assert_eq!(docx_tailor::extract_text(&input).unwrap(), "SKILLS\nRust\nGo");

    let doc = docx_tailor::docx::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.tables.len(), 1);
    assert_eq!(doc.tables[0].rows[0].cells, ["Rust", "Go"]);
    assert!(!doc.paragraphs[1].top_level);
}

#[test]
fn extract_text_keeps_tabs_and_breaks_apart() {
    let tabbed = para(
        "",
        &[run("<w:b/>", "Engineer"), "<w:r><w:tab/></w:r>".to_string(), run("", "Jan 2020")],
    );
    let broken = "<w:p><w:r><w:t>Line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p>".to_string();
    let bytes = docx(&[tabbed, broken]);
    let input = temp_file("tabs.docx", &bytes);
    let text = docx_tailor::extract_text(&input).unwrap();
    assert_eq!(text, "Engineer\tJan 2020\nLine one line two");

    // feeding the same text back leaves both paragraphs untouched
    let doc = docx_tailor::docx::parse_bytes(&bytes).unwrap();
    assert_eq!(doc.paragraphs[0].runs[1].text, "");
    let result = reconstruct_document(&doc, &text, &ReconstructOptions::default()).unwrap();
    assert_eq!(result.stats.rewritten, 0);
    assert_eq!(
        read_part(&result.bytes, "word/document.xml"),
        read_part(&bytes, "word/document.xml")
    );
}

#[test]
fn unusable_original_falls_back_to_plain_document() {
    let input = temp_file("broken.docx", b"this is not a package");
    let outcome = docx_tailor::tailor_resume(&input, TAILORED, &ReconstructOptions::default()).unwrap();
    assert_eq!(outcome.fidelity, Fidelity::Fallback);
    assert!(outcome.report.is_none());
    assert_eq!(
        texts(&outcome.bytes),
        [
            "Jane Roe",
            "",
            "EXPERIENCE",
            "Senior Engineer | Acme",
            "• Did thing better",
            "• Did thing best"
        ]
    );
    let out = body_paragraphs(&outcome.bytes);
    assert!(out[2].xml.contains("<w:b/>"));
    assert!(!out[0].xml.contains("<w:b/>"));

    let good = temp_file("resume.docx", &resume());
    let outcome = docx_tailor::tailor_resume(&good, TAILORED, &ReconstructOptions::default()).unwrap();
    assert_eq!(outcome.fidelity, Fidelity::Reconstructed);
    assert!(outcome.stats.is_some());
}

#[test]
fn fallback_document_is_a_valid_package() {
    let bytes = docx_tailor::fallback_document("SUMMARY\n\n  Builds things  ").unwrap();
    let doc = docx_tailor::docx::parse_bytes(&bytes).unwrap();
    let texts: Vec<&str> = doc.paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, ["SUMMARY", "", "Builds things"]);
    assert!(doc.paragraphs[0].has_bold());
    assert!(read_part(&bytes, "word/document.xml").contains("<w:pgSz w:w=\"12240\" w:h=\"15840\"/>"));
}
