mod common;

use common::{docx, para, run};
use docx_tailor::model::Paragraph;
use docx_tailor::validate::{DEFAULT_PASS_THRESHOLD, score_paragraph, validate};

const BORDER: &str = "<w:pBdr><w:top w:val=\"single\" w:sz=\"4\" w:space=\"1\" w:color=\"auto\"/><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"2F5496\"/></w:pBdr>";

fn parsed(body: &[String]) -> Vec<Paragraph> {
    docx_tailor::docx::parse_bytes(&docx(body)).unwrap().paragraphs
}

fn styled() -> String {
    para(
        &format!(
            "<w:numPr><w:ilvl w:val=\"0\"/><w:numId w:val=\"2\"/></w:numPr>{BORDER}<w:shd w:val=\"clear\" w:fill=\"EEEEEE\"/><w:spacing w:before=\"120\" w:after=\"60\"/><w:ind w:left=\"720\" w:hanging=\"360\"/><w:jc w:val=\"center\"/>"
        ),
        &[run("<w:b/><w:sz w:val=\"24\"/>", "Heading"), run("<w:i/>", " words")],
    )
}

#[test]
fn identical_paragraph_scores_one() {
    let original = parsed(&[styled()]);
    let output = parsed(&[styled()]);
    let (score, issues) = score_paragraph(&original[0], &output[0]);
    assert_eq!(score, 1.0);
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn stripped_paragraph_loses_every_check() {
    let original = parsed(&[styled()]);
    let output = parsed(&[para("", &[run("", "Heading"), run("", " words")])]);
    let (score, issues) = score_paragraph(&original[0], &output[0]);
    // properties 0.5, runs 0.7 * 0.7, indentation/spacing 0.0, borders 0.2
    let expected = (0.5 + 0.49 + 0.0 + 0.2) / 4.0;
    assert!((score - expected).abs() < 1e-4, "score {score}");
    assert!(issues.iter().any(|i| i.contains("Missing paragraph borders")));
    assert!(issues.iter().any(|i| i.contains("Missing numbering")));
}

#[test]
fn missing_border_side_is_reported() {
    let original = parsed(&[styled()]);
    let partial = styled().replace(
        "<w:top w:val=\"single\" w:sz=\"4\" w:space=\"1\" w:color=\"auto\"/>",
        "",
    );
    let output = parsed(&[partial]);
    let (score, issues) = score_paragraph(&original[0], &output[0]);
    assert!((score - (3.0 + 0.75) / 4.0).abs() < 1e-4, "score {score}");
    assert_eq!(issues, ["Missing top border"]);
}

#[test]
fn report_aggregates_pass_rate_and_recommendations() {
    let original = parsed(&[styled(), para("", &[run("", "Plain")])]);
    let output = parsed(&[para("", &[run("", "Heading words")]), para("", &[run("", "Other")])]);
    let report = validate(&original, &output, None, DEFAULT_PASS_THRESHOLD);
    assert_eq!(report.paragraphs.len(), 2);
    assert!((report.overall_score - 0.5).abs() < 1e-6);
    assert!(!report.passed());
    assert!(report.issues.iter().all(|i| i.starts_with("paragraph 0: ")));
    assert!(
        report
            .recommendations
            .iter()
            .any(|r| r.contains("paragraph borders"))
    );
}

#[test]
fn sample_limits_comparison() {
    let original = parsed(&[styled(), styled(), styled()]);
    let report = validate(&original, &original, Some(2), DEFAULT_PASS_THRESHOLD);
    assert_eq!(report.paragraphs.len(), 2);
    assert_eq!(report.overall_score, 1.0);
    assert!(report.passed());
    assert_eq!(
        report.recommendations,
        ["Formatting appears to be well preserved"]
    );
}
