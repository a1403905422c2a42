//! Advisory formatting-fidelity scoring: compares the original paragraph
//! snapshot against paragraphs re-extracted from the output. Never fails.

use crate::model::{Paragraph, Run};

pub const DEFAULT_PASS_THRESHOLD: f32 = 0.95;

/// Runs compared per paragraph.
const RUNS_CHECKED: usize = 3;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParagraphScore {
    pub index: usize,
    pub score: f32,
    pub issues: Vec<String>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationReport {
    /// Share of compared paragraphs scoring at or above `pass_threshold`.
    pub overall_score: f32,
    pub pass_threshold: f32,
    pub paragraphs: Vec<ParagraphScore>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.overall_score >= self.pass_threshold
    }
}

fn check_paragraph_properties(original: &Paragraph, output: &Paragraph, issues: &mut Vec<String>) -> f32 {
    let mut score: f32 = 1.0;
    let orig = &original.properties;
    let out = &output.properties;

    if let Some(align) = orig.alignment.as_deref() {
        match out.alignment.as_deref() {
            Some(o) if o != align => {
                issues.push(format!("Alignment mismatch: {align} vs {o}"));
                score -= 0.2;
            }
            None if align != "left" && align != "start" => {
                issues.push(format!("Missing alignment: expected {align}"));
                score -= 0.2;
            }
            _ => {}
        }
    }
    if orig.numbering.is_some() && out.numbering.is_none() {
        issues.push("Missing numbering properties".into());
        score -= 0.3;
    }
    score.max(0.0)
}

fn compare_run(original: &Run, output: &Run, issues: &mut Vec<String>) -> f32 {
    let mut score: f32 = 1.0;
    let (o, n) = (&original.properties, &output.properties);
    if o.bold != n.bold {
        issues.push(format!("Run bold changed: {} vs {}", o.bold, n.bold));
        score -= 0.3;
    }
    if o.italic != n.italic {
        issues.push(format!("Run italic changed: {} vs {}", o.italic, n.italic));
        score -= 0.3;
    }
    if let (Some(os), Some(ns)) = (&o.size, &n.size)
        && os != ns
    {
        issues.push(format!("Run size changed: {os} vs {ns}"));
        score -= 0.2;
    }
    score.max(0.0)
}

fn check_run_formatting(original: &Paragraph, output: &Paragraph, issues: &mut Vec<String>) -> f32 {
    original
        .runs
        .iter()
        .zip(&output.runs)
        .take(RUNS_CHECKED)
        .map(|(o, n)| compare_run(o, n, issues))
        .product::<f32>()
        .max(0.0)
}

fn compare_values(
    kind: &str,
    pairs: &[(&str, &Option<String>, &Option<String>)],
    present: bool,
    issues: &mut Vec<String>,
) -> f32 {
    let mut penalty = 0.0;
    for (attr, orig, out) in pairs {
        let Some(orig) = orig else {
            continue;
        };
        if !present {
            issues.push(format!("Missing {kind} element for {attr}"));
            penalty += 0.25;
        } else if out.as_ref() != Some(orig) {
            issues.push(format!(
                "{kind} mismatch ({attr}): {orig} vs {}",
                out.as_deref().unwrap_or("none")
            ));
            penalty += 0.25;
        }
    }
    penalty
}

fn check_indentation_spacing(original: &Paragraph, output: &Paragraph, issues: &mut Vec<String>) -> f32 {
    let (oi, ni) = (&original.properties.indentation, &output.properties.indentation);
    let (os, ns) = (&original.properties.spacing, &output.properties.spacing);
    let mut score: f32 = 1.0;
    score -= compare_values(
        "Indentation",
        &[
            ("left", &oi.left, &ni.left),
            ("right", &oi.right, &ni.right),
            ("firstLine", &oi.first_line, &ni.first_line),
            ("hanging", &oi.hanging, &ni.hanging),
        ],
        !ni.is_empty(),
        issues,
    );
    score -= compare_values(
        "Spacing",
        &[
            ("before", &os.before, &ns.before),
            ("after", &os.after, &ns.after),
            ("line", &os.line, &ns.line),
        ],
        !ns.is_empty(),
        issues,
    );
    score.max(0.0)
}

fn check_borders_shading(original: &Paragraph, output: &Paragraph, issues: &mut Vec<String>) -> f32 {
    let mut score: f32 = 1.0;
    let (ob, nb) = (&original.properties.borders, &output.properties.borders);
    if !ob.is_empty() {
        if nb.is_empty() {
            issues.push("Missing paragraph borders".into());
            score -= 0.5;
        } else {
            for ((side, o), (_, n)) in ob.sides().zip(nb.sides()) {
                if o.is_some() && n.is_none() {
                    issues.push(format!("Missing {side} border"));
                    score -= 0.25;
                }
            }
        }
    }
    if original.properties.shading.is_some() && output.properties.shading.is_none() {
        issues.push("Missing paragraph shading".into());
        score -= 0.3;
    }
    score.max(0.0)
}

/// Score in 0.0..=1.0: the mean of four equally weighted checks.
pub fn score_paragraph(original: &Paragraph, output: &Paragraph) -> (f32, Vec<String>) {
    let mut issues = Vec::new();
    let checks = [
        check_paragraph_properties(original, output, &mut issues),
        check_run_formatting(original, output, &mut issues),
        check_indentation_spacing(original, output, &mut issues),
        check_borders_shading(original, output, &mut issues),
    ];
    (checks.iter().sum::<f32>() / checks.len() as f32, issues)
}

const RECOMMENDATIONS: &[(&str, &str)] = &[
    ("alignment", "Consider preserving original paragraph alignment settings"),
    ("indentation", "Verify indentation values are copied exactly from original"),
    ("spacing", "Check that line spacing and paragraph spacing match original"),
    ("border", "Ensure paragraph borders and horizontal lines are preserved"),
    ("bold", "Verify bold formatting is applied consistently"),
    ("italic", "Check italic formatting preservation"),
    ("numbering", "Preserve original numbering and bullet point formatting"),
];

fn recommendations(issues: &[String]) -> Vec<String> {
    let found: Vec<String> = RECOMMENDATIONS
        .iter()
        .filter(|(keyword, _)| issues.iter().any(|i| i.to_lowercase().contains(keyword)))
        .map(|(_, rec)| rec.to_string())
        .collect();
    if found.is_empty() {
        vec!["Formatting appears to be well preserved".into()]
    } else {
        found
    }
}

/// Compare paragraphs pairwise by position. `sample` limits how many are
/// compared (all when `None`).
pub fn validate(
    original: &[Paragraph],
    output: &[Paragraph],
    sample: Option<usize>,
    pass_threshold: f32,
) -> ValidationReport {
    let limit = sample.unwrap_or(usize::MAX);
    let mut paragraphs = Vec::new();
    let mut issues = Vec::new();
    let mut passed = 0;

    for (o, n) in original.iter().zip(output).take(limit) {
        let (score, para_issues) = score_paragraph(o, n);
        if score >= pass_threshold {
            passed += 1;
        } else {
            issues.extend(para_issues.iter().map(|i| format!("paragraph {}: {i}", o.index)));
        }
        paragraphs.push(ParagraphScore {
            index: o.index,
            score,
            issues: para_issues,
        });
    }

    let overall_score = if paragraphs.is_empty() {
        0.0
    } else {
        passed as f32 / paragraphs.len() as f32
    };
    let report = ValidationReport {
        overall_score,
        pass_threshold,
        recommendations: recommendations(&issues),
        paragraphs,
        issues,
    };

    log::info!(
        "Formatting preservation score: {:.1}% ({} paragraphs compared)",
        report.overall_score * 100.0,
        report.paragraphs.len()
    );
    if !report.passed() {
        for rec in report.recommendations.iter().take(3) {
            log::warn!("Formatting below threshold: {rec}");
        }
    }
    report
}
