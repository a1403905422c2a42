pub mod classify;
pub mod distribute;
pub mod docx;
pub mod enhance;
mod error;
pub mod mapping;
pub mod model;
pub mod ns;
pub mod reconstruct;
pub mod validate;
pub mod writer;
pub mod xml;

pub use error::Error;
pub use mapping::TrailingPolicy;
pub use reconstruct::{ReconstructOptions, ReconstructStats, Reconstruction};
pub use validate::ValidationReport;

use std::path::Path;
use std::time::Instant;

/// How an output document was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fidelity {
    /// The original package with rewritten text.
    Reconstructed,
    /// Plain paragraphs with fixed formatting.
    Fallback,
}

#[derive(Debug)]
pub struct TailorOutcome {
    pub bytes: Vec<u8>,
    pub fidelity: Fidelity,
    pub stats: Option<ReconstructStats>,
    pub report: Option<ValidationReport>,
}

pub fn reconstruct(original: &Path, text: &str) -> Result<Reconstruction, Error> {
    reconstruct_with(original, text, &ReconstructOptions::default())
}

pub fn reconstruct_with(original: &Path, text: &str, options: &ReconstructOptions) -> Result<Reconstruction, Error> {
    let t0 = Instant::now();

    let doc = docx::parse(original)?;
    let t_parse = t0.elapsed();

    let result = reconstruct::reconstruct_document(&doc, text, options)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: extract={:.1}ms, reconstruct={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_total - t_parse).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        result.bytes.len(),
    );

    Ok(result)
}

/// [`reconstruct_with`], then write the package to `output` atomically.
pub fn reconstruct_to_file(
    original: &Path,
    text: &str,
    output: &Path,
    options: &ReconstructOptions,
) -> Result<Reconstruction, Error> {
    let result = reconstruct_with(original, text, options)?;
    writer::write_atomic(output, &result.bytes)?;
    Ok(result)
}

/// Reconstruct, and on any document-level failure fall back to a plain
/// document built from `text` alone.
pub fn tailor_resume(original: &Path, text: &str, options: &ReconstructOptions) -> Result<TailorOutcome, Error> {
    match reconstruct_with(original, text, options) {
        Ok(r) => Ok(TailorOutcome {
            bytes: r.bytes,
            fidelity: Fidelity::Reconstructed,
            stats: Some(r.stats),
            report: r.report,
        }),
        Err(e) => {
            log::warn!("Reconstruction failed ({e}); writing plain fallback document");
            Ok(TailorOutcome {
                bytes: writer::fallback_document(text)?,
                fidelity: Fidelity::Fallback,
                stats: None,
                report: None,
            })
        }
    }
}

pub fn fallback_document(text: &str) -> Result<Vec<u8>, Error> {
    writer::fallback_document(text)
}

/// Body text, one paragraph per line (table cell paragraphs included).
pub fn extract_text(path: &Path) -> Result<String, Error> {
    Ok(docx::parse(path)?.plain_text())
}

/// Score an existing output package against the original it was made from.
pub fn validate_files(original: &Path, output: &Path, options: &ReconstructOptions) -> Result<ValidationReport, Error> {
    let original = docx::parse(original)?;
    let output = docx::parse(output)?;
    Ok(validate::validate(
        &original.paragraphs,
        &output.paragraphs,
        options.validation_sample,
        options.pass_threshold,
    ))
}
