use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docx_tailor::classify::classify_paragraph;
use docx_tailor::{Error, Fidelity, ReconstructOptions, TrailingPolicy, ValidationReport};

#[derive(Parser)]
#[command(name = "docx-tailor", version, about = "Rewrite a DOCX resume's text, keeping its formatting")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Map tailored text onto the original document and write the result
    Reconstruct {
        original: PathBuf,
        /// Plain text, one paragraph per line
        tailored: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Remove original paragraphs left without a tailored line
        #[arg(long)]
        drop_trailing: bool,
        #[arg(long)]
        no_validate: bool,
        /// Fail instead of writing a plain fallback document
        #[arg(long)]
        no_fallback: bool,
        /// Write the validation report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the document text, one paragraph per line
    Extract { input: PathBuf },
    /// List paragraphs with their classified content type
    Inspect { input: PathBuf },
    /// Score an output document against its original
    Validate {
        original: PathBuf,
        output: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn write_report(path: &Path, report: &ValidationReport) -> Result<(), Error> {
    let json = serde_json::to_vec_pretty(report).map_err(|e| Error::Write(format!("report: {e}")))?;
    std::fs::write(path, json).map_err(Error::Io)
}

fn print_score(report: &ValidationReport) {
    println!(
        "Formatting score: {:.1}% ({})",
        report.overall_score * 100.0,
        if report.passed() { "pass" } else { "below threshold" }
    );
    if !report.passed() {
        for rec in &report.recommendations {
            println!("  - {rec}");
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_reconstruct(
    original: &Path,
    tailored: &Path,
    output: &Path,
    drop_trailing: bool,
    no_validate: bool,
    no_fallback: bool,
    report: Option<&Path>,
) -> Result<(), Error> {
    let text = std::fs::read_to_string(tailored)?;
    let options = ReconstructOptions {
        trailing_policy: if drop_trailing {
            TrailingPolicy::Drop
        } else {
            TrailingPolicy::Preserve
        },
        validate: !no_validate,
        ..ReconstructOptions::default()
    };

    let (bytes, validation) = if no_fallback {
        let r = docx_tailor::reconstruct_with(original, &text, &options)?;
        (r.bytes, r.report)
    } else {
        let outcome = docx_tailor::tailor_resume(original, &text, &options)?;
        if outcome.fidelity == Fidelity::Fallback {
            eprintln!("warning: original formatting could not be reused; wrote plain document");
        }
        (outcome.bytes, outcome.report)
    };
    docx_tailor::writer::write_atomic(output, &bytes)?;
    println!("Wrote {}", output.display());

    if let Some(v) = &validation {
        print_score(v);
        if let Some(path) = report {
            write_report(path, v)?;
        }
    }
    Ok(())
}

fn run_inspect(input: &Path) -> Result<(), Error> {
    let doc = docx_tailor::docx::parse(input)?;
    for p in &doc.paragraphs {
        println!(
            "{:>4}  {:<14} runs={:<3} list={:<5} {}",
            p.index,
            classify_paragraph(p).as_str(),
            p.runs.len(),
            p.list.is_some(),
            p.text
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Reconstruct {
            original,
            tailored,
            output,
            drop_trailing,
            no_validate,
            no_fallback,
            report,
        } => run_reconstruct(
            &original,
            &tailored,
            &output,
            drop_trailing,
            no_validate,
            no_fallback,
            report.as_deref(),
        ),
        Command::Extract { input } => {
            println!("{}", docx_tailor::extract_text(&input)?);
            Ok(())
        }
        Command::Inspect { input } => run_inspect(&input),
        Command::Validate {
            original,
            output,
            report,
        } => {
            let v = docx_tailor::validate_files(&original, &output, &ReconstructOptions::default())?;
            print_score(&v);
            if let Some(path) = report {
                write_report(&path, &v)?;
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
