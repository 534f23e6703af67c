//! lbrcheck CLI - check EAGLE designs against a library repository.

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use lbrcheck::{CompareOptions, ComparisonReport, LibraryChecker, Mismatch, RunOutcome};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lbrcheck")]
#[command(
    about = "Check that libraries embedded in EAGLE board and schematic files match a library repository",
    long_about = None
)]
#[command(version)]
#[command(group(
    ArgGroup::new("design")
        .args(["brd", "sch"])
        .required(true)
        .multiple(true)
))]
struct Cli {
    /// Library repository directory containing the .lbr files
    #[arg(short = 'l', long = "lbr", value_name = "DIR")]
    lbr: PathBuf,

    /// Board file (.brd) to check
    #[arg(short = 'b', long = "brd", value_name = "FILE")]
    brd: Option<PathBuf>,

    /// Schematic file (.sch) to check
    #[arg(short = 's', long = "sch", value_name = "FILE")]
    sch: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// GitHub Actions format
    Github,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let checker = LibraryChecker::new(CompareOptions::new(&cli.lbr));
    let outcome = checker.check_files(cli.brd.as_deref(), cli.sch.as_deref());

    for (file, error) in outcome.errors() {
        tracing::error!("Check of {} failed: {}", file.display(), error);
        eprintln!("Error: {}", error);
    }
    output_results(&outcome, &cli.format);

    process::exit(if outcome.passed() { 0 } else { 1 });
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_results(outcome: &RunOutcome, format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(outcome),
        OutputFormat::Json => output_json(outcome),
        OutputFormat::Github => output_github(outcome),
    }
}

fn output_human(outcome: &RunOutcome) {
    for report in outcome.reports() {
        println!("{}", report.header());
        for line in report.lines() {
            println!("\t{}", line);
        }
    }
}

fn mismatch_json(mismatch: &Mismatch) -> serde_json::Value {
    let mut value = serde_json::to_value(mismatch).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        object.insert("message".to_string(), mismatch.to_string().into());
    }
    value
}

fn report_json(report: &ComparisonReport) -> serde_json::Value {
    serde_json::json!({
        "file": report.file.display().to_string(),
        "kind": report.kind,
        "passed": report.passed(),
        "libraries": report.libraries.iter().map(|l| {
            serde_json::json!({
                "name": l.name,
                "source": l.source.as_ref().map(|p| p.display().to_string()),
            })
        }).collect::<Vec<_>>(),
        "mismatches": report.mismatches().map(mismatch_json).collect::<Vec<_>>(),
    })
}

fn output_json(outcome: &RunOutcome) {
    let output = serde_json::json!({
        "results": outcome.reports().map(report_json).collect::<Vec<_>>(),
        "errors": outcome.errors().map(|(file, e)| {
            serde_json::json!({
                "file": file.display().to_string(),
                "message": e.to_string(),
            })
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": outcome.checks.len(),
            "failed_files": outcome.checks.iter().filter(|c| !c.passed()).count(),
            "total_mismatches": outcome.reports().map(|r| r.total_mismatches()).sum::<usize>(),
        }
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to render JSON: {}", e),
    }
}

fn output_github(outcome: &RunOutcome) {
    for report in outcome.reports() {
        for mismatch in report.mismatches() {
            println!(
                "::error file={}::{}",
                report.file.display(),
                mismatch.to_string().replace('\n', " ")
            );
        }
    }
}
