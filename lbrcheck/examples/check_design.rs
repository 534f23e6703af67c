//! Check one design file against a library repository and print the report.

use lbrcheck::prelude::*;
use std::path::Path;

fn main() -> Result<(), LbrCheckError> {
    let mut args = std::env::args().skip(1);
    let (Some(design), Some(library_dir)) = (args.next(), args.next()) else {
        eprintln!("Usage: cargo run --example check_design <path/to/design.brd|.sch> <library dir>");
        std::process::exit(1);
    };

    let checker = LibraryChecker::new(CompareOptions::new(library_dir));
    let report = checker.check_design(Path::new(&design))?;

    println!("{}", report.header());
    for library in &report.libraries {
        let source = library
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<not found>".to_string());
        println!("  {} -> {} ({} mismatches)", library.name, source, library.mismatches.len());
    }
    println!();
    for line in report.lines() {
        println!("\t{}", line);
    }

    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}
