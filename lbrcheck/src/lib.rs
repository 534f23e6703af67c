//! lbrcheck - library drift detection for EAGLE designs
//!
//! EAGLE board (`.brd`) and schematic (`.sch`) files embed copies of every
//! library they use. This crate checks those copies against the
//! authoritative `.lbr` files of a library repository and reports each
//! description, package, device set or symbol that no longer matches.
//!
//! # Quick Start
//!
//! ```no_run
//! use lbrcheck::{CompareOptions, LibraryChecker};
//! use std::path::Path;
//!
//! let checker = LibraryChecker::new(CompareOptions::new("libraries"));
//! let report = checker.check_design(Path::new("lowpass.brd")).unwrap();
//!
//! println!("{}", report.header());
//! for line in report.lines() {
//!     println!("\t{}", line);
//! }
//! ```
//!
//! # Comparison rules
//!
//! - Equality is exact: attribute order, whitespace and child order count.
//! - Boards compare packages only; schematics compare packages, device sets
//!   and symbols.
//! - Only items embedded in the design are checked; extra items in the
//!   library file are never reported.
//! - A library is found by file name: the text before the first `.` must
//!   equal the library name.

pub mod compare;
pub mod core;
pub mod locator;
pub mod parser;

// Re-export main types
pub use crate::core::{
    CompareOptions, ComparisonReport, FileCheck, LbrCheckError, LibraryChecker, LibraryReport,
    RunOutcome,
};
pub use compare::{Collection, Mismatch};
pub use locator::{locate_library, LibraryLocation};
pub use parser::eagle::{DesignKind, EagleDocument, EagleParseError};

/// Check one design file against a library repository (convenience wrapper).
pub fn check_design(
    path: &std::path::Path,
    library_dir: &std::path::Path,
) -> Result<ComparisonReport, LbrCheckError> {
    LibraryChecker::new(CompareOptions::new(library_dir)).check_design(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CompareOptions, ComparisonReport, DesignKind, LbrCheckError, LibraryChecker, Mismatch,
        RunOutcome,
    };
}
