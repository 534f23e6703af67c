//! Core comparison logic shared by the CLI and library users.
//! No process or output concerns.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compare::{compare_library, Mismatch};
use crate::locator::{locate_library, LibraryLocation};
use crate::parser::eagle::{DesignKind, EagleDocument, EagleParseError};
use crate::parser::xml::Element;

#[derive(Debug, thiserror::Error)]
pub enum LbrCheckError {
    #[error("Parse error: {0}")]
    Parse(#[from] EagleParseError),
    #[error("Repository error: cannot read {}: {source}", .path.display())]
    Repository {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Options for a comparison run.
#[derive(Clone, Debug)]
pub struct CompareOptions {
    /// Root of the library repository searched for library files.
    pub library_dir: PathBuf,
}

impl CompareOptions {
    pub fn new(library_dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: library_dir.into(),
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Result of checking one embedded library reference.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryReport {
    pub name: String,
    /// Library file the reference resolved to.
    pub source: Option<PathBuf>,
    pub mismatches: Vec<Mismatch>,
}

impl LibraryReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Per-design-file comparison result.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub file: PathBuf,
    pub kind: DesignKind,
    pub libraries: Vec<LibraryReport>,
}

impl ComparisonReport {
    /// True when no library reference produced a mismatch.
    pub fn passed(&self) -> bool {
        self.libraries.iter().all(LibraryReport::passed)
    }

    /// All mismatches in report order.
    pub fn mismatches(&self) -> impl Iterator<Item = &Mismatch> {
        self.libraries.iter().flat_map(|l| l.mismatches.iter())
    }

    pub fn total_mismatches(&self) -> usize {
        self.libraries.iter().map(|l| l.mismatches.len()).sum()
    }

    /// Report section header, e.g. `results for board file:`.
    pub fn header(&self) -> String {
        format!("results for {} file:", self.kind)
    }

    /// Diagnostic lines: one per mismatch, or a single clean line.
    pub fn lines(&self) -> Vec<String> {
        if self.passed() {
            return vec!["no differences found".to_string()];
        }
        self.mismatches().map(ToString::to_string).collect()
    }
}

/// Outcome of checking one requested design file.
#[derive(Debug)]
pub struct FileCheck {
    pub file: PathBuf,
    pub result: Result<ComparisonReport, LbrCheckError>,
}

impl FileCheck {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(report) if report.passed())
    }
}

/// Outcome of checking a board and/or schematic in one run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub checks: Vec<FileCheck>,
}

impl RunOutcome {
    /// True when every requested file was checked and passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(FileCheck::passed)
    }

    pub fn reports(&self) -> impl Iterator<Item = &ComparisonReport> {
        self.checks.iter().filter_map(|c| c.result.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Path, &LbrCheckError)> {
        self.checks
            .iter()
            .filter_map(|c| c.result.as_ref().err().map(|e| (c.file.as_path(), e)))
    }
}

/// Compares the libraries embedded in design files against a repository.
pub struct LibraryChecker {
    options: CompareOptions,
}

impl LibraryChecker {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Check a single board or schematic file.
    ///
    /// Fails when the file cannot be read or parsed, when it holds neither a
    /// board nor a schematic, or when a resolved library file cannot be
    /// parsed. Mismatches and unresolved libraries are part of the report,
    /// and every library is evaluated.
    pub fn check_design(&self, path: &Path) -> Result<ComparisonReport, LbrCheckError> {
        let document = EagleDocument::open(path)?;
        let design = document.drawing()?.design()?;
        tracing::debug!("Checking {} file {}", design.kind, path.display());

        let libraries = design
            .libraries()
            .into_iter()
            .map(|embedded| self.check_library(embedded, design.kind))
            .collect::<Result<Vec<_>, _>>()?;

        let report = ComparisonReport {
            file: path.to_path_buf(),
            kind: design.kind,
            libraries,
        };
        tracing::info!(
            "Checked {} libraries in {}: {} mismatches",
            report.libraries.len(),
            path.display(),
            report.total_mismatches()
        );
        Ok(report)
    }

    /// Check a board and/or a schematic independently. A failure in one
    /// never stops the other.
    pub fn check_files(&self, board: Option<&Path>, schematic: Option<&Path>) -> RunOutcome {
        let checks = [board, schematic]
            .into_iter()
            .flatten()
            .map(|file| FileCheck {
                file: file.to_path_buf(),
                result: self.check_design(file),
            })
            .collect();
        RunOutcome { checks }
    }

    fn check_library(
        &self,
        embedded: &Element,
        kind: DesignKind,
    ) -> Result<LibraryReport, LbrCheckError> {
        let name = embedded.attribute("name").unwrap_or_default();

        let source = match locate_library(name, &self.options.library_dir)? {
            LibraryLocation::Found(path) => path,
            LibraryLocation::NotFound => {
                tracing::info!(
                    "No library file for '{}' under {}",
                    name,
                    self.options.library_dir.display()
                );
                return Ok(LibraryReport {
                    name: name.to_string(),
                    source: None,
                    mismatches: vec![Mismatch::MissingLibraryFile {
                        library: name.to_string(),
                    }],
                });
            }
        };

        let library_document = EagleDocument::open(&source)?;
        let authoritative = library_document.library()?;
        let mismatches = compare_library(embedded, authoritative, kind.collections());

        Ok(LibraryReport {
            name: name.to_string(),
            source: Some(source),
            mismatches,
        })
    }
}
