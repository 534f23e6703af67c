//! EAGLE document loader
//!
//! EAGLE board (`.brd`), schematic (`.sch`) and library (`.lbr`) files share
//! one XML layout:
//!
//! ```text
//! eagle
//! └── drawing
//!     └── board | schematic | library
//! ```
//!
//! Boards and schematics embed copies of the libraries they use under
//! `libraries/library[@name]`. Library files hold a single unnamed `library`
//! element of the same shape.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::compare::collection::Collection;
use crate::parser::xml::{parse_xml, Element};

#[derive(Debug, Error)]
pub enum EagleParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML in {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{}: missing <{element}> element", .path.display())]
    MissingElement {
        path: PathBuf,
        element: &'static str,
    },
    #[error("{}: given file is not a valid eagle file", .0.display())]
    InvalidDesign(PathBuf),
}

/// Which kind of design a drawing holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignKind {
    Board,
    Schematic,
}

impl DesignKind {
    /// Tag of the design element below `drawing`.
    pub fn tag(self) -> &'static str {
        match self {
            DesignKind::Board => "board",
            DesignKind::Schematic => "schematic",
        }
    }

    /// Sub-collections compared for this kind of design.
    ///
    /// Boards only embed footprints; schematics also carry device sets and
    /// symbols.
    pub fn collections(self) -> &'static [Collection] {
        match self {
            DesignKind::Board => &[Collection::Packages],
            DesignKind::Schematic => &[
                Collection::Packages,
                Collection::Devicesets,
                Collection::Symbols,
            ],
        }
    }
}

impl fmt::Display for DesignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A parsed EAGLE file.
#[derive(Debug, Clone)]
pub struct EagleDocument {
    path: PathBuf,
    root: Element,
}

impl EagleDocument {
    /// Read and parse a file from disk.
    pub fn open(path: &Path) -> Result<Self, EagleParseError> {
        let text = std::fs::read_to_string(path).map_err(|source| EagleParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text, path)
    }

    /// Parse from memory. `origin` is only used in error messages.
    pub fn parse_str(text: &str, origin: impl Into<PathBuf>) -> Result<Self, EagleParseError> {
        let path = origin.into();
        match parse_xml(text) {
            Ok(root) => Ok(Self { path, root }),
            Err(source) => Err(EagleParseError::Xml { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn drawing(&self) -> Result<Drawing<'_>, EagleParseError> {
        let element = self
            .root
            .child("drawing")
            .ok_or_else(|| EagleParseError::MissingElement {
                path: self.path.clone(),
                element: "drawing",
            })?;
        Ok(Drawing {
            element,
            path: &self.path,
        })
    }

    /// Shortcut for `drawing()?.library()` on `.lbr` files.
    pub fn library(&self) -> Result<&Element, EagleParseError> {
        self.drawing()?.library()
    }
}

/// The `drawing` element of a document.
#[derive(Debug, Clone, Copy)]
pub struct Drawing<'a> {
    element: &'a Element,
    path: &'a Path,
}

impl<'a> Drawing<'a> {
    /// The board or schematic held by this drawing. A board wins if a
    /// drawing somehow carries both.
    pub fn design(&self) -> Result<Design<'a>, EagleParseError> {
        [DesignKind::Board, DesignKind::Schematic]
            .into_iter()
            .find_map(|kind| {
                self.element
                    .child(kind.tag())
                    .map(|element| Design { kind, element })
            })
            .ok_or_else(|| EagleParseError::InvalidDesign(self.path.to_path_buf()))
    }

    pub fn library(&self) -> Result<&'a Element, EagleParseError> {
        self.element
            .child("library")
            .ok_or_else(|| EagleParseError::MissingElement {
                path: self.path.to_path_buf(),
                element: "library",
            })
    }
}

/// A board or schematic element together with its kind.
#[derive(Debug, Clone, Copy)]
pub struct Design<'a> {
    pub kind: DesignKind,
    pub element: &'a Element,
}

impl<'a> Design<'a> {
    /// Embedded library references in document order.
    pub fn libraries(&self) -> Vec<&'a Element> {
        self.element.find_all("libraries/library")
    }
}
