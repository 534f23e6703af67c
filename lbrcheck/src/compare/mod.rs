//! Comparison of embedded libraries against their library files.

pub mod collection;
pub mod oracle;

use std::fmt;

use serde::Serialize;

pub use collection::{diff_collection, Collection, Lookup, NameIndex};
pub use oracle::{canonical_string, items_equal, text_equal, trees_equal};

use crate::parser::xml::Element;

/// One difference between an embedded library and the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// The library description text differs.
    Description { library: String },
    /// A package, device set or symbol differs or is absent from the library file.
    Item {
        collection: Collection,
        name: String,
        library: String,
    },
    /// No file in the repository carries the library's name.
    MissingLibraryFile { library: String },
}

impl Mismatch {
    pub fn library(&self) -> &str {
        match self {
            Mismatch::Description { library }
            | Mismatch::Item { library, .. }
            | Mismatch::MissingLibraryFile { library } => library,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Description { library } => {
                write!(f, "the description of library \"{}\" is different", library)
            }
            Mismatch::Item {
                collection,
                name,
                library,
            } => write!(
                f,
                "{} \"{}\" in library \"{}\" is different",
                collection.item(),
                name,
                library
            ),
            Mismatch::MissingLibraryFile { library } => write!(
                f,
                "could not find a corresponding lbr file for library \"{}\"",
                library
            ),
        }
    }
}

/// Compare one embedded library against its authoritative copy: description
/// first, then every collection in `collections` order.
pub fn compare_library(
    embedded: &Element,
    authoritative: &Element,
    collections: &[Collection],
) -> Vec<Mismatch> {
    let library = embedded.attribute("name").unwrap_or_default();
    let mut mismatches = Vec::new();

    if !text_equal(
        embedded.child("description"),
        authoritative.child("description"),
    ) {
        mismatches.push(Mismatch::Description {
            library: library.to_string(),
        });
    }

    for &collection in collections {
        mismatches.extend(diff_collection(embedded, authoritative, collection, library));
    }

    mismatches
}
