//! Per-item comparison of library sub-collections.
//!
//! Only items present in the embedded copy are checked. Items that exist
//! only in the authoritative library are never reported: a design embeds
//! just the parts it uses.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::compare::oracle::items_equal;
use crate::compare::Mismatch;
use crate::parser::xml::{Element, Tailed};

/// A named sub-collection of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Packages,
    Devicesets,
    Symbols,
}

impl Collection {
    pub fn container(self) -> &'static str {
        match self {
            Collection::Packages => "packages",
            Collection::Devicesets => "devicesets",
            Collection::Symbols => "symbols",
        }
    }

    /// Tag of a single item; also the label used in diagnostics.
    pub fn item(self) -> &'static str {
        match self {
            Collection::Packages => "package",
            Collection::Devicesets => "deviceset",
            Collection::Symbols => "symbol",
        }
    }

    /// Items of this collection in `library`, in document order, each with
    /// the text that follows it inside its container.
    pub fn items(self, library: &Element) -> Vec<Tailed<'_>> {
        library
            .children_named(self.container())
            .flat_map(|container| container.children_with_tail(self.item()))
            .collect()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container())
    }
}

/// Outcome of a name lookup in a [`NameIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(Tailed<'a>),
    Missing,
}

impl<'a> Lookup<'a> {
    pub fn item(self) -> Option<Tailed<'a>> {
        match self {
            Lookup::Found(item) => Some(item),
            Lookup::Missing => None,
        }
    }

    pub fn element(self) -> Option<&'a Element> {
        self.item().map(|item| item.element)
    }
}

/// Name → element map over one collection of a library.
#[derive(Debug)]
pub struct NameIndex<'a> {
    by_name: HashMap<&'a str, Tailed<'a>>,
}

impl<'a> NameIndex<'a> {
    /// Index every item of `collection` in `library`. When names repeat the
    /// first occurrence wins.
    pub fn build(library: &'a Element, collection: Collection) -> Self {
        let mut by_name = HashMap::new();
        for item in collection.items(library) {
            by_name.entry(item_name(item.element)).or_insert(item);
        }
        Self { by_name }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Lookup<'a> {
        match self.by_name.get(name) {
            Some(item) => Lookup::Found(*item),
            None => Lookup::Missing,
        }
    }
}

fn item_name(item: &Element) -> &str {
    item.attribute("name").unwrap_or_default()
}

/// Compare every embedded item of `collection` against `authoritative`.
///
/// Returns one [`Mismatch::Item`] per embedded item that is missing from the
/// authoritative library or differs from it, in embedded document order.
pub fn diff_collection(
    embedded: &Element,
    authoritative: &Element,
    collection: Collection,
    library_name: &str,
) -> Vec<Mismatch> {
    let index = NameIndex::build(authoritative, collection);

    collection
        .items(embedded)
        .into_iter()
        .filter(|item| !items_equal(*item, index.lookup(item_name(item.element)).item()))
        .map(|item| Mismatch::Item {
            collection,
            name: item_name(item.element).to_string(),
            library: library_name.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::parse_xml;

    const AUTHORITATIVE: &str = r#"<library>
<packages>
<package name="R0603"><smd name="1" dx="0.9"/></package>
<package name="C0603"><smd name="1" dx="0.8"/></package>
<package name="SOT23"><smd name="1" dx="0.6"/></package>
</packages>
<symbols>
<symbol name="R"><pin name="1"/></symbol>
</symbols>
</library>"#;

    #[test]
    fn test_index_lookup() {
        let library = parse_xml(AUTHORITATIVE).unwrap();
        let index = NameIndex::build(&library, Collection::Packages);
        assert_eq!(index.len(), 3);
        assert!(matches!(index.lookup("C0603"), Lookup::Found(e) if e.attribute("name") == Some("C0603")));
        assert_eq!(index.lookup("R0805"), Lookup::Missing);
        assert!(NameIndex::build(&library, Collection::Devicesets).is_empty());
    }

    #[test]
    fn test_index_first_duplicate_wins() {
        let library = parse_xml(
            r#"<library><symbols><symbol name="R" v="1"/><symbol name="R" v="2"/></symbols></library>"#,
        )
        .unwrap();
        let index = NameIndex::build(&library, Collection::Symbols);
        assert_eq!(index.len(), 1);
        let found = index.lookup("R").element().unwrap();
        assert_eq!(found.attribute("v"), Some("1"));
    }

    #[test]
    fn test_identical_subset_has_no_mismatches() {
        let library = parse_xml(AUTHORITATIVE).unwrap();
        let embedded = parse_xml(
            r#"<library name="lowpass"><packages>
<package name="R0603"><smd name="1" dx="0.9"/></package>
</packages></library>"#,
        )
        .unwrap();
        let mismatches = diff_collection(&embedded, &library, Collection::Packages, "lowpass");
        assert!(mismatches.is_empty());
    }

    #[test]
    fn test_changed_and_unknown_items_are_reported_in_order() {
        let library = parse_xml(AUTHORITATIVE).unwrap();
        let embedded = parse_xml(
            r#"<library name="lowpass"><packages>
<package name="R0805"><smd name="1" dx="1.2"/></package>
<package name="C0603"><smd name="1" dx="0.8"/></package>
<package name="R0603"><smd name="1" dx="1.0"/></package>
</packages></library>"#,
        )
        .unwrap();
        let mismatches = diff_collection(&embedded, &library, Collection::Packages, "lowpass");
        let names: Vec<_> = mismatches
            .iter()
            .map(|m| match m {
                Mismatch::Item { name, .. } => name.as_str(),
                other => panic!("unexpected mismatch {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["R0805", "R0603"]);
        assert_eq!(
            mismatches[1].to_string(),
            r#"package "R0603" in library "lowpass" is different"#
        );
    }

    #[test]
    fn test_whitespace_after_item_is_compared() {
        let library = parse_xml(
            "<library><packages><package name=\"P1\"><smd dx=\"1\"/></package>\n</packages></library>",
        )
        .unwrap();
        let embedded = parse_xml(
            "<library name=\"parts\"><packages><package name=\"P1\"><smd dx=\"1\"/></package>    </packages></library>",
        )
        .unwrap();
        let mismatches = diff_collection(&embedded, &library, Collection::Packages, "parts");
        assert_eq!(
            mismatches.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![r#"package "P1" in library "parts" is different"#]
        );
    }

    #[test]
    fn test_extra_authoritative_items_are_ignored() {
        let library = parse_xml(AUTHORITATIVE).unwrap();
        let embedded = parse_xml(r#"<library name="lowpass"><symbols/></library>"#).unwrap();
        assert!(diff_collection(&embedded, &library, Collection::Symbols, "lowpass").is_empty());
        assert!(diff_collection(&embedded, &library, Collection::Packages, "lowpass").is_empty());
    }

    #[test]
    fn test_collection_labels() {
        assert_eq!(Collection::Devicesets.container(), "devicesets");
        assert_eq!(Collection::Devicesets.item(), "deviceset");
        assert_eq!(Collection::Symbols.to_string(), "symbols");
    }
}
