//! Exact equality of XML subtrees.
//!
//! Two subtrees are equal when their canonical serializations are equal byte
//! for byte. Attribute order, attribute formatting, whitespace in text nodes
//! and child order all count. Collection items also carry the text after
//! their closing tag.

use crate::parser::xml::{Element, Tailed};

/// Canonical serialization of an element and its descendants.
pub fn canonical_string(element: &Element) -> String {
    element.to_string()
}

/// Compare an embedded element against its authoritative counterpart.
///
/// A missing counterpart is never equal.
pub fn trees_equal(embedded: &Element, authoritative: Option<&Element>) -> bool {
    match authoritative {
        Some(authoritative) => canonical_string(embedded) == canonical_string(authoritative),
        None => false,
    }
}

/// Compare an embedded collection item, trailing text included, against
/// its authoritative counterpart. A missing counterpart is never equal.
pub fn items_equal(embedded: Tailed<'_>, authoritative: Option<Tailed<'_>>) -> bool {
    match authoritative {
        Some(authoritative) => embedded.to_string() == authoritative.to_string(),
        None => false,
    }
}

/// Compare the leading text of two optional elements. Two absent texts are
/// equal.
pub fn text_equal(first: Option<&Element>, second: Option<&Element>) -> bool {
    first.and_then(Element::text) == second.and_then(Element::text)
}
