//! Owned XML tree for EAGLE documents.
//!
//! Files are parsed with `roxmltree` and copied into an owned tree so that a
//! design document and the library documents it references can be held side
//! by side without borrowing from their source text. Only elements and text
//! survive the copy; comments and processing instructions are dropped.
//!
//! The [`fmt::Display`] impl of [`Element`] is the canonical serialization
//! used for equality checks: tag, attributes in document order, every text
//! node verbatim and all descendants in document order.

use std::fmt;
use std::ops::Deref;

use roxmltree::{Document, Node, ParsingOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlNode::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// First child element with the given tag.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// Child elements with the given tag, each paired with the text that
    /// follows its closing tag up to the next sibling element.
    pub fn children_with_tail<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Tailed<'a>> + 'a {
        self.children.iter().enumerate().filter_map(move |(i, node)| {
            let element = node.as_element().filter(|e| e.name == name)?;
            let tail = self.children.get(i + 1).and_then(XmlNode::as_text);
            Some(Tailed { element, tail })
        })
    }

    /// All elements matching a slash-separated path of tags relative to
    /// `self`, in document order (`"packages/package"`).
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|e| e.elements().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// Text content preceding the first child element, if any.
    pub fn text(&self) -> Option<&str> {
        self.children.first().and_then(XmlNode::as_text)
    }

    fn from_node(node: Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect();

        let mut children: Vec<XmlNode> = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(XmlNode::Element(Element::from_node(child)));
            } else if child.is_text() {
                let text = child.text().unwrap_or_default();
                // Entity references split text into several nodes; keep them as one run.
                match children.last_mut() {
                    Some(XmlNode::Text(previous)) => previous.push_str(text),
                    _ => children.push(XmlNode::Text(text.to_string())),
                }
            }
        }

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            children,
        }
    }
}

/// Parse XML text and return its root element.
///
/// DTD declarations are accepted because EAGLE files start with
/// `<!DOCTYPE eagle SYSTEM "eagle.dtd">`; the external DTD is never fetched.
pub fn parse_xml(text: &str) -> Result<Element, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;
    Ok(Element::from_node(document.root_element()))
}

/// An element together with its trailing text inside the parent.
///
/// Its `Display` writes the element followed by the escaped tail, so two
/// items that differ only in the whitespace after their closing tags
/// serialize differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tailed<'a> {
    pub element: &'a Element,
    pub tail: Option<&'a str>,
}

impl Deref for Tailed<'_> {
    type Target = Element;

    fn deref(&self) -> &Element {
        self.element
    }
}

impl fmt::Display for Tailed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)?;
        match self.tail {
            Some(tail) => escape_text(tail, f),
            None => Ok(()),
        }
    }
}

fn escape_text(text: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    Ok(())
}

fn escape_attribute(value: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' => f.write_str("&quot;")?,
            '\n' => f.write_str("&#10;")?,
            '\t' => f.write_str("&#09;")?,
            _ => write!(f, "{}", ch)?,
        }
    }
    Ok(())
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"", key)?;
            escape_attribute(value, f)?;
            f.write_str("\"")?;
        }

        if self.children.is_empty() {
            return f.write_str(" />");
        }

        f.write_str(">")?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => write!(f, "{}", element)?,
                XmlNode::Text(text) => escape_text(text, f)?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_attribute_order() {
        let root = parse_xml(r#"<smd name="1" x="-0.75" dx="0.9" layer="1"/>"#).unwrap();
        let keys: Vec<_> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "x", "dx", "layer"]);
        assert_eq!(root.attribute("dx"), Some("0.9"));
        assert_eq!(root.attribute("dy"), None);
    }

    #[test]
    fn test_parse_accepts_eagle_doctype() {
        let text = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
                    <!DOCTYPE eagle SYSTEM \"eagle.dtd\">\n\
                    <eagle version=\"7.2.0\"><drawing/></eagle>";
        let root = parse_xml(text).unwrap();
        assert_eq!(root.name, "eagle");
        assert!(root.child("drawing").is_some());
    }

    #[test]
    fn test_parse_drops_comments() {
        let root = parse_xml("<a><!-- note --><b/></a>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.to_string(), "<a><b /></a>");
    }

    #[test]
    fn test_entities_merge_into_one_text_run() {
        let root = parse_xml("<text>&gt;NAME</text>").unwrap();
        assert_eq!(root.text(), Some(">NAME"));
        assert_eq!(root.to_string(), "<text>&gt;NAME</text>");
    }

    #[test]
    fn test_find_all_follows_path() {
        let root = parse_xml(
            "<library><packages><package name=\"A\"/><package name=\"B\"/></packages>\
             <symbols><symbol name=\"S\"/></symbols></library>",
        )
        .unwrap();
        let names: Vec<_> = root
            .find_all("packages/package")
            .iter()
            .filter_map(|p| p.attribute("name"))
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(root.find("devicesets/deviceset").is_none());
    }

    #[test]
    fn test_display_includes_whitespace_text() {
        let root = parse_xml("<package name=\"R\">\n<wire width=\"0.1\"/>\n</package>").unwrap();
        assert_eq!(
            root.to_string(),
            "<package name=\"R\">\n<wire width=\"0.1\" />\n</package>"
        );
    }

    #[test]
    fn test_children_with_tail_pairs_trailing_text() {
        let root = parse_xml("<packages>\n<package name=\"A\"/>  <package name=\"B\"/></packages>")
            .unwrap();
        let items: Vec<_> = root.children_with_tail("package").collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attribute("name"), Some("A"));
        assert_eq!(items[0].tail, Some("  "));
        assert_eq!(items[1].tail, None);
        assert_eq!(items[0].to_string(), "<package name=\"A\" />  ");
    }

    #[test]
    fn test_find_all_with_borrowed_path() {
        let root = parse_xml("<board><libraries><library name=\"a\"/></libraries></board>").unwrap();
        let path = String::from("libraries/library");
        let found = root.find_all(&path);
        drop(path);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attribute("name"), Some("a"));
    }

    #[test]
    fn test_text_is_none_when_first_child_is_element() {
        let element = Element::new("description").with_child(Element::new("b"));
        assert_eq!(element.text(), None);
        let element = Element::new("description").with_text("Resistors");
        assert_eq!(element.text(), Some("Resistors"));
    }

    #[test]
    fn test_malformed_input_is_error() {
        assert!(parse_xml("<eagle><drawing></eagle>").is_err());
    }
}
