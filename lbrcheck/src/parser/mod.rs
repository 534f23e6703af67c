pub mod eagle;
pub mod xml;

// Re-export for convenience
pub use eagle::{DesignKind, Design, Drawing, EagleDocument, EagleParseError};
pub use xml::{parse_xml, Element, Tailed, XmlNode};
