//! Namespace URIs and the prefixes used when new elements are created.
//!
//! Every component refers to these constants; nothing declares its own
//! prefix table.

pub const WML: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const WPD: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
pub const DML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const MC: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
pub const W14: &str = "http://schemas.microsoft.com/office/word/2010/wordml";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Canonical prefix for each namespace the crate writes into.
pub const PREFIXES: &[(&str, &str)] = &[
    ("w", WML),
    ("r", REL),
    ("wp", WPD),
    ("a", DML),
    ("w14", W14),
    ("xml", XML),
    ("mc", MC),
    ("o", "urn:schemas-microsoft-com:office:office"),
    ("v", "urn:schemas-microsoft-com:vml"),
    ("w10", "urn:schemas-microsoft-com:office:word"),
    ("w15", "http://schemas.microsoft.com/office/word/2012/wordml"),
    ("wne", "http://schemas.microsoft.com/office/word/2006/wordml"),
    ("wps", "http://schemas.microsoft.com/office/word/2010/wordprocessingShape"),
];

pub fn prefix_for(uri: &str) -> Option<&'static str> {
    PREFIXES
        .iter()
        .find(|(_, u)| *u == uri)
        .map(|(p, _)| *p)
}
