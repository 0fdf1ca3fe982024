//! `picoxml` is a compact XML 1.0 document engine for embedded and
//! small-footprint use: configuration files, save-games, data interchange.
//!
//! It is built around three tightly coupled pieces:
//!
//! - a lazy, in-place string slot ([`strpair::StrPair`]) that owns or
//!   borrows a byte range of the parse buffer and defers newline
//!   normalization, entity decoding, and whitespace collapsing until the
//!   text is actually read,
//! - a single-pass, destructive-buffer recursive-descent parser
//!   ([`parser`]) that mutates the input bytes in place as it decodes them,
//! - an in-memory arena-backed tree ([`Document`]) with a
//!   visitor-driven printer ([`printer::Printer`]).
//!
//! There is no DTD validation, no XSD, no XPath, and no namespace
//! processing: this engine targets documents where those features are
//! unnecessary weight.
//!
//! # Example
//!
//! ```
//! use picoxml::Document;
//!
//! let mut doc = Document::parse_str("<r a=\"1\"><b/></r>").unwrap();
//! let root = doc.root_element().unwrap();
//! assert_eq!(doc.element_name(root), "r");
//! assert_eq!(doc.attribute(root, "a"), Some("1"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod charclass;
mod convert;
mod entity;
mod error;
mod node;
mod parser;
mod pool;
mod printer;
mod strpair;
mod visitor;

pub use crate::convert::QueryError;
pub use crate::error::{ErrorId, ParseError, Result};
pub use crate::node::{
    AttributeId, AttributeIds, ClosingType, Document, Element, NodeId, NodeKind,
};
pub use crate::printer::Printer;
pub use crate::visitor::Visitor;

/// Maximum element nesting depth a parse will accept before latching
/// [`ErrorId::ElementDepthExceeded`].
///
/// This mirrors the fixed ceiling tinyxml2-style engines use to bound
/// recursion on adversarial input; it is not configurable because raising it
/// re-opens the stack-exhaustion risk the ceiling exists to close.
pub const MAX_ELEMENT_DEPTH: u32 = 100;

/// How an element's text content is treated during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitespaceMode {
    /// Keep whitespace runs inside text nodes exactly as written.
    PreserveWhitespace,
    /// Collapse runs of whitespace to a single space, trimming leading and
    /// trailing whitespace, as text is read.
    CollapseWhitespace,
}

impl Default for WhitespaceMode {
    fn default() -> Self {
        WhitespaceMode::PreserveWhitespace
    }
}

/// Construction-time options for a [`Document`].
///
/// These are the two parse-time knobs spec'd at the external-interface
/// level: whitespace policy and whether entity/character-reference decoding
/// runs at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Whitespace collapsing policy applied to text nodes.
    pub whitespace_mode: WhitespaceMode,
    /// Whether named entities and numeric character references are decoded.
    ///
    /// When `false`, text and attribute values are copied verbatim except
    /// for newline normalization.
    pub process_entities: bool,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            whitespace_mode: WhitespaceMode::PreserveWhitespace,
            process_entities: true,
        }
    }
}
