//! Error kinds and the diagnostic a [`crate::Document`] latches on parse failure.

use std::fmt;

/// The stable taxonomy of parse-failure kinds.
///
/// The name table here is part of the crate's public contract: callers may
/// match on these variants and expect them not to be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ErrorId {
    /// Could not open or read the requested file.
    #[error("file not found")]
    FileNotFound,
    /// The file exists but could not be opened (permissions, device error, ...).
    #[error("file could not be opened")]
    FileCouldNotBeOpened,
    /// An I/O error occurred while reading an opened file.
    #[error("file read error")]
    FileReadError,
    /// An element's name or attribute list could not be parsed.
    #[error("error parsing element")]
    ParsingElement,
    /// An attribute's name, `=`, or quoted value could not be parsed, or the
    /// same attribute name appeared twice on one element.
    #[error("error parsing attribute")]
    ParsingAttribute,
    /// Text content ran to end-of-input before its terminator.
    #[error("error parsing text")]
    ParsingText,
    /// A `<![CDATA[` section ran to end-of-input before `]]>`.
    #[error("error parsing CDATA")]
    ParsingCdata,
    /// A `<!--` comment ran to end-of-input before `-->`.
    #[error("error parsing comment")]
    ParsingComment,
    /// A `<?` declaration ran to end-of-input before `?>`, or a declaration
    /// appeared after non-declaration content at the document level.
    #[error("error parsing declaration")]
    ParsingDeclaration,
    /// A `<!` unknown/DOCTYPE-like construct ran to end-of-input before `>`.
    #[error("error parsing unknown construct")]
    ParsingUnknown,
    /// The input contained no payload at all (after BOM/whitespace skip).
    #[error("empty document")]
    EmptyDocument,
    /// A closing tag's name didn't match its opening tag, or an opening tag
    /// never found a matching close.
    #[error("mismatched element")]
    MismatchedElement,
    /// A generic parse failure with no more specific kind available.
    #[error("error parsing")]
    Parsing,
    /// Element nesting exceeded [`crate::MAX_ELEMENT_DEPTH`].
    #[error("element nesting too deep")]
    ElementDepthExceeded,
}

/// The diagnostic a [`crate::Document`] records when a parse fails: the
/// [`ErrorId`], the 1-based source line it occurred on, and an optional
/// free-form detail string (e.g. the element name involved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Which kind of failure occurred.
    pub id: ErrorId,
    /// 1-based line number the failure was detected on.
    pub line: u32,
    /// Optional extra context, e.g. `"element name=foo"`.
    pub detail: Option<String>,
}

impl ParseError {
    pub(crate) fn new(id: ErrorId, line: u32, detail: Option<String>) -> Self {
        ParseError { id, line, detail }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} at line {}: {}", self.id, self.line, detail),
            None => write!(f, "{} at line {}", self.id, self.line),
        }
    }
}

impl std::error::Error for ParseError {}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, ParseError>;
