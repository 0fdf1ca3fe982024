//! The traversal protocol [`Document::accept`](crate::Document::accept)
//! drives: entry/exit callbacks per node kind, each returning `bool` to
//! control further descent.
//!
//! The reference engine this is modeled on dispatches through virtual
//! methods on each node type (true double dispatch: the node picks which
//! `Visitor` method to call, and the visitor decides whether to recurse).
//! Here the dispatch collapses into one function on [`Document`] that
//! matches on [`crate::NodeKind`] — `Document` owns every node's storage,
//! so there's no per-node object to hang a virtual call off of — but the
//! contract callers see is the same: implement the hooks you care about,
//! return `true` to keep descending.
//!
//! Leaf data is handed to each hook as an owned `&str`/`&[(String,
//! String)]` snapshot rather than a live handle into the document, so a
//! visitor can't be fighting the document's own borrow while it runs.

/// Depth-first traversal hooks over a [`crate::Document`].
///
/// Every method has a default that returns `true` (visit everything); a
/// visitor that only cares about, say, elements can override just
/// `element_enter`.
pub trait Visitor {
    /// Called once before the first top-level node. Returning `false`
    /// skips the whole document (still followed by `document_exit`).
    fn document_enter(&mut self) -> bool {
        true
    }

    /// Called once after the last top-level node (or immediately, if
    /// `document_enter` returned `false`).
    fn document_exit(&mut self) -> bool {
        true
    }

    /// Called on entering an element, before its children. `attributes` is
    /// given in source (or insertion) order. Returning `false` skips this
    /// element's children (but `element_exit` still runs).
    fn element_enter(&mut self, name: &str, attributes: &[(String, String)]) -> bool {
        let _ = (name, attributes);
        true
    }

    /// Called on leaving an element, after its children (or immediately,
    /// if `element_enter` returned `false`).
    fn element_exit(&mut self, name: &str) -> bool {
        let _ = name;
        true
    }

    /// Called on a text node. `cdata` is true if it was parsed from (or
    /// should print as) a `<![CDATA[ ]]>` section.
    fn text(&mut self, value: &str, cdata: bool) -> bool {
        let _ = (value, cdata);
        true
    }

    /// Called on a comment node.
    fn comment(&mut self, value: &str) -> bool {
        let _ = value;
        true
    }

    /// Called on a declaration node (e.g. `<?xml ...?>`).
    fn declaration(&mut self, value: &str) -> bool {
        let _ = value;
        true
    }

    /// Called on an unrecognized `<! ... >` construct.
    fn unknown(&mut self, value: &str) -> bool {
        let _ = value;
        true
    }
}
