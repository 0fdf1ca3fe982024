//! The document tree: node variants, sibling/child links, the per-variant
//! arena pools that own them, and the tree-mutation operations from
//! spec §4.3.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::convert::{self, QueryError};
use crate::error::{ErrorId, ParseError, Result};
use crate::pool::Pool;
use crate::strpair::StrPair;
use crate::{DocumentConfig, WhitespaceMode};

/// Identifies a single node in a [`Document`]'s arena.
///
/// A `NodeId` is only meaningful against the `Document` that produced it.
/// Every variant carries the id of its owning `Document` alongside the pool
/// index, so a foreign id can be recognized as foreign — and rejected by
/// every tree-mutating operation — without ever indexing into the wrong
/// document's pools (see [`Document::same_document`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Indexes the owning document's element pool.
    Element(u64, u32),
    /// Indexes the owning document's text pool.
    Text(u64, u32),
    /// Indexes the owning document's shared comment/declaration/unknown pool.
    Misc(u64, u32),
}

/// The logical kind of a node, independent of which pool backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `<name attr="value">...</name>` or `<name/>`.
    Element,
    /// Character data, possibly inside `<![CDATA[...]]>`.
    Text,
    /// `<!-- ... -->`.
    Comment,
    /// `<? ... ?>`.
    Declaration,
    /// `<! ... >` (e.g. a DOCTYPE-like construct this engine doesn't parse further).
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MiscKind {
    Comment,
    Declaration,
    Unknown,
}

/// Which closing form an element was parsed (or constructed) with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingType {
    /// `<t>...</t>` — has (or awaits) a separate close tag.
    Open,
    /// `<t/>` — self-closed, no children possible.
    Closed,
    /// A transient `</t>` close-tag token, handed up to the parent parse
    /// level and then discarded. Never observed outside the parser.
    Closing,
}

/// Identifies a single attribute in a [`Document`]'s attribute pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId(pub(crate) u32);

#[derive(Debug, Clone)]
struct AttributeData {
    name: StrPair,
    value: StrPair,
    next: Option<AttributeId>,
    line: u32,
}

/// A lightweight, `Copy` handle that asserts "this `NodeId` denotes an
/// `Element`". Obtained from [`Document::root_element`],
/// [`Document::new_element`], or by matching [`Document::node_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element(NodeId);

impl Element {
    /// The underlying node id.
    pub fn id(self) -> NodeId {
        self.0
    }
}

/// Where a node's parent-of-record is: the document root, or another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parent {
    Root,
    Node(NodeId),
}

#[derive(Debug, Clone)]
struct Common {
    parent: Option<Parent>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    line: u32,
    user_data: i64,
}

impl Common {
    fn new(line: u32) -> Self {
        Common {
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            line,
            user_data: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    common: Common,
    name: StrPair,
    first_attr: Option<AttributeId>,
    closing: ClosingType,
}

#[derive(Debug, Clone)]
struct TextData {
    common: Common,
    value: StrPair,
    cdata: bool,
}

#[derive(Debug, Clone)]
struct MiscData {
    common: Common,
    value: StrPair,
    kind: MiscKind,
}

static NEXT_DOC_ID: AtomicU64 = AtomicU64::new(1);

/// The root container: owns the parse buffer, the four arena pools, and
/// the top-level (document-level) child list.
///
/// A `Document` behaves as the implicit parent of every top-level node
/// (declarations, comments, the single root element, ...); it is not
/// itself addressable as a [`NodeId`].
pub struct Document {
    id: u64,
    buf: Vec<u8>,
    bom: bool,
    whitespace_mode: WhitespaceMode,
    process_entities: bool,

    elements: Pool<ElementData>,
    texts: Pool<TextData>,
    misc: Pool<MiscData>,
    attrs: Pool<AttributeData>,

    root_first: Option<NodeId>,
    root_last: Option<NodeId>,

    /// Nodes allocated but not (currently) attached to the tree.
    /// See [`Document::unlink`] for the one documented gap in this
    /// bookkeeping, inherited from the system this engine is modeled on.
    unlinked: Vec<NodeId>,

    error: Option<ParseError>,
    cur_line: u32,
    depth: u32,
}

impl Document {
    /// A new, empty document with the given parse-time configuration.
    pub fn new(config: DocumentConfig) -> Self {
        Document {
            id: NEXT_DOC_ID.fetch_add(1, Ordering::Relaxed),
            buf: Vec::new(),
            bom: false,
            whitespace_mode: config.whitespace_mode,
            process_entities: config.process_entities,
            elements: Pool::new(),
            texts: Pool::new(),
            misc: Pool::new(),
            attrs: Pool::new(),
            root_first: None,
            root_last: None,
            unlinked: Vec::new(),
            error: None,
            cur_line: 1,
            depth: 0,
        }
    }

    /// Parse `text` with the default configuration. The input is copied
    /// into an owned buffer the document then mutates in place.
    pub fn parse_str(text: &str) -> Result<Document> {
        Document::parse_str_with(text, DocumentConfig::default())
    }

    /// Parse `text` with an explicit configuration.
    pub fn parse_str_with(text: &str, config: DocumentConfig) -> Result<Document> {
        let mut doc = Document::new(config);
        doc.parse(text.as_bytes().to_vec())?;
        Ok(doc)
    }

    /// Parse an owned, mutable byte buffer, replacing any existing content.
    /// This is the "destructive buffer" entry point: `buf` is mutated in
    /// place and becomes the document's backing storage.
    pub fn parse(&mut self, buf: Vec<u8>) -> Result<()> {
        crate::parser::parse(self, buf)
    }

    /// Discard all children, all unlinked nodes, and the parse buffer,
    /// resetting every pool and clearing any latched error.
    pub fn clear(&mut self) {
        let mut child = self.root_first;
        while let Some(id) = child {
            let next = self.common(id).next_sibling;
            self.free_subtree(id);
            child = next;
        }
        self.root_first = None;
        self.root_last = None;
        for id in std::mem::take(&mut self.unlinked) {
            self.free_subtree(id);
        }
        self.elements.clear();
        self.texts.clear();
        self.misc.clear();
        self.attrs.clear();
        self.buf.clear();
        self.bom = false;
        self.error = None;
        self.cur_line = 1;
        self.depth = 0;
    }

    // ---- configuration / state accessors ----

    /// Whether a UTF-8 BOM was seen on input (or requested for output).
    pub fn bom(&self) -> bool {
        self.bom
    }

    /// Set whether a BOM should be emitted on output / was seen on input.
    pub fn set_bom(&mut self, bom: bool) {
        self.bom = bom;
    }

    /// The configured whitespace policy.
    pub fn whitespace_mode(&self) -> WhitespaceMode {
        self.whitespace_mode
    }

    /// Whether entity/character-reference decoding is enabled.
    pub fn process_entities(&self) -> bool {
        self.process_entities
    }

    /// The latched parse error, if any. At most one error is ever latched
    /// per parse; later failures within the same parse do not overwrite
    /// the first.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub(crate) fn set_error(&mut self, id: ErrorId, line: u32, detail: Option<String>) {
        if self.error.is_none() {
            log::warn!("picoxml: {:?} at line {}", id, line);
            self.error = Some(ParseError::new(id, line, detail));
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn cur_line(&self) -> u32 {
        self.cur_line
    }

    pub(crate) fn set_cur_line(&mut self, line: u32) {
        self.cur_line = line;
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    pub(crate) fn inc_depth(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dec_depth(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn buf(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn buf_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    // ---- node kind / common-field plumbing ----

    /// The logical kind of `id`.
    pub fn node_kind(&self, id: NodeId) -> NodeKind {
        match id {
            NodeId::Element(_, _) => NodeKind::Element,
            NodeId::Text(_, _) => NodeKind::Text,
            NodeId::Misc(_, idx) => match self.misc.get(idx).kind {
                MiscKind::Comment => NodeKind::Comment,
                MiscKind::Declaration => NodeKind::Declaration,
                MiscKind::Unknown => NodeKind::Unknown,
            },
        }
    }

    /// If `id` is an [`NodeKind::Element`], the typed handle for it.
    pub fn as_element(&self, id: NodeId) -> Option<Element> {
        match id {
            NodeId::Element(_, _) => Some(Element(id)),
            _ => None,
        }
    }

    /// The line this node's first significant character was parsed on (or,
    /// for constructed nodes, the line at construction time).
    pub fn node_line(&self, id: NodeId) -> u32 {
        self.common(id).line
    }

    /// An opaque, user-settable integer slot on every node.
    pub fn user_data(&self, id: NodeId) -> i64 {
        self.common(id).user_data
    }

    /// Set the opaque user-data slot on a node.
    pub fn set_user_data(&mut self, id: NodeId, value: i64) {
        self.common_mut(id).user_data = value;
    }

    fn common(&self, id: NodeId) -> &Common {
        match id {
            NodeId::Element(_, i) => &self.elements.get(i).common,
            NodeId::Text(_, i) => &self.texts.get(i).common,
            NodeId::Misc(_, i) => &self.misc.get(i).common,
        }
    }

    fn common_mut(&mut self, id: NodeId) -> &mut Common {
        match id {
            NodeId::Element(_, i) => &mut self.elements.get_mut(i).common,
            NodeId::Text(_, i) => &mut self.texts.get_mut(i).common,
            NodeId::Misc(_, i) => &mut self.misc.get_mut(i).common,
        }
    }

    /// This node's parent element, or `None` if it's top-level or unlinked.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self.common(id).parent {
            Some(Parent::Node(p)) => Some(p),
            _ => None,
        }
    }

    /// This node's previous sibling.
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.common(id).prev_sibling
    }

    /// This node's next sibling.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.common(id).next_sibling
    }

    /// This node's first child, if any (always `None` for non-elements).
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.common(id).first_child
    }

    /// This node's last child, if any.
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.common(id).last_child
    }

    /// The document's first top-level node.
    pub fn first_node(&self) -> Option<NodeId> {
        self.root_first
    }

    /// The document's last top-level node.
    pub fn last_node(&self) -> Option<NodeId> {
        self.root_last
    }

    /// The first top-level `Element` — the document's root element, if
    /// parsing or construction has produced one.
    pub fn root_element(&self) -> Option<Element> {
        let mut cur = self.root_first;
        while let Some(id) = cur {
            if let NodeId::Element(_, _) = id {
                return Some(Element(id));
            }
            cur = self.common(id).next_sibling;
        }
        None
    }

    fn first_child_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Root => self.root_first,
            Parent::Node(id) => self.common(id).first_child,
        }
    }

    fn last_child_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Root => self.root_last,
            Parent::Node(id) => self.common(id).last_child,
        }
    }

    fn set_first_child_of(&mut self, parent: Parent, v: Option<NodeId>) {
        match parent {
            Parent::Root => self.root_first = v,
            Parent::Node(id) => self.common_mut(id).first_child = v,
        }
    }

    fn set_last_child_of(&mut self, parent: Parent, v: Option<NodeId>) {
        match parent {
            Parent::Root => self.root_last = v,
            Parent::Node(id) => self.common_mut(id).last_child = v,
        }
    }

    fn same_document(&self, id: NodeId) -> bool {
        match id {
            NodeId::Element(doc, _) | NodeId::Text(doc, _) | NodeId::Misc(doc, _) => doc == self.id,
        }
    }

    // ---- allocation ----

    pub(crate) fn alloc_unlinked_element(&mut self, line: u32) -> NodeId {
        let data = ElementData {
            common: Common::new(line),
            name: StrPair::empty(),
            first_attr: None,
            closing: ClosingType::Open,
        };
        let idx = self.elements.alloc(data);
        let id = NodeId::Element(self.id, idx);
        self.unlinked.push(id);
        id
    }

    pub(crate) fn alloc_unlinked_text(&mut self, line: u32, cdata: bool) -> NodeId {
        let data = TextData { common: Common::new(line), value: StrPair::empty(), cdata };
        let idx = self.texts.alloc(data);
        let id = NodeId::Text(self.id, idx);
        self.unlinked.push(id);
        id
    }

    fn alloc_unlinked_misc(&mut self, line: u32, kind: MiscKind) -> NodeId {
        let data = MiscData { common: Common::new(line), value: StrPair::empty(), kind };
        let idx = self.misc.alloc(data);
        let id = NodeId::Misc(self.id, idx);
        self.unlinked.push(id);
        id
    }

    pub(crate) fn alloc_unlinked_comment(&mut self, line: u32) -> NodeId {
        self.alloc_unlinked_misc(line, MiscKind::Comment)
    }

    pub(crate) fn alloc_unlinked_declaration(&mut self, line: u32) -> NodeId {
        self.alloc_unlinked_misc(line, MiscKind::Declaration)
    }

    pub(crate) fn alloc_unlinked_unknown(&mut self, line: u32) -> NodeId {
        self.alloc_unlinked_misc(line, MiscKind::Unknown)
    }

    /// Create a new, unlinked `Element` with the given tag name. The
    /// returned node is tracked in the document's unlinked set until
    /// inserted (see [`Document::insert_end_child`]); [`Document::clear`]
    /// frees it even if it's never attached.
    pub fn new_element(&mut self, name: &str) -> Element {
        let id = self.alloc_unlinked_element(0);
        if let NodeId::Element(_, i) = id {
            self.elements.get_mut(i).name.set_owned(name);
        }
        Element(id)
    }

    /// Create a new, unlinked text node.
    pub fn new_text(&mut self, value: &str) -> NodeId {
        let id = self.alloc_unlinked_text(0, false);
        if let NodeId::Text(_, i) = id {
            self.texts.get_mut(i).value.set_owned(value);
        }
        id
    }

    /// Create a new, unlinked comment node.
    pub fn new_comment(&mut self, value: &str) -> NodeId {
        let id = self.alloc_unlinked_comment(0);
        if let NodeId::Misc(_, i) = id {
            self.misc.get_mut(i).value.set_owned(value);
        }
        id
    }

    /// Create a new, unlinked declaration node. `text` defaults to
    /// `xml version="1.0" encoding="UTF-8"` when `None`.
    pub fn new_declaration(&mut self, text: Option<&str>) -> NodeId {
        let id = self.alloc_unlinked_declaration(0);
        if let NodeId::Misc(_, i) = id {
            self.misc.get_mut(i).value.set_owned(text.unwrap_or("xml version=\"1.0\" encoding=\"UTF-8\""));
        }
        id
    }

    /// Create a new, unlinked unknown-construct node.
    pub fn new_unknown(&mut self, value: &str) -> NodeId {
        let id = self.alloc_unlinked_unknown(0);
        if let NodeId::Misc(_, i) = id {
            self.misc.get_mut(i).value.set_owned(value);
        }
        id
    }

    // ---- tree mutation (spec §4.3) ----

    fn insert_child_preamble(&mut self, parent: Parent, node: NodeId) {
        if self.common(node).parent.is_some() {
            self.detach(node);
        } else if let Some(pos) = self.unlinked.iter().position(|&n| n == node) {
            self.unlinked.swap_remove(pos);
        }
    }

    /// Splice `node` out of whatever sibling list it's currently in and
    /// clear its parent/sibling pointers. Does not free it, and does not
    /// re-add it to the unlinked set: the caller must reinsert it or
    /// delete it (calling [`Document::clear`] without doing either leaks
    /// the node's pool slot — a documented hazard inherited from the
    /// reference engine this is modeled on, not an oversight).
    pub fn unlink(&mut self, node: NodeId) -> bool {
        if !self.same_document(node) {
            return false;
        }
        self.detach(node);
        true
    }

    fn detach(&mut self, node: NodeId) {
        let parent = match self.common(node).parent {
            Some(p) => p,
            None => return,
        };
        let prev = self.common(node).prev_sibling;
        let next = self.common(node).next_sibling;

        if self.first_child_of(parent) == Some(node) {
            self.set_first_child_of(parent, next);
        }
        if self.last_child_of(parent) == Some(node) {
            self.set_last_child_of(parent, prev);
        }
        if let Some(p) = prev {
            self.common_mut(p).next_sibling = next;
        }
        if let Some(n) = next {
            self.common_mut(n).prev_sibling = prev;
        }

        let c = self.common_mut(node);
        c.parent = None;
        c.prev_sibling = None;
        c.next_sibling = None;
    }

    fn splice_end(&mut self, parent: Parent, node: NodeId) {
        self.insert_child_preamble(parent, node);
        match self.last_child_of(parent) {
            Some(last) => {
                self.common_mut(last).next_sibling = Some(node);
                let c = self.common_mut(node);
                c.prev_sibling = Some(last);
                c.next_sibling = None;
            }
            None => {
                let c = self.common_mut(node);
                c.prev_sibling = None;
                c.next_sibling = None;
                self.set_first_child_of(parent, Some(node));
            }
        }
        self.set_last_child_of(parent, Some(node));
        self.common_mut(node).parent = Some(parent);
    }

    fn splice_first(&mut self, parent: Parent, node: NodeId) {
        self.insert_child_preamble(parent, node);
        match self.first_child_of(parent) {
            Some(first) => {
                self.common_mut(first).prev_sibling = Some(node);
                let c = self.common_mut(node);
                c.next_sibling = Some(first);
                c.prev_sibling = None;
            }
            None => {
                let c = self.common_mut(node);
                c.prev_sibling = None;
                c.next_sibling = None;
                self.set_last_child_of(parent, Some(node));
            }
        }
        self.set_first_child_of(parent, Some(node));
        self.common_mut(node).parent = Some(parent);
    }

    /// Insert `node` as the last child of `el`, or as the document's last
    /// top-level node when `el` is `None`. Returns `false` (no-op) if
    /// `node` belongs to a different `Document`.
    pub fn insert_end_child(&mut self, el: Option<Element>, node: NodeId) -> bool {
        if !self.same_document(node) {
            return false;
        }
        let parent = el.map(|e| Parent::Node(e.id())).unwrap_or(Parent::Root);
        self.splice_end(parent, node);
        true
    }

    /// Insert `node` as the first child of `el`, or as the document's
    /// first top-level node when `el` is `None`.
    pub fn insert_first_child(&mut self, el: Option<Element>, node: NodeId) -> bool {
        if !self.same_document(node) {
            return false;
        }
        let parent = el.map(|e| Parent::Node(e.id())).unwrap_or(Parent::Root);
        self.splice_first(parent, node);
        true
    }

    /// Insert `node` immediately after `after` (a current child of `el`).
    /// `after == node` is a no-op that returns `true` (the node is already
    /// in the right place). Inserting after the last child degenerates to
    /// [`Document::insert_end_child`].
    pub fn insert_after_child(&mut self, el: Option<Element>, after: NodeId, node: NodeId) -> bool {
        if !self.same_document(node) {
            return false;
        }
        if after == node {
            return true;
        }
        let parent = el.map(|e| Parent::Node(e.id())).unwrap_or(Parent::Root);
        if self.common(after).parent != Some(parent) {
            return false;
        }
        if self.common(after).next_sibling.is_none() {
            self.splice_end(parent, node);
            return true;
        }
        self.insert_child_preamble(parent, node);
        let next = self.common(after).next_sibling;
        self.common_mut(after).next_sibling = Some(node);
        {
            let c = self.common_mut(node);
            c.prev_sibling = Some(after);
            c.next_sibling = next;
        }
        if let Some(n) = next {
            self.common_mut(n).prev_sibling = Some(node);
        }
        self.common_mut(node).parent = Some(parent);
        true
    }

    /// Unlink `node` and free it, recursively freeing its children first.
    pub fn delete_node(&mut self, node: NodeId) {
        if self.common(node).parent.is_some() {
            self.detach(node);
        } else if let Some(pos) = self.unlinked.iter().position(|&n| n == node) {
            self.unlinked.swap_remove(pos);
        }
        self.free_subtree(node);
    }

    fn free_subtree(&mut self, node: NodeId) {
        let mut child = self.common(node).first_child;
        while let Some(c) = child {
            let next = self.common(c).next_sibling;
            self.free_subtree(c);
            child = next;
        }
        match node {
            NodeId::Element(_, i) => {
                let data = self.elements.free(i);
                let mut attr = data.first_attr;
                while let Some(a) = attr {
                    let ad = self.attrs.free(a.0);
                    attr = ad.next;
                }
            }
            NodeId::Text(_, i) => {
                self.texts.free(i);
            }
            NodeId::Misc(_, i) => {
                self.misc.free(i);
            }
        }
    }

    /// Scan `el`'s children for the first `Element`, optionally matching
    /// `name` exactly.
    pub fn first_child_element(&mut self, el: Option<Element>, name: Option<&str>) -> Option<Element> {
        let parent = el.map(|e| Parent::Node(e.id())).unwrap_or(Parent::Root);
        let mut cur = self.first_child_of(parent);
        self.scan_elements_forward(&mut cur, name)
    }

    /// Scan `el`'s children for the last `Element`, optionally matching
    /// `name` exactly.
    pub fn last_child_element(&mut self, el: Option<Element>, name: Option<&str>) -> Option<Element> {
        let parent = el.map(|e| Parent::Node(e.id())).unwrap_or(Parent::Root);
        let mut cur = self.last_child_of(parent);
        self.scan_elements_backward(&mut cur, name)
    }

    /// Scan forward from `id`'s next sibling for the first `Element`,
    /// optionally matching `name` exactly.
    pub fn next_sibling_element(&mut self, id: NodeId, name: Option<&str>) -> Option<Element> {
        let mut cur = self.common(id).next_sibling;
        self.scan_elements_forward(&mut cur, name)
    }

    /// Scan backward from `id`'s previous sibling for the first `Element`,
    /// optionally matching `name` exactly.
    pub fn previous_sibling_element(&mut self, id: NodeId, name: Option<&str>) -> Option<Element> {
        let mut cur = self.common(id).prev_sibling;
        self.scan_elements_backward(&mut cur, name)
    }

    fn scan_elements_forward(&mut self, cur: &mut Option<NodeId>, name: Option<&str>) -> Option<Element> {
        while let Some(id) = *cur {
            if let NodeId::Element(_, _) = id {
                if name.is_none() || self.element_name(Element(id)) == name.unwrap() {
                    return Some(Element(id));
                }
            }
            *cur = self.common(id).next_sibling;
        }
        None
    }

    fn scan_elements_backward(&mut self, cur: &mut Option<NodeId>, name: Option<&str>) -> Option<Element> {
        while let Some(id) = *cur {
            if let NodeId::Element(_, _) = id {
                if name.is_none() || self.element_name(Element(id)) == name.unwrap() {
                    return Some(Element(id));
                }
            }
            *cur = self.common(id).prev_sibling;
        }
        None
    }

    // ---- element-specific accessors ----

    /// An element's tag name.
    pub fn element_name(&mut self, el: Element) -> &str {
        if let NodeId::Element(_, i) = el.id() {
            self.elements.get_mut(i).name.get_str(&mut self.buf)
        } else {
            unreachable!()
        }
    }

    /// The closing form this element was parsed (or constructed) with.
    pub fn closing_type(&self, el: Element) -> ClosingType {
        if let NodeId::Element(_, i) = el.id() {
            self.elements.get(i).closing
        } else {
            unreachable!()
        }
    }

    pub(crate) fn set_closing_type(&mut self, el: Element, ct: ClosingType) {
        if let NodeId::Element(_, i) = el.id() {
            self.elements.get_mut(i).closing = ct;
        }
    }

    pub(crate) fn element_name_slot(&mut self, el: Element) -> &mut StrPair {
        if let NodeId::Element(_, i) = el.id() {
            &mut self.elements.get_mut(i).name
        } else {
            unreachable!()
        }
    }

    /// Is this element empty (no attributes)? Used by the printer to pick
    /// the self-closing form: true emptiness also requires no children.
    pub fn is_empty_element(&self, el: Element) -> bool {
        self.first_child(el.id()).is_none()
    }

    fn first_attr(&self, el: Element) -> Option<AttributeId> {
        if let NodeId::Element(_, i) = el.id() {
            self.elements.get(i).first_attr
        } else {
            unreachable!()
        }
    }

    fn find_attr(&self, el: Element, name: &str) -> Option<AttributeId> {
        let mut cur = self.first_attr(el);
        while let Some(id) = cur {
            let a = self.attrs.get(id.0);
            if a.name.equals_untransformed(&self.buf, name.as_bytes()) {
                return Some(id);
            }
            cur = a.next;
        }
        None
    }

    /// The raw string value of attribute `name` on `el`, if present.
    pub fn attribute(&mut self, el: Element, name: &str) -> Option<&str> {
        let id = self.find_attr(el, name)?;
        Some(self.attrs.get_mut(id.0).value.get_str(&mut self.buf))
    }

    /// `attribute(el, name)`, falling back to `default` if absent.
    pub fn attribute_or<'a>(&'a mut self, el: Element, name: &str, default: &'a str) -> &'a str {
        match self.find_attr(el, name) {
            Some(id) => self.attrs.get_mut(id.0).value.get_str(&mut self.buf),
            None => default,
        }
    }

    /// The typed value of attribute `name`, or a [`QueryError`] describing
    /// why it couldn't be produced. Never taints [`Document`] error state.
    pub fn query_int_attribute(&mut self, el: Element, name: &str) -> std::result::Result<i64, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_int64(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// The typed value of attribute `name` as an unsigned integer.
    pub fn query_unsigned_attribute(&mut self, el: Element, name: &str) -> std::result::Result<u64, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_uint64(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// The typed value of attribute `name` as a `bool`.
    pub fn query_bool_attribute(&mut self, el: Element, name: &str) -> std::result::Result<bool, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_bool(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// The typed value of attribute `name` as an `f64`.
    pub fn query_double_attribute(&mut self, el: Element, name: &str) -> std::result::Result<f64, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_double(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// `query_int_attribute(el, name)`, swallowing `NoAttribute` and
    /// `WrongAttributeType` and returning `default` instead.
    pub fn int_attribute_or(&mut self, el: Element, name: &str, default: i64) -> i64 {
        self.query_int_attribute(el, name).unwrap_or(default)
    }

    /// `query_unsigned_attribute(el, name)`, swallowing errors.
    pub fn unsigned_attribute_or(&mut self, el: Element, name: &str, default: u64) -> u64 {
        self.query_unsigned_attribute(el, name).unwrap_or(default)
    }

    /// `query_bool_attribute(el, name)`, swallowing errors.
    pub fn bool_attribute_or(&mut self, el: Element, name: &str, default: bool) -> bool {
        self.query_bool_attribute(el, name).unwrap_or(default)
    }

    /// `query_double_attribute(el, name)`, swallowing errors.
    pub fn double_attribute_or(&mut self, el: Element, name: &str, default: f64) -> f64 {
        self.query_double_attribute(el, name).unwrap_or(default)
    }

    /// The typed value of attribute `name` as a 32-bit signed integer
    /// (tinyxml2's narrower `IntAttribute`, alongside `query_int_attribute`'s
    /// 64-bit `Int64Attribute` equivalent).
    pub fn query_int32_attribute(&mut self, el: Element, name: &str) -> std::result::Result<i32, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_int(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// `query_int32_attribute(el, name)`, swallowing errors.
    pub fn int32_attribute_or(&mut self, el: Element, name: &str, default: i32) -> i32 {
        self.query_int32_attribute(el, name).unwrap_or(default)
    }

    /// The typed value of attribute `name` as a 32-bit unsigned integer.
    pub fn query_unsigned32_attribute(&mut self, el: Element, name: &str) -> std::result::Result<u32, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_unsigned(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// `query_unsigned32_attribute(el, name)`, swallowing errors.
    pub fn unsigned32_attribute_or(&mut self, el: Element, name: &str, default: u32) -> u32 {
        self.query_unsigned32_attribute(el, name).unwrap_or(default)
    }

    /// The typed value of attribute `name` as an `f32`.
    pub fn query_float_attribute(&mut self, el: Element, name: &str) -> std::result::Result<f32, QueryError> {
        let raw = self.attribute(el, name).ok_or(QueryError::NoAttribute)?;
        convert::to_float(raw).ok_or(QueryError::WrongAttributeType)
    }

    /// `query_float_attribute(el, name)`, swallowing errors.
    pub fn float_attribute_or(&mut self, el: Element, name: &str, default: f32) -> f32 {
        self.query_float_attribute(el, name).unwrap_or(default)
    }

    /// Set (or replace) attribute `name` to `value`. Idempotent by name:
    /// calling this twice with the same name updates the value in place
    /// rather than creating a duplicate.
    pub fn set_attribute(&mut self, el: Element, name: &str, value: &str) {
        if let Some(id) = self.find_attr(el, name) {
            self.attrs.get_mut(id.0).value.set_owned(value);
            return;
        }
        let line = self.cur_line;
        let mut ad = AttributeData { name: StrPair::empty(), value: StrPair::empty(), next: None, line };
        ad.name.set_owned(name);
        ad.value.set_owned(value);
        let new_id = AttributeId(self.attrs.alloc(ad));

        if let NodeId::Element(_, i) = el.id() {
            let data = self.elements.get_mut(i);
            match data.first_attr {
                None => data.first_attr = Some(new_id),
                Some(first) => {
                    let mut cur = first;
                    loop {
                        let next = self.attrs.get(cur.0).next;
                        match next {
                            Some(n) => cur = n,
                            None => break,
                        }
                    }
                    self.attrs.get_mut(cur.0).next = Some(new_id);
                }
            }
        }
    }

    /// Remove attribute `name` from `el`, if present.
    pub fn remove_attribute(&mut self, el: Element, name: &str) {
        let Some(target) = self.find_attr(el, name) else { return };
        if let NodeId::Element(_, i) = el.id() {
            let data = self.elements.get_mut(i);
            if data.first_attr == Some(target) {
                data.first_attr = self.attrs.get(target.0).next;
            } else {
                let mut cur = data.first_attr;
                while let Some(id) = cur {
                    let next = self.attrs.get(id.0).next;
                    if next == Some(target) {
                        self.attrs.get_mut(id.0).next = self.attrs.get(target.0).next;
                        break;
                    }
                    cur = next;
                }
            }
        }
        self.attrs.free(target.0);
    }

    /// Iterate over `el`'s attribute ids, in source (or insertion) order.
    pub fn attributes(&self, el: Element) -> AttributeIds<'_> {
        AttributeIds { doc: self, cur: self.first_attr(el) }
    }

    /// An attribute's name.
    pub fn attribute_name(&mut self, id: AttributeId) -> &str {
        self.attrs.get_mut(id.0).name.get_str(&mut self.buf)
    }

    /// An attribute's value.
    pub fn attribute_value(&mut self, id: AttributeId) -> &str {
        self.attrs.get_mut(id.0).value.get_str(&mut self.buf)
    }

    pub(crate) fn attribute_line(&self, id: AttributeId) -> u32 {
        self.attrs.get(id.0).line
    }

    pub(crate) fn attribute_name_slot(&mut self, id: AttributeId) -> &mut StrPair {
        &mut self.attrs.get_mut(id.0).name
    }

    pub(crate) fn attribute_value_slot(&mut self, id: AttributeId) -> &mut StrPair {
        &mut self.attrs.get_mut(id.0).value
    }

    pub(crate) fn append_attribute(&mut self, el: Element, id: AttributeId) {
        if let NodeId::Element(_, i) = el.id() {
            let data = self.elements.get_mut(i);
            match data.first_attr {
                None => data.first_attr = Some(id),
                Some(first) => {
                    let mut cur = first;
                    loop {
                        let next = self.attrs.get(cur.0).next;
                        match next {
                            Some(n) => cur = n,
                            None => break,
                        }
                    }
                    self.attrs.get_mut(cur.0).next = Some(id);
                }
            }
        }
    }

    pub(crate) fn alloc_attribute(&mut self, line: u32) -> AttributeId {
        AttributeId(self.attrs.alloc(AttributeData { name: StrPair::empty(), value: StrPair::empty(), next: None, line }))
    }

    pub(crate) fn free_attribute(&mut self, id: AttributeId) {
        self.attrs.free(id.0);
    }

    /// Checks whether `el` already carries an attribute named `name`,
    /// *before* any insertion — this is the duplicate-attribute check the
    /// parser uses, resolved deliberately in the "check first" direction
    /// (see SPEC_FULL.md open question (b)).
    pub(crate) fn has_attribute(&self, el: Element, name: &[u8]) -> bool {
        let mut cur = self.first_attr(el);
        while let Some(id) = cur {
            let a = self.attrs.get(id.0);
            if a.name.equals_untransformed(&self.buf, name) {
                return true;
            }
            cur = a.next;
        }
        false
    }

    // ---- text / comment / declaration / unknown accessors ----

    /// A text node's value. Panics if `id` isn't a `Text` node.
    pub fn text_value(&mut self, id: NodeId) -> &str {
        if let NodeId::Text(_, i) = id {
            self.texts.get_mut(i).value.get_str(&mut self.buf)
        } else {
            panic!("not a text node");
        }
    }

    /// Whether a text node was parsed from (or should be printed as) a
    /// `<![CDATA[ ]]>` section.
    pub fn is_cdata(&self, id: NodeId) -> bool {
        if let NodeId::Text(_, i) = id {
            self.texts.get(i).cdata
        } else {
            false
        }
    }

    pub(crate) fn set_cdata(&mut self, id: NodeId, cdata: bool) {
        if let NodeId::Text(_, i) = id {
            self.texts.get_mut(i).cdata = cdata;
        }
    }

    pub(crate) fn text_value_slot(&mut self, id: NodeId) -> &mut StrPair {
        if let NodeId::Text(_, i) = id {
            &mut self.texts.get_mut(i).value
        } else {
            panic!("not a text node");
        }
    }

    /// `el`'s first `Text` child's value, if it has one (tinyxml2's
    /// `GetText()`): the element's first child must itself be a text node,
    /// not merely any descendant.
    pub fn element_text(&mut self, el: Element) -> Option<&str> {
        let first = self.first_child(el.id())?;
        match first {
            NodeId::Text(_, _) => Some(self.text_value(first)),
            _ => None,
        }
    }

    /// The typed value of `el`'s first text child, or a [`QueryError`]
    /// describing why it couldn't be produced. Never taints [`Document`]
    /// error state.
    pub fn query_int_text(&mut self, el: Element) -> std::result::Result<i64, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_int64(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// The typed value of `el`'s first text child as an unsigned integer.
    pub fn query_unsigned_text(&mut self, el: Element) -> std::result::Result<u64, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_uint64(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// The typed value of `el`'s first text child as a `bool`.
    pub fn query_bool_text(&mut self, el: Element) -> std::result::Result<bool, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_bool(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// The typed value of `el`'s first text child as an `f64`.
    pub fn query_double_text(&mut self, el: Element) -> std::result::Result<f64, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_double(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// `query_int_text(el)`, swallowing errors and returning `default`.
    pub fn int_text_or(&mut self, el: Element, default: i64) -> i64 {
        self.query_int_text(el).unwrap_or(default)
    }

    /// `query_unsigned_text(el)`, swallowing errors.
    pub fn unsigned_text_or(&mut self, el: Element, default: u64) -> u64 {
        self.query_unsigned_text(el).unwrap_or(default)
    }

    /// `query_bool_text(el)`, swallowing errors.
    pub fn bool_text_or(&mut self, el: Element, default: bool) -> bool {
        self.query_bool_text(el).unwrap_or(default)
    }

    /// `query_double_text(el)`, swallowing errors.
    pub fn double_text_or(&mut self, el: Element, default: f64) -> f64 {
        self.query_double_text(el).unwrap_or(default)
    }

    /// The typed value of `el`'s first text child as a 32-bit signed integer.
    pub fn query_int32_text(&mut self, el: Element) -> std::result::Result<i32, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_int(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// `query_int32_text(el)`, swallowing errors.
    pub fn int32_text_or(&mut self, el: Element, default: i32) -> i32 {
        self.query_int32_text(el).unwrap_or(default)
    }

    /// The typed value of `el`'s first text child as an `f32`.
    pub fn query_float_text(&mut self, el: Element) -> std::result::Result<f32, QueryError> {
        let raw = self.element_text(el).ok_or(QueryError::NoTextNode)?;
        convert::to_float(raw).ok_or(QueryError::CanNotConvertText)
    }

    /// `query_float_text(el)`, swallowing errors.
    pub fn float_text_or(&mut self, el: Element, default: f32) -> f32 {
        self.query_float_text(el).unwrap_or(default)
    }

    /// A comment/declaration/unknown node's raw inner text. Panics if `id`
    /// is a `Text` or `Element` node.
    pub fn misc_value(&mut self, id: NodeId) -> &str {
        if let NodeId::Misc(_, i) = id {
            self.misc.get_mut(i).value.get_str(&mut self.buf)
        } else {
            panic!("not a comment/declaration/unknown node");
        }
    }

    pub(crate) fn misc_value_slot(&mut self, id: NodeId) -> &mut StrPair {
        if let NodeId::Misc(_, i) = id {
            &mut self.misc.get_mut(i).value
        } else {
            panic!("not a comment/declaration/unknown node");
        }
    }

    // ---- clone / compare (spec §4.3) ----

    /// Deep-clone `node` (and its descendants) within this document,
    /// returning a new unlinked node the caller can insert wherever it
    /// likes.
    pub fn deep_clone(&mut self, node: NodeId) -> NodeId {
        let spec = self.snapshot(node);
        self.materialize(&spec)
    }

    /// Clear `target`, then deep-clone every top-level node of `self` into
    /// it, in order. A no-op if `target` is `self`.
    pub fn deep_copy_into(&mut self, target: &mut Document) {
        if self.id == target.id {
            return;
        }
        target.clear();
        let mut specs = Vec::new();
        let mut cur = self.root_first;
        while let Some(id) = cur {
            specs.push(self.snapshot(id));
            cur = self.common(id).next_sibling;
        }
        for spec in &specs {
            let cloned = target.materialize(spec);
            target.splice_end(Parent::Root, cloned);
        }
    }

    fn snapshot(&mut self, node: NodeId) -> CloneSpec {
        match self.node_kind(node) {
            NodeKind::Element => {
                let el = Element(node);
                let name = self.element_name(el).to_string();
                let mut attrs = Vec::new();
                let mut cur = self.first_attr(el);
                while let Some(id) = cur {
                    let n = self.attribute_name(id).to_string();
                    let v = self.attribute_value(id).to_string();
                    attrs.push((n, v));
                    cur = self.attrs.get(id.0).next;
                }
                let mut children = Vec::new();
                let mut c = self.first_child(node);
                while let Some(cid) = c {
                    children.push(self.snapshot(cid));
                    c = self.common(cid).next_sibling;
                }
                CloneSpec::Element { name, attrs, children }
            }
            NodeKind::Text => {
                let cdata = self.is_cdata(node);
                let value = self.text_value(node).to_string();
                CloneSpec::Text { value, cdata }
            }
            NodeKind::Comment => CloneSpec::Comment(self.misc_value(node).to_string()),
            NodeKind::Declaration => CloneSpec::Declaration(self.misc_value(node).to_string()),
            NodeKind::Unknown => CloneSpec::Unknown(self.misc_value(node).to_string()),
        }
    }

    fn materialize(&mut self, spec: &CloneSpec) -> NodeId {
        match spec {
            CloneSpec::Element { name, attrs, children } => {
                let el = self.new_element(name);
                for (n, v) in attrs {
                    self.set_attribute(el, n, v);
                }
                for child_spec in children {
                    let child = self.materialize(child_spec);
                    self.insert_end_child(Some(el), child);
                }
                el.id()
            }
            CloneSpec::Text { value, cdata } => {
                let id = self.new_text(value);
                self.set_cdata(id, *cdata);
                id
            }
            CloneSpec::Comment(v) => self.new_comment(v),
            CloneSpec::Declaration(v) => self.new_declaration(Some(v)),
            CloneSpec::Unknown(v) => self.new_unknown(v),
        }
    }

    /// Per-variant name+value comparison. For elements, this also compares
    /// attribute values pairwise in list order (and count) — an explicit,
    /// order-sensitive design choice (spec §4.3).
    pub fn shallow_equal(&mut self, a: NodeId, b: NodeId) -> bool {
        if self.node_kind(a) != self.node_kind(b) {
            return false;
        }
        match self.node_kind(a) {
            NodeKind::Element => {
                let (ea, eb) = (Element(a), Element(b));
                if self.element_name(ea) != self.element_name(eb) {
                    return false;
                }
                let mut ca = self.first_attr(ea);
                let mut cb = self.first_attr(eb);
                loop {
                    match (ca, cb) {
                        (None, None) => return true,
                        (Some(x), Some(y)) => {
                            if self.attribute_value(x) != self.attribute_value(y) {
                                return false;
                            }
                            ca = self.attrs.get(x.0).next;
                            cb = self.attrs.get(y.0).next;
                        }
                        _ => return false,
                    }
                }
            }
            NodeKind::Text => self.text_value(a) == self.text_value(b),
            NodeKind::Comment | NodeKind::Declaration | NodeKind::Unknown => {
                self.misc_value(a) == self.misc_value(b)
            }
        }
    }

    /// Walk the tree depth-first, calling `visitor`'s entry/exit hooks.
    /// See [`crate::Visitor`].
    pub fn accept(&mut self, visitor: &mut dyn crate::Visitor) {
        if !visitor.document_enter() {
            visitor.document_exit();
            return;
        }
        let mut cur = self.root_first;
        while let Some(id) = cur {
            if !self.accept_node(id, visitor) {
                break;
            }
            cur = self.common(id).next_sibling;
        }
        visitor.document_exit();
    }

    fn accept_node(&mut self, id: NodeId, visitor: &mut dyn crate::Visitor) -> bool {
        match self.node_kind(id) {
            NodeKind::Element => {
                let el = Element(id);
                let name = self.element_name(el).to_string();
                let mut attrs = Vec::new();
                let mut cur = self.first_attr(el);
                while let Some(aid) = cur {
                    attrs.push((self.attribute_name(aid).to_string(), self.attribute_value(aid).to_string()));
                    cur = self.attrs.get(aid.0).next;
                }
                if visitor.element_enter(&name, &attrs) {
                    let mut c = self.first_child(id);
                    while let Some(cid) = c {
                        if !self.accept_node(cid, visitor) {
                            break;
                        }
                        c = self.common(cid).next_sibling;
                    }
                }
                visitor.element_exit(&name)
            }
            NodeKind::Text => {
                let cdata = self.is_cdata(id);
                let value = self.text_value(id).to_string();
                visitor.text(&value, cdata)
            }
            NodeKind::Comment => {
                let value = self.misc_value(id).to_string();
                visitor.comment(&value)
            }
            NodeKind::Declaration => {
                let value = self.misc_value(id).to_string();
                visitor.declaration(&value)
            }
            NodeKind::Unknown => {
                let value = self.misc_value(id).to_string();
                visitor.unknown(&value)
            }
        }
    }
}

enum CloneSpec {
    Element { name: String, attrs: Vec<(String, String)>, children: Vec<CloneSpec> },
    Text { value: String, cdata: bool },
    Comment(String),
    Declaration(String),
    Unknown(String),
}

/// Iterator over an element's attribute ids, in source/insertion order.
pub struct AttributeIds<'a> {
    doc: &'a Document,
    cur: Option<AttributeId>,
}

impl<'a> Iterator for AttributeIds<'a> {
    type Item = AttributeId;
    fn next(&mut self) -> Option<AttributeId> {
        let id = self.cur?;
        self.cur = self.doc.attrs.get(id.0).next;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentConfig;

    fn doc() -> Document {
        Document::new(DocumentConfig::default())
    }

    #[test]
    fn insert_and_read_back_element_tree() {
        let mut d = doc();
        let root = d.new_element("root");
        d.insert_end_child(None, root.id());
        let child = d.new_element("child");
        d.insert_end_child(Some(root), child.id());
        assert_eq!(d.first_child(root.id()), Some(child.id()));
        assert_eq!(d.element_name(child), "child");
    }

    #[test]
    fn cross_document_insert_rejected() {
        let mut a = doc();
        let mut b = doc();
        let el = a.new_element("x");
        assert!(!b.insert_end_child(None, el.id()));
        // both documents remain untouched
        assert!(a.unlinked_contains(el.id()));
        assert_eq!(b.first_node(), None);
    }

    #[test]
    fn set_attribute_is_idempotent_by_name() {
        let mut d = doc();
        let el = d.new_element("e");
        d.set_attribute(el, "a", "1");
        d.set_attribute(el, "a", "2");
        assert_eq!(d.attribute(el, "a"), Some("2"));
        assert_eq!(d.attributes(el).count(), 1);
    }

    #[test]
    fn remove_attribute() {
        let mut d = doc();
        let el = d.new_element("e");
        d.set_attribute(el, "a", "1");
        d.set_attribute(el, "b", "2");
        d.remove_attribute(el, "a");
        assert_eq!(d.attribute(el, "a"), None);
        assert_eq!(d.attribute(el, "b"), Some("2"));
    }

    #[test]
    fn unlink_then_reinsert() {
        let mut d = doc();
        let root = d.new_element("r");
        d.insert_end_child(None, root.id());
        let a = d.new_element("a");
        let b = d.new_element("b");
        d.insert_end_child(Some(root), a.id());
        d.insert_end_child(Some(root), b.id());
        assert!(d.unlink(a.id()));
        assert_eq!(d.first_child(root.id()), Some(b.id()));
        assert!(d.insert_first_child(Some(root), a.id()));
        assert_eq!(d.first_child(root.id()), Some(a.id()));
    }

    #[test]
    fn insert_after_child_self_is_noop() {
        let mut d = doc();
        let root = d.new_element("r");
        d.insert_end_child(None, root.id());
        let a = d.new_element("a");
        d.insert_end_child(Some(root), a.id());
        assert!(d.insert_after_child(Some(root), a.id(), a.id()));
        assert_eq!(d.first_child(root.id()), Some(a.id()));
    }

    #[test]
    fn delete_node_frees_subtree() {
        let mut d = doc();
        let root = d.new_element("r");
        d.insert_end_child(None, root.id());
        let child = d.new_element("c");
        d.insert_end_child(Some(root), child.id());
        d.delete_node(root.id());
        assert_eq!(d.first_node(), None);
    }

    #[test]
    fn deep_clone_copies_subtree() {
        let mut d = doc();
        let root = d.new_element("r");
        d.set_attribute(root, "a", "1");
        d.insert_end_child(None, root.id());
        let child = d.new_text("hi");
        d.insert_end_child(Some(root), child);

        let clone = d.deep_clone(root.id());
        let clone_el = d.as_element(clone).unwrap();
        assert_eq!(d.element_name(clone_el), "r");
        assert_eq!(d.attribute(clone_el, "a"), Some("1"));
        let clone_child = d.first_child(clone).unwrap();
        assert_eq!(d.text_value(clone_child), "hi");
        // mutating the clone doesn't affect the original
        d.set_attribute(clone_el, "a", "2");
        assert_eq!(d.attribute(root, "a"), Some("1"));
    }

    #[test]
    fn typed_attribute_queries() {
        let mut d = doc();
        let el = d.new_element("e");
        d.set_attribute(el, "n", "42");
        d.set_attribute(el, "hex", "0x2A");
        d.set_attribute(el, "flag", "true");
        d.set_attribute(el, "bad", "nope");
        assert_eq!(d.query_int_attribute(el, "n"), Ok(42));
        assert_eq!(d.query_int_attribute(el, "hex"), Ok(42));
        assert_eq!(d.query_bool_attribute(el, "flag"), Ok(true));
        assert_eq!(d.query_int_attribute(el, "bad"), Err(QueryError::WrongAttributeType));
        assert_eq!(d.query_int_attribute(el, "missing"), Err(QueryError::NoAttribute));
        assert_eq!(d.int_attribute_or(el, "missing", -1), -1);
        assert_eq!(d.int_attribute_or(el, "n", -1), 42);
    }

    #[test]
    fn typed_text_queries() {
        let mut d = doc();
        let el = d.new_element("e");
        let text = d.new_text("123");
        d.insert_end_child(Some(el), text);
        assert_eq!(d.query_int_text(el), Ok(123));
        assert_eq!(d.int_text_or(el, -1), 123);

        let empty = d.new_element("empty");
        assert_eq!(d.query_int_text(empty), Err(QueryError::NoTextNode));
        assert_eq!(d.int_text_or(empty, 7), 7);
    }

    #[test]
    fn shallow_equal_compares_name_and_attrs() {
        let mut d = doc();
        let a = d.new_element("e");
        d.set_attribute(a, "x", "1");
        let b = d.new_element("e");
        d.set_attribute(b, "x", "1");
        assert!(d.shallow_equal(a.id(), b.id()));
        d.set_attribute(b, "x", "2");
        assert!(!d.shallow_equal(a.id(), b.id()));
    }
}

#[cfg(test)]
impl Document {
    fn unlinked_contains(&self, id: NodeId) -> bool {
        self.unlinked.contains(&id)
    }
}
