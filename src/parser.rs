//! The recursive-descent parser: `identify` picks the next node kind from a
//! fixed precedence order, `parse_deep` builds the tree one level at a time,
//! handing a closing element's name up to whichever level is waiting for it.
//!
//! This mutates `doc`'s buffer in place as it goes (every `StrPair` it
//! produces borrows a range of that same buffer) and latches at most one
//! [`ErrorId`] on `doc` before giving up.

use crate::charclass::is_whitespace_byte;
use crate::error::{ErrorId, Result};
use crate::node::{ClosingType, Document, Element, NodeId, NodeKind};
use crate::strpair::{Flags, StrPair};

/// Parse `buf` into `doc`, replacing any existing content. Called by
/// [`Document::parse`](crate::Document::parse).
pub(crate) fn parse(doc: &mut Document, buf: Vec<u8>) -> Result<()> {
    doc.clear();
    *doc.buf_mut() = buf;
    doc.set_cur_line(1);

    let mut cursor = skip_whitespace(doc, 0);
    match read_bom(doc.buf(), cursor) {
        Some(after) => {
            doc.set_bom(true);
            cursor = after;
        }
        None => doc.set_bom(false),
    }

    if cursor >= doc.buf().len() {
        doc.set_error(ErrorId::EmptyDocument, doc.cur_line(), None);
        return Err(doc.error().unwrap().clone());
    }

    let mut discard = StrPair::empty();
    parse_deep(doc, cursor, None, &mut discard);

    match doc.error() {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    }
}

fn read_bom(buf: &[u8], cursor: usize) -> Option<usize> {
    if buf[cursor..].starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(cursor + 3)
    } else {
        None
    }
}

fn skip_whitespace(doc: &mut Document, mut cursor: usize) -> usize {
    let mut line = doc.cur_line();
    {
        let buf = doc.buf();
        while cursor < buf.len() && is_whitespace_byte(buf[cursor]) {
            if buf[cursor] == b'\n' {
                line += 1;
            }
            cursor += 1;
        }
    }
    doc.set_cur_line(line);
    cursor
}

/// Which literal prefix `identify` matched, in precedence order.
enum Prefix {
    Declaration,
    Comment,
    Cdata,
    Unknown,
    ElementOpen,
    Text,
}

fn identify(doc: &mut Document, cursor: usize) -> (usize, Option<NodeId>) {
    let text_start = cursor;
    let line_before_skip = doc.cur_line();
    let cursor = skip_whitespace(doc, cursor);
    if cursor >= doc.buf().len() {
        return (cursor, None);
    }

    let prefix = {
        let rest = &doc.buf()[cursor..];
        if rest.starts_with(b"<?") {
            Prefix::Declaration
        } else if rest.starts_with(b"<!--") {
            Prefix::Comment
        } else if rest.starts_with(b"<![CDATA[") {
            Prefix::Cdata
        } else if rest.starts_with(b"<!") {
            Prefix::Unknown
        } else if rest.starts_with(b"<") {
            Prefix::ElementOpen
        } else {
            Prefix::Text
        }
    };

    match prefix {
        Prefix::Declaration => {
            let line = doc.cur_line();
            (cursor + 2, Some(doc.alloc_unlinked_declaration(line)))
        }
        Prefix::Comment => {
            let line = doc.cur_line();
            (cursor + 4, Some(doc.alloc_unlinked_comment(line)))
        }
        Prefix::Cdata => {
            let line = doc.cur_line();
            (cursor + 9, Some(doc.alloc_unlinked_text(line, true)))
        }
        Prefix::Unknown => {
            let line = doc.cur_line();
            (cursor + 2, Some(doc.alloc_unlinked_unknown(line)))
        }
        Prefix::ElementOpen => {
            let line = doc.cur_line();
            (cursor + 1, Some(doc.alloc_unlinked_element(line)))
        }
        Prefix::Text => {
            // Leading whitespace between tags is textual content: the text
            // node starts before the whitespace skip, not after it.
            doc.set_cur_line(line_before_skip);
            (text_start, Some(doc.alloc_unlinked_text(line_before_skip, false)))
        }
    }
}

/// Parse the child list of `parent` (`None` for the document itself)
/// starting at `cursor`. `parent_end_tag` receives the name of whatever
/// `</...>` marker ends this level, if one is found.
///
/// Mirrors the reference engine's node-level `ParseDeep`: it returns
/// `Some(cursor)` only when a closing marker was handed up to it; reaching
/// end-of-input (whether cleanly or via a child parse failure) always
/// returns `None`, which is how an unterminated element surfaces as an
/// error one level up.
fn parse_deep(
    doc: &mut Document,
    mut cursor: usize,
    parent: Option<Element>,
    parent_end_tag: &mut StrPair,
) -> Option<usize> {
    if doc.has_error() {
        return None;
    }

    doc.inc_depth();
    if doc.depth() > crate::MAX_ELEMENT_DEPTH {
        doc.set_error(ErrorId::ElementDepthExceeded, doc.cur_line(), None);
        doc.dec_depth();
        return None;
    }

    while cursor < doc.buf().len() {
        let (new_cursor, node) = identify(doc, cursor);
        cursor = new_cursor;
        let node = match node {
            Some(n) => n,
            None => break,
        };
        let initial_line = doc.node_line(node);

        let mut end_tag = StrPair::empty();
        match parse_node_deep(doc, node, cursor, &mut end_tag) {
            Some(next) => cursor = next,
            None => {
                doc.delete_node(node);
                if !doc.has_error() {
                    doc.set_error(ErrorId::Parsing, initial_line, None);
                }
                break;
            }
        }

        if doc.node_kind(node) == NodeKind::Declaration && !declaration_well_located(doc, parent) {
            doc.set_error(ErrorId::ParsingDeclaration, initial_line, None);
            doc.delete_node(node);
            break;
        }

        if let Some(el) = doc.as_element(node) {
            if doc.closing_type(el) == ClosingType::Closing {
                doc.element_name_slot(el).transfer_to(parent_end_tag);
                doc.delete_node(node);
                doc.dec_depth();
                return Some(cursor);
            }

            let mismatch = if end_tag.is_empty() {
                doc.closing_type(el) == ClosingType::Open
            } else {
                let end_tag_name = end_tag.get_str(doc.buf_mut()).to_string();
                doc.closing_type(el) != ClosingType::Open || end_tag_name != doc.element_name(el)
            };
            if mismatch {
                doc.set_error(ErrorId::MismatchedElement, initial_line, None);
                doc.delete_node(node);
                break;
            }
        }

        doc.insert_end_child(parent, node);
    }

    doc.dec_depth();
    None
}

fn declaration_well_located(doc: &Document, parent: Option<Element>) -> bool {
    if parent.is_some() {
        return false;
    }
    match doc.first_node() {
        None => true,
        Some(first) => {
            doc.node_kind(first) == NodeKind::Declaration
                && doc
                    .last_node()
                    .map(|last| doc.node_kind(last) == NodeKind::Declaration)
                    .unwrap_or(false)
        }
    }
}

fn parse_node_deep(
    doc: &mut Document,
    node: NodeId,
    cursor: usize,
    end_tag_out: &mut StrPair,
) -> Option<usize> {
    match doc.node_kind(node) {
        NodeKind::Declaration => parse_raw_text(doc, node, cursor, b"?>", ErrorId::ParsingDeclaration),
        NodeKind::Comment => parse_raw_text(doc, node, cursor, b"-->", ErrorId::ParsingComment),
        NodeKind::Unknown => parse_raw_text(doc, node, cursor, b">", ErrorId::ParsingUnknown),
        NodeKind::Text => parse_text_node(doc, node, cursor),
        NodeKind::Element => parse_element(doc, node, cursor, end_tag_out),
    }
}

/// Shared shape for Comment/Declaration/Unknown: scan for a literal
/// terminator with newline normalization only, no entity decoding.
fn parse_raw_text(
    doc: &mut Document,
    node: NodeId,
    cursor: usize,
    end_tag: &[u8],
    err: ErrorId,
) -> Option<usize> {
    let initial_line = doc.node_line(node);
    let mut value = std::mem::take(doc.misc_value_slot(node));
    let mut line = doc.cur_line();
    let result = value.parse_text(doc.buf(), cursor, end_tag, Flags::raw_text(), &mut line);
    doc.set_cur_line(line);
    *doc.misc_value_slot(node) = value;
    match result {
        Some(next) => Some(next),
        None => {
            doc.set_error(err, initial_line, None);
            None
        }
    }
}

fn parse_text_node(doc: &mut Document, node: NodeId, cursor: usize) -> Option<usize> {
    let initial_line = doc.node_line(node);
    let cdata = doc.is_cdata(node);
    let mut value = std::mem::take(doc.text_value_slot(node));
    let mut line = doc.cur_line();

    if cdata {
        let result = value.parse_text(doc.buf(), cursor, b"]]>", Flags::raw_text(), &mut line);
        doc.set_cur_line(line);
        *doc.text_value_slot(node) = value;
        return match result {
            Some(next) => Some(next),
            None => {
                doc.set_error(ErrorId::ParsingCdata, initial_line, None);
                None
            }
        };
    }

    let collapse = doc.whitespace_mode() == crate::WhitespaceMode::CollapseWhitespace;
    let flags = Flags::text_element(doc.process_entities(), collapse);
    let result = value.parse_text(doc.buf(), cursor, b"<", flags, &mut line);
    doc.set_cur_line(line);
    *doc.text_value_slot(node) = value;
    match result {
        // parse_text consumed the `<` as part of its end tag; back the
        // cursor up one so the caller re-identifies it as the next node.
        Some(next) => Some(next - 1),
        None => {
            doc.set_error(ErrorId::ParsingText, initial_line, None);
            None
        }
    }
}

fn parse_element(
    doc: &mut Document,
    node: NodeId,
    cursor: usize,
    end_tag_out: &mut StrPair,
) -> Option<usize> {
    let el = doc.as_element(node).unwrap();
    let mut cursor = cursor;

    if cursor < doc.buf().len() && doc.buf()[cursor] == b'/' {
        doc.set_closing_type(el, ClosingType::Closing);
        cursor += 1;
    }

    let mut name = std::mem::take(doc.element_name_slot(el));
    let parsed = name.parse_name(doc.buf(), cursor);
    *doc.element_name_slot(el) = name;
    cursor = parsed?;

    cursor = parse_attributes(doc, el, cursor)?;

    if doc.closing_type(el) != ClosingType::Open || cursor >= doc.buf().len() {
        return Some(cursor);
    }

    parse_deep(doc, cursor, Some(el), end_tag_out)
}

fn parse_attributes(doc: &mut Document, el: Element, mut cursor: usize) -> Option<usize> {
    loop {
        cursor = skip_whitespace(doc, cursor);
        if cursor >= doc.buf().len() {
            let line = doc.node_line(el.id());
            doc.set_error(ErrorId::ParsingElement, line, None);
            return None;
        }

        let b = doc.buf()[cursor];
        if crate::charclass::is_name_start_byte(b) {
            let attr_line = doc.cur_line();
            let id = doc.alloc_attribute(attr_line);
            match parse_attribute_deep(doc, id, cursor) {
                Some(next) => {
                    let name = doc.attribute_name(id).to_string();
                    if doc.has_attribute(el, name.as_bytes()) {
                        doc.free_attribute(id);
                        doc.set_error(ErrorId::ParsingAttribute, attr_line, None);
                        return None;
                    }
                    doc.append_attribute(el, id);
                    cursor = next;
                }
                None => {
                    doc.free_attribute(id);
                    doc.set_error(ErrorId::ParsingAttribute, attr_line, None);
                    return None;
                }
            }
        } else if b == b'>' {
            cursor += 1;
            return Some(cursor);
        } else if b == b'/' && doc.buf().get(cursor + 1) == Some(&b'>') {
            doc.set_closing_type(el, ClosingType::Closed);
            return Some(cursor + 2);
        } else {
            let line = doc.node_line(el.id());
            doc.set_error(ErrorId::ParsingElement, line, None);
            return None;
        }
    }
}

fn parse_attribute_deep(
    doc: &mut Document,
    id: crate::AttributeId,
    mut cursor: usize,
) -> Option<usize> {
    let mut name = std::mem::take(doc.attribute_name_slot(id));
    let parsed = name.parse_name(doc.buf(), cursor);
    *doc.attribute_name_slot(id) = name;
    cursor = parsed?;

    cursor = skip_whitespace(doc, cursor);
    if doc.buf().get(cursor) != Some(&b'=') {
        return None;
    }
    cursor += 1;
    cursor = skip_whitespace(doc, cursor);

    let quote = *doc.buf().get(cursor)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    cursor += 1;

    let end_tag: &[u8] = if quote == b'"' { b"\"" } else { b"'" };
    let flags = Flags::attribute_value(doc.process_entities());
    let mut value = std::mem::take(doc.attribute_value_slot(id));
    let mut line = doc.cur_line();
    let result = value.parse_text(doc.buf(), cursor, end_tag, flags, &mut line);
    doc.set_cur_line(line);
    *doc.attribute_value_slot(id) = value;
    result
}
