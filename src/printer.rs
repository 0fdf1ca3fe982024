//! The visitor-driven printer: walks a [`Document`] via [`Visitor`] and
//! writes canonical XML, either indented (one element per line, 4 spaces
//! per level) or compact (no inserted whitespace at all).
//!
//! State mirrors the reference engine's `XMLPrinter`: a depth counter, an
//! "element just opened" flag (so the next emission knows whether to seal
//! the tag with `>` or self-close it with `/>`), a "first element" flag (so
//! the very first node doesn't get a leading newline), and `text_depth` —
//! the depth at which the innermost text-bearing element sits, which
//! suppresses indentation for its closing tag.

use crate::node::Document;
use crate::visitor::Visitor;

const ENTITY_RANGE: u8 = 128;

fn build_entity_table(bytes: &[u8]) -> [bool; ENTITY_RANGE as usize] {
    let mut table = [false; ENTITY_RANGE as usize];
    for &b in bytes {
        table[b as usize] = true;
    }
    table
}

/// Serializes a [`Document`] to XML text via the [`Visitor`] protocol.
///
/// Drive it with [`Document::accept`](crate::Document::accept), or use the
/// [`Document::to_string_pretty`]/[`Document::to_string_compact`]
/// convenience methods, which also take care of the leading BOM.
pub struct Printer {
    out: Vec<u8>,
    stack: Vec<String>,
    depth: u32,
    element_just_opened: bool,
    first_element: bool,
    text_depth: i64,
    compact: bool,
    entity_flag: [bool; ENTITY_RANGE as usize],
    restricted_entity_flag: [bool; ENTITY_RANGE as usize],
    true_str: String,
    false_str: String,
}

impl Printer {
    /// A new printer. `compact` suppresses all inserted whitespace
    /// (newlines and indentation); otherwise output is one node per line,
    /// indented 4 spaces per nesting level.
    pub fn new(compact: bool) -> Self {
        Printer {
            out: Vec::new(),
            stack: Vec::new(),
            depth: 0,
            element_just_opened: false,
            first_element: true,
            text_depth: -1,
            compact,
            entity_flag: build_entity_table(b"&<>\"'"),
            restricted_entity_flag: build_entity_table(b"&<>"),
            true_str: "true".to_string(),
            false_str: "false".to_string(),
        }
    }

    /// Override the strings `push_bool_attribute`/`push_bool_text` emit.
    /// Scoped to this `Printer` instance, not process-wide (see
    /// DESIGN.md's note on the reference engine's global booleans).
    pub fn set_bool_strings(&mut self, true_str: impl Into<String>, false_str: impl Into<String>) {
        self.true_str = true_str.into();
        self.false_str = false_str.into();
    }

    /// Consume the printer, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    /// Consume the printer, returning the accumulated text. The output is
    /// always valid UTF-8 since every write is either ASCII structural
    /// bytes or a caller-provided `&str`.
    pub fn into_string(self) -> String {
        String::from_utf8(self.out).expect("printer output is always valid UTF-8")
    }

    fn write(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    fn putc(&mut self, b: u8) {
        self.out.push(b);
    }

    fn print_space(&mut self, depth: u32) {
        for _ in 0..depth {
            self.write(b"    ");
        }
    }

    fn print_string(&mut self, text: &str, restricted: bool) {
        let table = if restricted { &self.restricted_entity_flag } else { &self.entity_flag };
        let bytes = text.as_bytes();
        let mut start = 0;
        for (i, &b) in bytes.iter().enumerate() {
            if b > 0 && b < ENTITY_RANGE && table[b as usize] {
                if start < i {
                    self.write(&bytes[start..i]);
                }
                self.putc(b'&');
                self.write(crate::entity::pattern_for(b).unwrap().as_bytes());
                self.putc(b';');
                start = i + 1;
            }
        }
        if start < bytes.len() {
            self.write(&bytes[start..]);
        }
    }

    fn seal_if_just_opened(&mut self) {
        if self.element_just_opened {
            self.write(b">");
            self.element_just_opened = false;
        }
    }

    fn prepare_for_new_node(&mut self) {
        self.seal_if_just_opened();
        if self.compact {
            return;
        }
        if self.first_element {
            self.print_space(self.depth);
        } else if self.text_depth < 0 {
            self.putc(b'\n');
            self.print_space(self.depth);
        }
        self.first_element = false;
    }

    /// Optionally emit the UTF-8 BOM, then optionally a default
    /// `<?xml version="1.0"?>` declaration.
    pub fn push_header(&mut self, bom: bool, dec: bool) {
        if bom {
            self.write(&[0xEF, 0xBB, 0xBF]);
        }
        if dec {
            self.push_declaration("xml version=\"1.0\"");
        }
    }

    /// Open `<name`, leaving the tag unsealed for attributes.
    pub fn open_element(&mut self, name: &str) {
        self.prepare_for_new_node();
        self.stack.push(name.to_string());
        self.write(b"<");
        self.write(name.as_bytes());
        self.depth += 1;
        self.element_just_opened = true;
    }

    /// Emit ` name="value"`. Must follow `open_element` (or another
    /// `push_attribute`) before the tag is sealed.
    pub fn push_attribute(&mut self, name: &str, value: &str) {
        debug_assert!(self.element_just_opened, "push_attribute after the tag was sealed");
        self.putc(b' ');
        self.write(name.as_bytes());
        self.write(b"=\"");
        self.print_string(value, true);
        self.putc(b'"');
    }

    /// Emit an attribute whose value is a bool, using the configured
    /// true/false strings.
    pub fn push_bool_attribute(&mut self, name: &str, value: bool) {
        let text = if value { self.true_str.clone() } else { self.false_str.clone() };
        self.push_attribute(name, &text);
    }

    /// Close the current element: `/>` if nothing was written since
    /// `open_element`, otherwise `</name>`.
    pub fn close_element(&mut self) {
        self.depth -= 1;
        let name = self.stack.pop().unwrap_or_default();
        if self.element_just_opened {
            self.write(b"/>");
            self.element_just_opened = false;
        } else {
            if !self.compact && self.text_depth < 0 {
                self.putc(b'\n');
                self.print_space(self.depth);
            }
            self.write(b"</");
            self.write(name.as_bytes());
            self.write(b">");
        }
        if self.text_depth == self.depth as i64 {
            self.text_depth = -1;
        }
        if self.depth == 0 && !self.compact {
            self.putc(b'\n');
        }
    }

    /// Emit text content: `<![CDATA[...]]>` verbatim, or entity-escaped
    /// (full table) otherwise.
    pub fn push_text(&mut self, text: &str, cdata: bool) {
        self.text_depth = self.depth as i64 - 1;
        self.seal_if_just_opened();
        if cdata {
            self.write(b"<![CDATA[");
            self.write(text.as_bytes());
            self.write(b"]]>");
        } else {
            self.print_string(text, false);
        }
    }

    /// Emit a bool as text, using the configured true/false strings.
    pub fn push_bool_text(&mut self, value: bool) {
        let text = if value { self.true_str.clone() } else { self.false_str.clone() };
        self.push_text(&text, false);
    }

    /// Emit `<!--value-->`.
    pub fn push_comment(&mut self, value: &str) {
        self.prepare_for_new_node();
        self.write(b"<!--");
        self.write(value.as_bytes());
        self.write(b"-->");
    }

    /// Emit `<?value?>`.
    pub fn push_declaration(&mut self, value: &str) {
        self.prepare_for_new_node();
        self.write(b"<?");
        self.write(value.as_bytes());
        self.write(b"?>");
    }

    /// Emit `<!value>`.
    pub fn push_unknown(&mut self, value: &str) {
        self.prepare_for_new_node();
        self.write(b"<!");
        self.write(value.as_bytes());
        self.write(b">");
    }
}

impl Visitor for Printer {
    fn element_enter(&mut self, name: &str, attributes: &[(String, String)]) -> bool {
        self.open_element(name);
        for (k, v) in attributes {
            self.push_attribute(k, v);
        }
        true
    }

    fn element_exit(&mut self, _name: &str) -> bool {
        self.close_element();
        true
    }

    fn text(&mut self, value: &str, cdata: bool) -> bool {
        self.push_text(value, cdata);
        true
    }

    fn comment(&mut self, value: &str) -> bool {
        self.push_comment(value);
        true
    }

    fn declaration(&mut self, value: &str) -> bool {
        self.push_declaration(value);
        true
    }

    fn unknown(&mut self, value: &str) -> bool {
        self.push_unknown(value);
        true
    }
}

impl Document {
    /// Serialize this document as indented, human-readable XML (4 spaces
    /// per level, one node per line), prefixed with a BOM if one was seen
    /// on parse (or requested via [`Document::set_bom`]).
    pub fn to_string_pretty(&mut self) -> String {
        self.print_with(Printer::new(false))
    }

    /// Serialize this document as compact XML: no inserted newlines or
    /// indentation, still prefixed with a BOM if applicable.
    pub fn to_string_compact(&mut self) -> String {
        self.print_with(Printer::new(true))
    }

    fn print_with(&mut self, mut printer: Printer) -> String {
        printer.push_header(self.bom(), false);
        self.accept(&mut printer);
        printer.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn pretty_print_matches_reference_layout() {
        let mut doc = Document::parse_str("<r><a/><b/></r>").unwrap();
        assert_eq!(doc.to_string_pretty(), "<r>\n    <a/>\n    <b/>\n</r>\n");
    }

    #[test]
    fn compact_print_has_no_inserted_whitespace() {
        let mut doc = Document::parse_str("<r><a/><b/></r>").unwrap();
        assert_eq!(doc.to_string_compact(), "<r><a/><b/></r>");
    }

    #[test]
    fn text_round_trips_with_entity_escaping() {
        let mut doc = Document::parse_str("<r>&lt;x&amp;y&gt;</r>").unwrap();
        assert_eq!(doc.to_string_compact(), "<r>&lt;x&amp;y&gt;</r>");
    }

    #[test]
    fn attribute_values_use_restricted_escaping() {
        let mut doc = Document::new(crate::DocumentConfig::default());
        let root = doc.new_element("r");
        doc.insert_end_child(None, root.id());
        doc.set_attribute(root, "a", "1 & 2");
        assert_eq!(doc.to_string_compact(), r#"<r a="1 &amp; 2"/>"#);
    }

    #[test]
    fn cdata_is_never_entity_escaped() {
        let mut doc = Document::new(crate::DocumentConfig::default());
        let root = doc.new_element("r");
        doc.insert_end_child(None, root.id());
        let text = doc.new_text("<raw & stuff>");
        doc.set_cdata(text, true);
        doc.insert_end_child(Some(root), text);
        assert_eq!(doc.to_string_compact(), "<r><![CDATA[<raw & stuff>]]></r>");
    }

    #[test]
    fn bom_is_emitted_when_set() {
        let mut doc = Document::new(crate::DocumentConfig::default());
        doc.set_bom(true);
        let root = doc.new_element("r");
        doc.insert_end_child(None, root.id());
        let out = doc.to_string_compact();
        assert_eq!(&out.as_bytes()[..3], &[0xEF, 0xBB, 0xBF]);
    }
}
