extern crate picoxml;
#[macro_use]
extern crate pretty_assertions;

use picoxml::{ClosingType, Document, DocumentConfig, ErrorId};

#[test]
fn scenario_01_self_closing_with_attributes() {
    let mut doc = Document::parse_str(r#"<r a="1" b='two'/>"#).unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(doc.closing_type(root), ClosingType::Closed);
    assert_eq!(doc.attribute(root, "a"), Some("1"));
    assert_eq!(doc.attribute(root, "b"), Some("two"));
    assert_eq!(doc.first_child(root.id()), None);
    assert!(doc.error().is_none());
}

#[test]
fn scenario_02_entity_round_trip() {
    let mut doc = Document::parse_str("<r>&lt;x&amp;y&gt;</r>").unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "<x&y>");
    assert_eq!(doc.to_string_compact(), "<r>&lt;x&amp;y&gt;</r>");
}

#[test]
fn scenario_03_numeric_character_references() {
    let mut doc = Document::parse_str("<r>&#65;&#x42;</r>").unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "AB");
}

#[test]
fn scenario_04_compact_false_exact_layout() {
    let mut doc = Document::parse_str("<r><a/><b/></r>").unwrap();
    assert_eq!(doc.to_string_pretty(), "<r>\n    <a/>\n    <b/>\n</r>\n");
}

#[test]
fn scenario_05_newline_normalization() {
    let mut doc = Document::new(DocumentConfig::default());
    doc.parse(b"<r>\r\ntext\r</r>".to_vec()).unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "\ntext\n");
}

#[test]
fn scenario_06_mismatched_element_reports_line() {
    let mut doc = Document::new(DocumentConfig::default());
    let err = doc.parse(b"<r><a></b></r>".to_vec()).unwrap_err();
    assert_eq!(err.id, ErrorId::MismatchedElement);
    assert_eq!(err.line, 1);
}

#[test]
fn scenario_07_declaration_after_content_is_rejected() {
    let mut doc = Document::new(DocumentConfig::default());
    let err = doc.parse(b"<?xml v?><r/><?xml w?>".to_vec()).unwrap_err();
    assert_eq!(err.id, ErrorId::ParsingDeclaration);
}

#[test]
fn scenario_08_empty_buffer_is_an_error() {
    let mut doc = Document::new(DocumentConfig::default());
    let err = doc.parse(Vec::new()).unwrap_err();
    assert_eq!(err.id, ErrorId::EmptyDocument);
}

// ---- Testable properties (spec §8) beyond the literal scenario table ----

fn accept_print_reparse_compare(src: &str) {
    let mut first = Document::parse_str(src).unwrap();
    let printed = first.to_string_compact();
    let mut second = Document::parse_str(&printed).unwrap();
    let a = first.root_element().unwrap().id();
    let b = second.root_element().unwrap().id();
    assert!(first.shallow_equal(a, b));
}

#[test]
fn property_round_trip_shallow_equal() {
    accept_print_reparse_compare(r#"<r a="1" b="two"><c/><d>hi</d></r>"#);
}

#[test]
fn property_line_number_correctness() {
    let mut doc = Document::parse_str("<r>\n  <a/>\n  <b/>\n</r>").unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(doc.node_line(root.id()), 1);
    let a = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.node_line(a), 2);
    let b = doc.next_sibling(a).unwrap();
    assert_eq!(doc.node_line(b), 3);
}

#[test]
fn property_entity_idempotence_all_five() {
    let mut doc = Document::parse_str("<r>&amp;&lt;&gt;&quot;&apos;</r>").unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "&<>\"'");
    let printed = doc.to_string_compact();
    let mut reparsed = Document::parse_str(&printed).unwrap();
    let root2 = reparsed.root_element().unwrap();
    let text2 = reparsed.first_child(root2.id()).unwrap();
    assert_eq!(reparsed.text_value(text2), "&<>\"'");
}

#[test]
fn property_cdata_never_entity_escaped() {
    let mut doc = Document::new(DocumentConfig::default());
    let root = doc.new_element("r");
    doc.insert_end_child(None, root.id());
    let text = doc.new_text("<a & b>");
    doc.set_cdata(text, true);
    doc.insert_end_child(Some(root), text);
    let printed = doc.to_string_compact();
    assert_eq!(printed, "<r><![CDATA[<a & b>]]></r>");
}

#[test]
fn property_depth_ceiling_no_crash() {
    let mut src = String::new();
    for _ in 0..(picoxml::MAX_ELEMENT_DEPTH + 10) {
        src.push_str("<a>");
    }
    let mut doc = Document::new(DocumentConfig::default());
    let err = doc.parse(src.into_bytes()).unwrap_err();
    assert_eq!(err.id, ErrorId::ElementDepthExceeded);
}

#[test]
fn property_attribute_uniqueness() {
    let mut doc = Document::new(DocumentConfig::default());
    let err = doc.parse(br#"<r a="1" a="2"/>"#.to_vec()).unwrap_err();
    assert_eq!(err.id, ErrorId::ParsingAttribute);
}

#[test]
fn property_same_document_invariant() {
    let mut a = Document::new(DocumentConfig::default());
    let mut b = Document::new(DocumentConfig::default());
    let foreign = a.new_element("x");
    assert!(!b.insert_end_child(None, foreign.id()));
    assert_eq!(b.first_node(), None);
    // the node is still alive and unlinked in its home document
    assert_eq!(a.element_name(foreign), "x");
}

#[test]
fn whitespace_between_tags_is_preserved_as_text() {
    let mut doc = Document::parse_str("<r>\n    Text1\n    <item/>\n    Text3\n</r>").unwrap();
    let root = doc.root_element().unwrap();
    let first = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(first), "\n    Text1\n    ");
}

#[test]
fn collapse_whitespace_mode_trims_and_folds() {
    let config = DocumentConfig { whitespace_mode: picoxml::WhitespaceMode::CollapseWhitespace, ..Default::default() };
    let mut doc = Document::parse_str_with("<r>   a   b   </r>", config).unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "a b");
}

#[test]
fn unknown_entity_passes_through_in_a_full_parse() {
    let mut doc = Document::parse_str("<r>a&bogus;b</r>").unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "a&bogus;b");
}

#[test]
fn process_entities_off_leaves_text_verbatim() {
    let config = DocumentConfig { process_entities: false, ..Default::default() };
    let mut doc = Document::parse_str_with("<r>&amp;</r>", config).unwrap();
    let root = doc.root_element().unwrap();
    let text = doc.first_child(root.id()).unwrap();
    assert_eq!(doc.text_value(text), "&amp;");
}

#[test]
fn typed_attribute_and_text_conversions() {
    let mut doc = Document::parse_str(
        r#"<book id="bk101" price="44.95" available="true"><rating>7</rating></book>"#,
    )
    .unwrap();
    let root = doc.root_element().unwrap();
    assert_eq!(doc.query_int32_attribute(root, "id"), Err(picoxml::QueryError::WrongAttributeType));
    assert_eq!(doc.query_double_attribute(root, "price"), Ok(44.95));
    assert_eq!(doc.query_bool_attribute(root, "available"), Ok(true));
    assert_eq!(doc.unsigned_attribute_or(root, "missing", 7), 7);

    let rating = doc.first_child_element(Some(root), Some("rating")).unwrap();
    assert_eq!(doc.query_int_text(rating), Ok(7));
    assert_eq!(doc.float_text_or(rating, -1.0), 7.0);
}
