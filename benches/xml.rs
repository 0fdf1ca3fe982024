#![allow(dead_code)]

#[macro_use]
extern crate bencher;

extern crate picoxml;

use bencher::Bencher;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog>
    <!-- a representative mix of elements, attributes, and text -->
    <book id="bk101" available="true">
        <author>Gambardella, Matthew</author>
        <title>XML Developer's Guide</title>
        <genre>Computer</genre>
        <price>44.95</price>
        <description>An in-depth look at creating applications
        with XML, covering &lt;tags&gt; &amp; namespaces.</description>
    </book>
    <book id="bk102" available="false">
        <author>Ralls, Kim</author>
        <title>Midnight Rain</title>
        <genre>Fantasy</genre>
        <price>5.95</price>
        <description>A former architect battles corporate zombies.</description>
    </book>
</catalog>"#;

fn parse(bencher: &mut Bencher) {
    bencher.iter(|| picoxml::Document::parse_str(SAMPLE).unwrap())
}

fn parse_and_print_pretty(bencher: &mut Bencher) {
    bencher.iter(|| {
        let mut doc = picoxml::Document::parse_str(SAMPLE).unwrap();
        doc.to_string_pretty()
    })
}

fn parse_and_print_compact(bencher: &mut Bencher) {
    bencher.iter(|| {
        let mut doc = picoxml::Document::parse_str(SAMPLE).unwrap();
        doc.to_string_compact()
    })
}

benchmark_group!(round_trip, parse, parse_and_print_pretty, parse_and_print_compact);
benchmark_main!(round_trip);
