extern crate afl;
extern crate picoxml;

use afl::fuzz;

fn main() {
    fuzz(|data| {
        let mut doc = picoxml::Document::new(picoxml::DocumentConfig::default());
        let _ = doc.parse(data.to_vec());
    });
}
