#![no_main]

use std::cell::Cell;
use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use xml_mini::{budget, options};

// Biases inputs toward internal DTD subsets: the fuzz input becomes entity bodies that
// reference each other, under a small budget that must always hold.
fuzz_target!(|data: &[u8]| {
    if data.len() > 4 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data).replace('"', "");

    let xml = format!(
        "<!DOCTYPE f [\n<!ENTITY c \"{s}\">\n<!ENTITY b \"&c;&c;&c;{s}\">\n<!ENTITY a \"&b;&b;&b;&b;\">\n]>\n<f a=\"&b;\">&a;{s}</f>"
    );
    let options = options! {
        budget: budget! {
            max_entity_expansions: 64,
            max_expansion_bytes: 64 * 1024,
            max_entity_nesting: 8,
        },
    };

    let expansions = Rc::new(Cell::new(0));
    let seen = expansions.clone();
    let options = options.with_budget_report(move |report| seen.set(report.expansions));
    let _ = xml_mini::from_str_with_options(&xml, options);
    // The counter stops one past the ceiling.
    assert!(expansions.get() <= 65);
});
