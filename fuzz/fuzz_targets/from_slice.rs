#![no_main]

use libfuzzer_sys::fuzz_target;
use xml_mini::{Options, budget, options};

// Arbitrary bytes through the decoder. Anything that decodes must encode again.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let options = options! {
        trusted: data.first().is_some_and(|b| b & 1 == 1),
        budget: budget! { max_nodes: 10_000, max_depth: 256 },
    };
    if let Ok(value) = xml_mini::from_slice_with_options(data, options) {
        xml_mini::to_string(&value).expect("decoded values encode");
    }
    let _ = xml_mini::from_slice_with_options(data, Options::default());
});
