#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(query) = norma_engine::PathQuery::parse(s) {
            // Whatever parses must print back to the same query.
            let reparsed = norma_engine::PathQuery::parse(&query.to_string());
            assert_eq!(reparsed.ok(), Some(query));
        }
    }
});
