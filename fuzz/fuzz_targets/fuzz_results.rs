#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(artifact) =
            norma_model::loader::parse_results(s, std::path::Path::new("fuzz.json"))
        {
            let analysis = norma_engine::analyze_artifact(&artifact);
            assert_eq!(analysis.num_predicates, artifact.catalog.len());
        }
    }
});
