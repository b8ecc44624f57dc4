#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // The vector decoder must never panic; partitions only hold decoded models.
        let file = norma_model::loader::parse_vectors(s, Some(64));
        assert!(file.team.len() <= 64);
        let in_partitions: usize = file.partitions.iter().map(|p| p.models().len()).sum();
        assert!(in_partitions <= file.team.len());
    }
});
