#![no_main]

use lanelet_strip_builder::{build_strip, parse_sample_records, LaneletMap, LaneletProfile, StripOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(sequences) = parse_sample_records(text, ',') else {
        return;
    };
    // Geparste Samples sind immer rechteckig; der Aufbau darf nur an der Anzahl scheitern
    let mut map = LaneletMap::default();
    let _ = build_strip(
        &mut map,
        &sequences,
        StripOptions {
            close_ring: true,
            with_centerline: true,
        },
        &LaneletProfile::default(),
    );
});
