#![no_main]

use lanelet_strip_builder::{parse_osm, MercatorProjector, Origin};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        let projector = MercatorProjector::new(Origin::new(49.0, 8.4));
        // Darf scheitern, aber nie paniken
        let _ = parse_osm(xml, &projector);
    }
});
