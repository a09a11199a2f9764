//! Lanelet2-OSM Import/Export.
//!
//! Punkte werden als `<node>` mit lat/lon gespeichert, Randkurven als `<way>`,
//! Lanelets als `<relation>` mit `type=lanelet` und den Rollen `left`, `right`, `centerline`.

pub mod parser;
pub mod writer;

use std::path::Path;

use anyhow::Context;

use crate::core::{LaneletMap, Projector};

pub use parser::parse_osm;
pub use writer::write_osm;

/// Persistenz-Schnittstelle für Lanelet-Maps.
///
/// Beide Richtungen liefern neben dem Ergebnis eine Liste nicht-fataler Meldungen.
pub trait MapFormat {
    /// Lädt eine Map; übersprungene Primitive werden als Meldung gemeldet.
    fn load(
        &self,
        path: &Path,
        projector: &dyn Projector,
    ) -> anyhow::Result<(LaneletMap, Vec<String>)>;

    /// Schreibt eine Map; nicht schreibbare Primitive werden als Meldung gemeldet.
    fn save(
        &self,
        path: &Path,
        map: &LaneletMap,
        projector: &dyn Projector,
    ) -> anyhow::Result<Vec<String>>;
}

/// Standard-Format: Lanelet2-kompatibles OSM-XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsmFormat;

impl MapFormat for OsmFormat {
    fn load(
        &self,
        path: &Path,
        projector: &dyn Projector,
    ) -> anyhow::Result<(LaneletMap, Vec<String>)> {
        let xml_content = std::fs::read_to_string(path)
            .with_context(|| format!("OSM-Datei nicht lesbar: {}", path.display()))?;
        log::info!("using OSM: {}", path.display());
        parse_osm(&xml_content, projector)
    }

    fn save(
        &self,
        path: &Path,
        map: &LaneletMap,
        projector: &dyn Projector,
    ) -> anyhow::Result<Vec<String>> {
        let (xml, errors) = write_osm(map, projector)?;
        std::fs::write(path, xml)
            .with_context(|| format!("OSM-Datei nicht schreibbar: {}", path.display()))?;
        Ok(errors)
    }
}
