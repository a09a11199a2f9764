//! Zentrale Facade: hält Map, Routing-Graph-Cache und die austauschbaren Kollaborateure.

use std::path::Path;

use glam::{DVec2, DVec3};

use super::report::{LoadReport, MapInfo};
use crate::builder::{self, StripOptions, StripReport};
use crate::core::{
    GeoPoint, GeometryEngine, Id, Lanelet, LaneletError, LaneletMap, LaneletPath, LineString,
    MercatorProjector, Origin, PlanarGeometry, Point, Projector, Result, RoutingGraph,
    TrafficRules,
};
use crate::osm::{MapFormat, OsmFormat};
use crate::query;
use crate::samples;
use crate::shared::BuilderOptions;

/// Ein Handle für Aufbau, Persistenz und Abfragen eines Lanelet-Netzes.
///
/// Der Routing-Graph wird beim ersten Bedarf gebaut und danach gecacht.
/// Nach Änderungen an der Map wird er nicht automatisch neu gebaut;
/// `is_routing_graph_stale` zeigt das an, `rebuild_routing_graph` behebt es.
pub struct MapFacade {
    map: LaneletMap,
    routing_graph: Option<RoutingGraph>,
    options: BuilderOptions,
    projector: Box<dyn Projector>,
    geometry: Box<dyn GeometryEngine>,
    /// `true`, sobald über `with_geometry` eine eigene Engine gesetzt wurde
    custom_geometry: bool,
    format: Box<dyn MapFormat>,
    load_errors: Vec<String>,
}

impl MapFacade {
    /// Leere Map mit Mercator-Projektion um den Origin und Standard-Optionen.
    pub fn new(origin: Origin) -> Self {
        let options = BuilderOptions {
            origin,
            ..BuilderOptions::default()
        };
        Self {
            map: LaneletMap::new(origin),
            routing_graph: None,
            geometry: Box::new(PlanarGeometry::new(options.contains_tolerance)),
            custom_geometry: false,
            projector: Box::new(MercatorProjector::new(origin)),
            format: Box::new(OsmFormat),
            options,
            load_errors: Vec::new(),
        }
    }

    /// Übernimmt Optionen (Profil, Verkehrsregeln, Toleranz, Trennzeichen).
    ///
    /// Der Origin der Facade bleibt unverändert, ein gecachter Routing-Graph wird
    /// verworfen. Die Standard-Geometrie übernimmt die Toleranz der Optionen; eine
    /// über `with_geometry` gesetzte Engine bleibt erhalten.
    pub fn with_options(mut self, options: BuilderOptions) -> Self {
        if !self.custom_geometry {
            self.geometry = Box::new(PlanarGeometry::new(options.contains_tolerance));
        }
        self.options = BuilderOptions {
            origin: self.map.origin,
            ..options
        };
        self.routing_graph = None;
        self
    }

    pub fn with_projector(mut self, projector: Box<dyn Projector>) -> Self {
        let origin = projector.origin();
        self.map.origin = origin;
        self.options.origin = origin;
        self.projector = projector;
        self
    }

    pub fn with_geometry(mut self, geometry: Box<dyn GeometryEngine>) -> Self {
        self.geometry = geometry;
        self.custom_geometry = true;
        self
    }

    pub fn with_format(mut self, format: Box<dyn MapFormat>) -> Self {
        self.format = format;
        self
    }

    // ── Persistenz ─────────────────────────────────────────────────

    /// Lädt eine Map über das Standard-Format.
    pub fn load(path: &Path, origin: Origin) -> Result<(Self, LoadReport)> {
        let mut facade = Self::new(origin);
        let report = facade.load_file(path)?;
        Ok((facade, report))
    }

    /// Ersetzt die gehaltene Map durch den Inhalt der Datei (mit den konfigurierten
    /// Kollaborateuren). Schlägt das Format fehl, bleibt die bisherige Map erhalten.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport> {
        let (mut map, errors) = self
            .format
            .load(path, self.projector.as_ref())
            .map_err(|e| LaneletError::LoadFailure(vec![format!("{e:#}")]))?;
        map.ensure_spatial_index();

        self.map = map;
        self.routing_graph = None;
        self.load_errors = errors.clone();

        log::info!(
            "Map geladen: {} Lanelets, {} Randkurven, {} Punkte ({} Meldungen)",
            self.map.lanelet_count(),
            self.map.line_string_count(),
            self.map.point_count(),
            errors.len()
        );
        Ok(LoadReport {
            lanelets: self.map.lanelet_count(),
            errors,
        })
    }

    /// Schreibt die Map; liefert nicht-fatale Meldungen des Formats.
    pub fn save(&self, path: &Path) -> Result<Vec<String>> {
        let errors = self
            .format
            .save(path, &self.map, self.projector.as_ref())
            .map_err(|e| LaneletError::SaveFailure(vec![format!("{e:#}")]))?;
        log::info!(
            "Map gespeichert nach {} ({} Meldungen)",
            path.display(),
            errors.len()
        );
        Ok(errors)
    }

    // ── Aufbau ─────────────────────────────────────────────────────

    /// Baut einen Strip mit dem Lanelet-Profil der Optionen.
    pub fn build_strip(
        &mut self,
        sequences: &[Vec<DVec2>],
        strip_options: StripOptions,
    ) -> Result<StripReport> {
        builder::build_strip(
            &mut self.map,
            sequences,
            strip_options,
            &self.options.profile,
        )
    }

    /// Liest eine Sample-Datei und baut daraus einen Strip.
    pub fn build_strip_from_file(
        &mut self,
        path: &Path,
        strip_options: StripOptions,
    ) -> Result<StripReport> {
        let sequences = samples::read_sample_file(path, self.options.sample_delimiter)?;
        self.build_strip(&sequences, strip_options)
    }

    // ── Routing ────────────────────────────────────────────────────

    /// Routing-Graph, beim ersten Zugriff gebaut.
    pub fn routing_graph(&mut self) -> &RoutingGraph {
        cached_graph(
            &mut self.routing_graph,
            &self.map,
            &self.options.traffic_rules,
        )
    }

    pub fn rebuild_routing_graph(&mut self) -> &RoutingGraph {
        self.routing_graph = None;
        self.routing_graph()
    }

    pub fn invalidate_routing_graph(&mut self) {
        self.routing_graph = None;
    }

    /// `true`, wenn ein gecachter Graph existiert, die Map sich aber seitdem geändert hat.
    pub fn is_routing_graph_stale(&self) -> bool {
        self.routing_graph
            .as_ref()
            .is_some_and(|graph| graph.is_stale(&self.map))
    }

    /// Erster Nachfolger in Fahrtrichtung.
    pub fn following(&mut self, lanelet_id: Id) -> Result<&Lanelet> {
        let graph = cached_graph(
            &mut self.routing_graph,
            &self.map,
            &self.options.traffic_rules,
        );
        if graph.is_stale(&self.map) {
            log::warn!("Routing-Graph ist veraltet; Ergebnis kann fehlen oder falsch sein");
        }
        query::following(&self.map, graph, lanelet_id)
    }

    pub fn previous(&mut self, lanelet_id: Id) -> Vec<&Lanelet> {
        let graph = cached_graph(
            &mut self.routing_graph,
            &self.map,
            &self.options.traffic_rules,
        );
        query::previous(&self.map, graph, lanelet_id)
    }

    pub fn shortest_path(&mut self, from: Id, to: Id) -> Option<LaneletPath> {
        self.routing_graph().shortest_path(from, to)
    }

    // ── Nachbarn & Lokalisierung ───────────────────────────────────

    pub fn left_neighbor(&self, lanelet_id: Id) -> Option<&Lanelet> {
        query::left_neighbor(&self.map, lanelet_id)
    }

    pub fn right_neighbor(&self, lanelet_id: Id) -> Option<&Lanelet> {
        query::right_neighbor(&self.map, lanelet_id)
    }

    /// Lanelet, das den lokalen Punkt enthält.
    pub fn lanelet_at(&self, position: DVec2) -> Option<Id> {
        query::lanelet_containing(&self.map, self.geometry.as_ref(), position)
    }

    /// Lanelet, das die geographische Position enthält.
    pub fn lanelet_at_geo(&self, lat: f64, lon: f64) -> Option<Id> {
        let local = self.projector.forward(GeoPoint::new(lat, lon, 0.0));
        self.lanelet_at(local.truncate())
    }

    // ── Lookup ─────────────────────────────────────────────────────

    pub fn lanelet(&self, id: Id) -> Option<&Lanelet> {
        query::lookup_lanelet(&self.map, id)
    }

    pub fn point(&self, id: Id) -> Option<&Point> {
        query::lookup_point(&self.map, id)
    }

    pub fn line_string(&self, id: Id) -> Option<&LineString> {
        query::lookup_line_string(&self.map, id)
    }

    pub fn left_bound(&self, lanelet_id: Id) -> Option<&LineString> {
        query::left_bound(&self.map, lanelet_id)
    }

    pub fn right_bound(&self, lanelet_id: Id) -> Option<&LineString> {
        query::right_bound(&self.map, lanelet_id)
    }

    pub fn line_points(&self, line_id: Id) -> Option<Vec<DVec3>> {
        self.map.line_points(line_id)
    }

    pub fn centerline(&self, lanelet_id: Id) -> Option<Vec<DVec3>> {
        query::centerline(&self.map, lanelet_id)
    }

    // ── Zustand ────────────────────────────────────────────────────

    pub fn map(&self) -> &LaneletMap {
        &self.map
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn origin(&self) -> Origin {
        self.map.origin
    }

    pub fn load_errors(&self) -> &[String] {
        &self.load_errors
    }

    pub fn info(&self) -> MapInfo {
        MapInfo {
            lanelets: self.map.lanelet_count(),
            line_strings: self.map.line_string_count(),
            points: self.map.point_count(),
            load_errors: self.load_errors.clone(),
        }
    }
}

impl Default for MapFacade {
    fn default() -> Self {
        Self::new(Origin::default())
    }
}

fn cached_graph<'a>(
    slot: &'a mut Option<RoutingGraph>,
    map: &LaneletMap,
    rules: &TrafficRules,
) -> &'a RoutingGraph {
    slot.get_or_insert_with(|| RoutingGraph::build(map, rules))
}
