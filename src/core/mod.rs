//! Core-Domänentypen: Punkte, Randkurven, Lanelets, LaneletMap, Projektion, Routing.

pub mod error;
pub mod geometry;
pub mod lanelet;
/// Core-Datenmodelle des Lanelet-Netzes
///
/// - LaneletMap: Container für Punkte, Randkurven und Lanelets
/// - LineString: Randkurve aus Punkt-Referenzen
/// - Lanelet: Fahrstreifen-Zelle zwischen zwei Randkurven
pub mod lanelet_map;
pub mod line_string;
pub mod point;
pub mod projection;
pub mod routing;
pub mod spatial;

/// Gemeinsamer ID-Typ aller Primitive (OSM erlaubt negative IDs).
pub type Id = i64;

/// Attribut-Tabelle eines Primitivs (Reihenfolge = Einfügereihenfolge).
pub type AttributeMap = indexmap::IndexMap<String, String>;

pub use error::{LaneletError, Result};
pub use geometry::{GeometryEngine, LaneletMatch, PlanarGeometry};
pub use lanelet::Lanelet;
pub use lanelet_map::LaneletMap;
pub use line_string::LineString;
pub use point::Point;
pub use projection::{GeoPoint, MercatorProjector, Origin, Projector};
pub use routing::{LaneletPath, RoutingGraph, TrafficRules};
pub use spatial::{SpatialIndex, SpatialMatch};
