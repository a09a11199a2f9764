//! Lanelet Strip Builder Library.
//! Baut Lanelet-Netze aus parallelen Randkurven-Samples und beantwortet Topologie-Abfragen.

pub mod app;
pub mod builder;
pub mod core;
pub mod osm;
pub mod query;
pub mod samples;
pub mod shared;

pub use app::{LoadReport, MapFacade, MapInfo};
pub use builder::{build_strip, StripOptions, StripReport};
pub use core::{
    AttributeMap, GeoPoint, GeometryEngine, Id, Lanelet, LaneletError, LaneletMap, LaneletPath,
    LineString, MercatorProjector, Origin, PlanarGeometry, Point, Projector, RoutingGraph,
    TrafficRules,
};
pub use osm::{parse_osm, write_osm, MapFormat, OsmFormat};
pub use samples::{parse_sample_records, read_sample_file};
pub use shared::{BuilderOptions, LaneletProfile};
