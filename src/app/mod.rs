//! Application-Layer: Facade über Map, Builder, Routing und Persistenz.

pub mod facade;
pub mod report;

pub use facade::MapFacade;
pub use report::{LoadReport, MapInfo};
