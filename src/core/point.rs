//! Ein Stützpunkt des Lanelet-Netzes.

use glam::DVec3;

use super::Id;

/// Einzelner Punkt mit lokalen, planaren Koordinaten (z bleibt beim Strip-Aufbau 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Eindeutige ID
    pub id: Id,
    /// Lokale Position in Metern
    pub position: DVec3,
}

impl Point {
    /// Erstellt einen neuen Punkt
    pub fn new(id: Id, position: DVec3) -> Self {
        Self { id, position }
    }

    /// Erstellt einen Punkt in der Ebene (z = 0)
    pub fn planar(id: Id, x: f64, y: f64) -> Self {
        Self::new(id, DVec3::new(x, y, 0.0))
    }
}
