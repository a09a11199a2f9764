//! Geordneter Polygonzug aus Punkt-Referenzen (Randkurve oder Mittellinie).

use super::{AttributeMap, Id};

/// Randkurve eines Lanelets. Die Reihenfolge der Punkte ist die Fahrtrichtung.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    /// Eindeutige ID
    pub id: Id,
    /// Punkt-IDs in geometrischer Reihenfolge (mindestens zwei)
    pub points: Vec<Id>,
    /// Optionale Tags (werden beim OSM-Roundtrip erhalten)
    pub attributes: AttributeMap,
}

impl LineString {
    /// Erstellt eine Kurve ohne Attribute
    pub fn new(id: Id, points: Vec<Id>) -> Self {
        Self {
            id,
            points,
            attributes: AttributeMap::new(),
        }
    }

    /// Erster Punkt der Kurve
    pub fn front(&self) -> Option<Id> {
        self.points.first().copied()
    }

    /// Letzter Punkt der Kurve
    pub fn back(&self) -> Option<Id> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
