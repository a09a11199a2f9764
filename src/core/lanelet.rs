//! Eine befahrbare Fahrstreifen-Zelle zwischen zwei Randkurven.

use super::{AttributeMap, Id};

/// Lanelet mit linker/rechter Randkurve und optionaler expliziter Mittellinie.
///
/// Die Randkurven werden per ID referenziert, nie kopiert. Zwei Lanelets, die dieselbe
/// Kurve nutzen, sind seitliche Nachbarn.
#[derive(Debug, Clone, PartialEq)]
pub struct Lanelet {
    /// Eindeutige ID
    pub id: Id,
    /// Linke Randkurve
    pub left: Id,
    /// Rechte Randkurve
    pub right: Id,
    /// Explizite Mittellinie (sonst aus den Rändern abgeleitet)
    pub centerline: Option<Id>,
    /// Attribute wie `location`, `one_way`, `region`, `subtype`
    pub attributes: AttributeMap,
}

impl Lanelet {
    /// Erstellt ein Lanelet ohne Mittellinie und ohne Attribute
    pub fn new(id: Id, left: Id, right: Id) -> Self {
        Self {
            id,
            left,
            right,
            centerline: None,
            attributes: AttributeMap::new(),
        }
    }

    /// Setzt die explizite Mittellinie
    pub fn with_centerline(mut self, centerline: Id) -> Self {
        self.centerline = Some(centerline);
        self
    }

    /// Setzt die Attribute
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Liest ein Attribut
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Prüft, ob die Kurve als linker oder rechter Rand genutzt wird
    pub fn uses_bound(&self, line_id: Id) -> bool {
        self.left == line_id || self.right == line_id
    }
}
