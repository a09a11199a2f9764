//! Planare Geometrie-Primitive und die austauschbare Geometrie-Schnittstelle.

use glam::DVec2;

use super::{Id, LaneletMap};

/// Standard-Toleranz für Randpunkte bei der Enthaltensein-Prüfung (Meter).
pub const DEFAULT_CONTAINS_TOLERANCE: f64 = 1e-9;

/// Treffer einer Nächste-Lanelets-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneletMatch {
    /// ID des Lanelets
    pub lanelet_id: Id,
    /// Abstand zum Lanelet-Polygon (0 wenn innerhalb)
    pub distance: f64,
}

/// Geometrie-Fähigkeiten, die die Abfrage-Schicht von außen bezieht.
pub trait GeometryEngine {
    /// Liefert bis zu `count` Lanelets, aufsteigend nach Abstand zum Suchpunkt.
    fn nearest(&self, map: &LaneletMap, query: DVec2, count: usize) -> Vec<LaneletMatch>;

    /// Prüft, ob das Lanelet den Punkt enthält (Rand inklusive).
    fn contains(&self, map: &LaneletMap, lanelet_id: Id, query: DVec2) -> bool;
}

/// Standard-Implementierung: KD-Tree-Vorfilter aus der Map + exakte Polygon-Prüfung.
#[derive(Debug, Clone, Copy)]
pub struct PlanarGeometry {
    /// Abstand, ab dem ein Punkt noch als "auf dem Rand" gilt
    pub tolerance: f64,
}

impl Default for PlanarGeometry {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_CONTAINS_TOLERANCE,
        }
    }
}

impl PlanarGeometry {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl GeometryEngine for PlanarGeometry {
    fn nearest(&self, map: &LaneletMap, query: DVec2, count: usize) -> Vec<LaneletMatch> {
        if count == 0 || map.lanelet_count() == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<Id> = match map.spatial_index() {
            Some(index) => index.candidates(query),
            None => {
                log::debug!("Spatial-Index veraltet, durchsuche alle Lanelets");
                map.lanelets_iter().map(|l| l.id).collect()
            }
        };
        // Gleichstand beim Abstand → früher eingefügtes Lanelet gewinnt
        candidates.sort_by_key(|id| map.lanelet_order(*id).unwrap_or(usize::MAX));

        let mut matches: Vec<LaneletMatch> = candidates
            .into_iter()
            .filter_map(|id| {
                let polygon = map.lanelet_polygon(id)?;
                Some(LaneletMatch {
                    lanelet_id: id,
                    distance: distance_to_polygon(&polygon, query),
                })
            })
            .collect();

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(count);
        matches
    }

    fn contains(&self, map: &LaneletMap, lanelet_id: Id, query: DVec2) -> bool {
        map.lanelet_polygon(lanelet_id)
            .is_some_and(|polygon| polygon_covers(&polygon, query, self.tolerance))
    }
}

/// Abstand eines Punktes zur Strecke `a`–`b`.
pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Kleinster Abstand zum Rand eines (implizit geschlossenen) Polygons.
pub fn distance_to_boundary(polygon: &[DVec2], p: DVec2) -> f64 {
    match polygon.len() {
        0 => f64::INFINITY,
        1 => p.distance(polygon[0]),
        n => (0..n)
            .map(|i| distance_to_segment(p, polygon[i], polygon[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Ray-Casting-Test (Punkte exakt auf dem Rand sind nicht eindeutig).
pub fn polygon_contains(polygon: &[DVec2], p: DVec2) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Enthaltensein inklusive Rand (covered-by).
pub fn polygon_covers(polygon: &[DVec2], p: DVec2, tolerance: f64) -> bool {
    distance_to_boundary(polygon, p) <= tolerance || polygon_contains(polygon, p)
}

/// Abstand zum Polygon: 0 innerhalb, sonst Abstand zum Rand.
pub fn distance_to_polygon(polygon: &[DVec2], p: DVec2) -> f64 {
    if polygon_contains(polygon, p) {
        0.0
    } else {
        distance_to_boundary(polygon, p)
    }
}

/// Länge eines Polygonzugs.
pub fn polyline_length(points: &[DVec2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Paarweise Mittelpunkte zweier gleich langer Punktfolgen.
pub fn midpoints<T>(left: &[T], right: &[T]) -> Option<Vec<T>>
where
    T: Copy + std::ops::Add<Output = T> + std::ops::Mul<f64, Output = T>,
{
    if left.len() != right.len() {
        return None;
    }
    Some(
        left.iter()
            .zip(right)
            .map(|(&l, &r)| (l + r) * 0.5)
            .collect(),
    )
}
