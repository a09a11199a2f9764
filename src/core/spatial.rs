//! Spatial-Index (KD-Tree) über die Polygon-Eckpunkte aller Lanelets.

use glam::DVec2;
use indexmap::{IndexMap, IndexSet};
use kiddo::{KdTree, SquaredEuclidean};

use super::Id;

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des Lanelets, zu dem der gefundene Eckpunkt gehört
    pub lanelet_id: Id,
    /// Euklidische Distanz zum Eckpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über den Eckpunkten der Lanelet-Polygone.
///
/// Jede Position steht genau einmal im Baum; die Lanelets, die sie teilen,
/// hängen als Besitzerliste daran. Nicht-endliche Eckpunkte werden ignoriert.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    /// Besitzer je Baum-Eintrag (Einfügereihenfolge, ohne Duplikate)
    owners: Vec<Vec<Id>>,
    /// Längste Polygon-Kante, begrenzt den Suchradius für exakte Kandidaten
    max_edge: f64,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            owners: Vec::new(),
            max_edge: 0.0,
        }
    }

    /// Baut einen neuen Index aus den übergebenen Lanelet-Polygonen.
    pub fn from_polygons<I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = (Id, Vec<DVec2>)>,
    {
        let mut positions: IndexMap<[u64; 2], Vec<Id>> = IndexMap::new();
        let mut max_edge = 0.0f64;

        for (lanelet_id, polygon) in polygons {
            let n = polygon.len();
            for (i, vertex) in polygon.iter().enumerate() {
                if !vertex.is_finite() {
                    continue;
                }
                let owners = positions.entry(position_key(*vertex)).or_default();
                if owners.last() != Some(&lanelet_id) {
                    owners.push(lanelet_id);
                }
                let next = polygon[(i + 1) % n];
                if next.is_finite() {
                    max_edge = max_edge.max(vertex.distance(next));
                }
            }
        }

        let entries: Vec<[f64; 2]> = positions
            .keys()
            .map(|key| [f64::from_bits(key[0]), f64::from_bits(key[1])])
            .collect();
        let owners: Vec<Vec<Id>> = positions.into_values().collect();
        let tree: KdTree<f64, 2> = (&entries).into();

        Self {
            tree,
            owners,
            max_edge,
        }
    }

    /// Gibt die Anzahl indexierter (unterschiedlicher) Positionen zurück.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Gibt `true` zurück, wenn keine Eckpunkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Findet den nächsten Eckpunkt zur gegebenen Position.
    pub fn nearest_vertex(&self, query: DVec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&[query.x, query.y]);
        let lanelet_id = *self.owners.get(result.item as usize)?.first()?;

        Some(SpatialMatch {
            lanelet_id,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Eckpunkte innerhalb eines Radius um die Query-Position.
    pub fn within_radius(&self, query: DVec2, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y], radius * radius)
            .into_iter()
            .flat_map(|entry| {
                let distance = entry.distance.sqrt();
                self.owners
                    .get(entry.item as usize)
                    .into_iter()
                    .flatten()
                    .map(move |&lanelet_id| SpatialMatch {
                        lanelet_id,
                        distance,
                    })
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }

    /// Lanelets, die als nächstes Polygon zur Query-Position in Frage kommen.
    ///
    /// Liegt der nächste Eckpunkt im Abstand `d`, hat jedes Polygon mit Abstand `<= d`
    /// einen Eckpunkt innerhalb `d + max_edge`. Die exakte Prüfung erfolgt danach.
    pub fn candidates(&self, query: DVec2) -> Vec<Id> {
        let Some(nearest) = self.nearest_vertex(query) else {
            return Vec::new();
        };

        let radius = nearest.distance + self.max_edge;
        let unique: IndexSet<Id> = self
            .within_radius(query, radius)
            .into_iter()
            .map(|m| m.lanelet_id)
            .collect();
        unique.into_iter().collect()
    }
}

/// Bit-Schlüssel einer Position; `-0.0` wird auf `0.0` normalisiert.
fn position_key(vertex: DVec2) -> [u64; 2] {
    [(vertex.x + 0.0).to_bits(), (vertex.y + 0.0).to_bits()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x, y),
            DVec2::new(x + 1.0, y),
            DVec2::new(x + 1.0, y + 1.0),
            DVec2::new(x, y + 1.0),
        ]
    }

    fn sample_index() -> SpatialIndex {
        SpatialIndex::from_polygons(vec![(1, square(0.0, 0.0)), (2, square(10.0, 0.0))])
    }

    #[test]
    fn nearest_vertex_returns_owner() {
        let index = sample_index();
        let nearest = index
            .nearest_vertex(DVec2::new(10.9, 1.2))
            .expect("Treffer erwartet");

        assert_eq!(nearest.lanelet_id, 2);
        assert!(nearest.distance < 0.3);
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn radius_query_returns_sorted_matches() {
        let index = sample_index();
        let matches = index.within_radius(DVec2::new(-1.0, 0.0), 2.5);

        assert_eq!(matches.len(), 4);
        assert!(matches.iter().all(|m| m.lanelet_id == 1));
        assert!(matches.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn candidates_include_all_nearby_polygons() {
        let index = SpatialIndex::from_polygons(vec![(1, square(0.0, 0.0)), (2, square(1.0, 0.0))]);
        let mut ids = index.candidates(DVec2::new(1.0, 0.5));
        ids.sort_unstable();

        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn shared_positions_are_stored_once() {
        // 40 Lanelets, alle über denselben Eckpunkten (stehendes Fahrzeug)
        let polygons = (1..=40).map(|id| (id, square(0.0, 0.0)));
        let index = SpatialIndex::from_polygons(polygons);

        assert_eq!(index.len(), 4);
        let nearest = index.nearest_vertex(DVec2::new(0.1, 0.1)).expect("Treffer erwartet");
        assert_eq!(nearest.lanelet_id, 1);
        assert_eq!(index.within_radius(DVec2::ZERO, 0.5).len(), 40);
        assert_eq!(index.candidates(DVec2::new(0.5, 0.5)).len(), 40);
    }

    #[test]
    fn non_finite_vertices_are_skipped() {
        let polygon = vec![DVec2::new(f64::NAN, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)];
        let index = SpatialIndex::from_polygons(vec![(7, polygon)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest_vertex(DVec2::ZERO).map(|m| m.lanelet_id), Some(7));
    }

    #[test]
    fn empty_index_has_no_entries() {
        let index = SpatialIndex::empty();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.nearest_vertex(DVec2::ZERO).is_none());
        assert!(index.candidates(DVec2::ZERO).is_empty());
    }
}
