//! Topologie-Abfragen: Nachbarn, Nachfolger, Lokalisierung und Lookup per ID.
//!
//! Alle Funktionen arbeiten lesend auf einer `LaneletMap`; "nicht gefunden" ist
//! ein erwarteter Zustand und wird als `None` geliefert, nicht als Fehler.

use glam::{DVec2, DVec3};

use crate::core::{
    GeometryEngine, Id, Lanelet, LaneletError, LaneletMap, LineString, Point, Result,
    RoutingGraph,
};

// ── Nachbarschaft ───────────────────────────────────────────────────

/// Erstes andere Lanelet, das den linken Rand des Lanelets mitbenutzt.
///
/// Teilen sich mehr als zwei Lanelets eine Kurve, gewinnt der erste Treffer
/// in Einfügereihenfolge.
pub fn left_neighbor(map: &LaneletMap, lanelet_id: Id) -> Option<&Lanelet> {
    let lanelet = lookup_lanelet(map, lanelet_id)?;
    first_other_user(map, lanelet.left, lanelet_id)
}

/// Erstes andere Lanelet, das den rechten Rand des Lanelets mitbenutzt.
pub fn right_neighbor(map: &LaneletMap, lanelet_id: Id) -> Option<&Lanelet> {
    let lanelet = lookup_lanelet(map, lanelet_id)?;
    first_other_user(map, lanelet.right, lanelet_id)
}

fn first_other_user(map: &LaneletMap, line_id: Id, exclude: Id) -> Option<&Lanelet> {
    map.find_usages(line_id)
        .into_iter()
        .find(|candidate| candidate.id != exclude)
}

// ── Routing ─────────────────────────────────────────────────────────

/// Erster Nachfolger laut Routing-Graph.
///
/// Der Graph muss zur aktuellen Map passen; Veraltung prüft der Aufrufer.
pub fn following<'a>(
    map: &'a LaneletMap,
    graph: &RoutingGraph,
    lanelet_id: Id,
) -> Result<&'a Lanelet> {
    graph
        .following(lanelet_id)
        .into_iter()
        .find_map(|id| map.lanelet(id))
        .ok_or(LaneletError::NoSuccessor(lanelet_id))
}

/// Alle Vorgänger laut Routing-Graph, in Einfügereihenfolge.
pub fn previous<'a>(map: &'a LaneletMap, graph: &RoutingGraph, lanelet_id: Id) -> Vec<&'a Lanelet> {
    graph
        .previous(lanelet_id)
        .into_iter()
        .filter_map(|id| map.lanelet(id))
        .collect()
}

// ── Lokalisierung ───────────────────────────────────────────────────

/// Lanelet, in dem der Punkt liegt.
///
/// Nur das nächstgelegene Lanelet wird auf Enthaltensein geprüft; liegt der Punkt
/// nicht darin, ist das Ergebnis `None`.
pub fn lanelet_containing(
    map: &LaneletMap,
    geometry: &dyn GeometryEngine,
    query: DVec2,
) -> Option<Id> {
    let nearest = geometry.nearest(map, query, 1).into_iter().next()?;
    geometry
        .contains(map, nearest.lanelet_id, query)
        .then_some(nearest.lanelet_id)
}

// ── Lookup ──────────────────────────────────────────────────────────

pub fn lookup_lanelet(map: &LaneletMap, id: Id) -> Option<&Lanelet> {
    let found = map.lanelet(id);
    if found.is_none() {
        log::info!("Lanelet {} nicht gefunden", id);
    }
    found
}

pub fn lookup_point(map: &LaneletMap, id: Id) -> Option<&Point> {
    let found = map.point(id);
    if found.is_none() {
        log::info!("Punkt {} nicht gefunden", id);
    }
    found
}

pub fn lookup_line_string(map: &LaneletMap, id: Id) -> Option<&LineString> {
    let found = map.line_string(id);
    if found.is_none() {
        log::info!("Randkurve {} nicht gefunden", id);
    }
    found
}

/// Linker Rand eines Lanelets
pub fn left_bound(map: &LaneletMap, lanelet_id: Id) -> Option<&LineString> {
    lookup_line_string(map, lookup_lanelet(map, lanelet_id)?.left)
}

/// Rechter Rand eines Lanelets
pub fn right_bound(map: &LaneletMap, lanelet_id: Id) -> Option<&LineString> {
    lookup_line_string(map, lookup_lanelet(map, lanelet_id)?.right)
}

/// Mittellinie eines Lanelets (explizit oder aus den Rändern abgeleitet)
pub fn centerline(map: &LaneletMap, lanelet_id: Id) -> Option<Vec<DVec3>> {
    lookup_lanelet(map, lanelet_id)?;
    map.centerline(lanelet_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeMap, PlanarGeometry, TrafficRules};

    /// Drei parallele Kurven → zwei nebeneinanderliegende Lanelets (a: S0/S1, b: S1/S2).
    fn side_by_side() -> (LaneletMap, Id, Id) {
        let mut map = LaneletMap::default();
        let p: Vec<Id> = (0..6)
            .map(|i| map.add_point((i % 2) as f64 * 10.0, (i / 2) as f64 * 4.0).unwrap())
            .collect();
        let s0 = map.add_line_string(vec![p[0], p[1]]).unwrap();
        let s1 = map.add_line_string(vec![p[2], p[3]]).unwrap();
        let s2 = map.add_line_string(vec![p[4], p[5]]).unwrap();
        let a = map.add_lanelet(s0, s1, None, AttributeMap::new()).unwrap();
        let b = map.add_lanelet(s1, s2, None, AttributeMap::new()).unwrap();
        map.ensure_spatial_index();
        (map, a, b)
    }

    #[test]
    fn test_neighbors_over_shared_bound() {
        let (map, a, b) = side_by_side();

        assert_eq!(right_neighbor(&map, a).map(|l| l.id), Some(b));
        assert_eq!(left_neighbor(&map, b).map(|l| l.id), Some(a));
        assert!(left_neighbor(&map, a).is_none());
        assert!(right_neighbor(&map, b).is_none());
    }

    #[test]
    fn test_neighbor_of_unknown_lanelet_is_none() {
        let (map, _, _) = side_by_side();
        assert!(left_neighbor(&map, 999).is_none());
    }

    #[test]
    fn test_ambiguous_bound_picks_first_other_user() {
        let (mut map, a, b) = side_by_side();
        let shared = map.lanelet(a).unwrap().right;
        let q = map.add_point(0.0, -4.0).unwrap();
        let r = map.add_point(10.0, -4.0).unwrap();
        let extra_left = map.add_line_string(vec![q, r]).unwrap();
        let c = map
            .add_lanelet(extra_left, shared, None, AttributeMap::new())
            .unwrap();

        assert_eq!(left_neighbor(&map, b).map(|l| l.id), Some(a));
        assert_eq!(right_neighbor(&map, c).map(|l| l.id), Some(a));
    }

    #[test]
    fn test_lanelet_containing_midpoint_and_outside() {
        let (map, a, b) = side_by_side();
        let geometry = PlanarGeometry::default();

        assert_eq!(lanelet_containing(&map, &geometry, DVec2::new(5.0, 2.0)), Some(a));
        assert_eq!(lanelet_containing(&map, &geometry, DVec2::new(5.0, 6.0)), Some(b));
        assert_eq!(lanelet_containing(&map, &geometry, DVec2::new(50.0, 2.0)), None);
    }

    #[test]
    fn test_shared_boundary_resolves_to_earlier_lanelet() {
        let (map, a, _) = side_by_side();
        let geometry = PlanarGeometry::default();
        assert_eq!(lanelet_containing(&map, &geometry, DVec2::new(5.0, 4.0)), Some(a));
    }

    #[test]
    fn test_following_without_successor_fails() {
        let (map, a, _) = side_by_side();
        let graph = RoutingGraph::build(&map, &TrafficRules::default());

        assert!(matches!(
            following(&map, &graph, a),
            Err(LaneletError::NoSuccessor(id)) if id == a
        ));
        assert!(previous(&map, &graph, a).is_empty());
    }

    #[test]
    fn test_bounds_and_centerline() {
        let (map, a, _) = side_by_side();
        let left = left_bound(&map, a).unwrap();
        let right = right_bound(&map, a).unwrap();
        assert_eq!(left.len(), 2);
        assert_ne!(left.id, right.id);

        let center = centerline(&map, a).unwrap();
        assert_eq!(center[0], DVec3::new(0.0, 2.0, 0.0));
        assert!(centerline(&map, 999).is_none());
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let (map, _, _) = side_by_side();
        assert!(lookup_point(&map, 999).is_none());
        assert!(lookup_line_string(&map, 999).is_none());
        assert!(lookup_lanelet(&map, 999).is_none());
        assert!(lookup_point(&map, 1).is_some());
    }
}
