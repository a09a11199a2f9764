//! Routing-Graph: welches Lanelet folgt in Fahrtrichtung auf welches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use super::geometry::polyline_length;
use super::{Id, Lanelet, LaneletMap};

/// Verkehrsregeln für den Aufbau des Routing-Graphen (Teilnehmer: Fahrzeug).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRules {
    /// `subtype`-Werte, die für Fahrzeuge befahrbar sind.
    /// Lanelets ohne `subtype` gelten als befahrbar.
    pub passable_subtypes: Vec<String>,
}

impl Default for TrafficRules {
    fn default() -> Self {
        Self {
            passable_subtypes: vec![
                "road".to_string(),
                "highway".to_string(),
                "play_street".to_string(),
            ],
        }
    }
}

impl TrafficRules {
    /// Prüft, ob das Lanelet für Fahrzeuge befahrbar ist
    pub fn is_passable(&self, lanelet: &Lanelet) -> bool {
        match lanelet.attribute("subtype") {
            Some(subtype) => self.passable_subtypes.iter().any(|s| s == subtype),
            None => true,
        }
    }
}

/// Ergebnis einer Kürzeste-Wege-Suche.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneletPath {
    /// Lanelet-IDs von Start bis Ziel (inklusive)
    pub lanelets: Vec<Id>,
    /// Summe der Mittellinien-Längen ohne das Start-Lanelet
    pub cost: f64,
}

/// Abgeleitete, read-only Sicht auf die Nachfolger-Beziehungen einer LaneletMap.
///
/// Kante A → B, wenn B's linker Rand dort beginnt, wo A's linker Rand endet, und
/// dasselbe für die rechten Ränder gilt (gemeinsame Punkt-IDs, nicht Koordinaten).
/// Nicht persistiert; nach Änderungen an der Map muss neu gebaut werden.
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    ids: Vec<Id>,
    index_of: HashMap<Id, usize>,
    following: Vec<Vec<usize>>,
    previous: Vec<Vec<usize>>,
    costs: Vec<f64>,
    revision: u64,
}

impl RoutingGraph {
    /// Baut den Graphen aus allen befahrbaren Lanelets der Map.
    pub fn build(map: &LaneletMap, rules: &TrafficRules) -> Self {
        let passable: Vec<&Lanelet> = map
            .lanelets_iter()
            .filter(|lanelet| rules.is_passable(lanelet))
            .collect();

        let ids: Vec<Id> = passable.iter().map(|l| l.id).collect();
        let index_of: HashMap<Id, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        // Einstiegs-Schlüssel (Startpunkt links, Startpunkt rechts) → Lanelets in Einfügereihenfolge
        let mut entries: HashMap<(Id, Id), Vec<usize>> = HashMap::new();
        for (index, lanelet) in passable.iter().enumerate() {
            if let Some(key) = bound_key(map, lanelet, BoundEnd::Front) {
                entries.entry(key).or_default().push(index);
            }
        }

        let mut following = vec![Vec::new(); ids.len()];
        let mut previous = vec![Vec::new(); ids.len()];
        for (index, lanelet) in passable.iter().enumerate() {
            let Some(key) = bound_key(map, lanelet, BoundEnd::Back) else {
                continue;
            };
            for &next in entries.get(&key).map(Vec::as_slice).unwrap_or_default() {
                if next == index {
                    continue;
                }
                following[index].push(next);
                previous[next].push(index);
            }
        }

        let costs = ids
            .iter()
            .map(|&id| {
                map.centerline(id)
                    .map(|points| {
                        let planar: Vec<_> = points.iter().map(|p| p.truncate()).collect();
                        polyline_length(&planar)
                    })
                    .unwrap_or(0.0)
            })
            .collect();

        let graph = Self {
            ids,
            index_of,
            following,
            previous,
            costs,
            revision: map.revision(),
        };
        log::info!(
            "Routing-Graph aufgebaut: {} Lanelets, {} Kanten",
            graph.lanelet_count(),
            graph.edge_count()
        );
        graph
    }

    /// Anzahl der Lanelets im Graphen
    pub fn lanelet_count(&self) -> usize {
        self.ids.len()
    }

    /// Anzahl der Nachfolger-Kanten
    pub fn edge_count(&self) -> usize {
        self.following.iter().map(Vec::len).sum()
    }

    /// Prüft, ob die Map seit dem Aufbau verändert wurde
    pub fn is_stale(&self, map: &LaneletMap) -> bool {
        self.revision != map.revision()
    }

    /// Direkte Nachfolger in Einfügereihenfolge
    pub fn following(&self, lanelet_id: Id) -> Vec<Id> {
        self.neighbors(&self.following, lanelet_id)
    }

    /// Direkte Vorgänger in Einfügereihenfolge
    pub fn previous(&self, lanelet_id: Id) -> Vec<Id> {
        self.neighbors(&self.previous, lanelet_id)
    }

    fn neighbors(&self, adjacency: &[Vec<usize>], lanelet_id: Id) -> Vec<Id> {
        self.index_of
            .get(&lanelet_id)
            .map(|&i| adjacency[i].iter().map(|&j| self.ids[j]).collect())
            .unwrap_or_default()
    }

    /// Kürzester Weg (Mittellinien-Länge) von `from` nach `to`.
    pub fn shortest_path(&self, from: Id, to: Id) -> Option<LaneletPath> {
        let start = *self.index_of.get(&from)?;
        let goal = *self.index_of.get(&to)?;

        let n = self.ids.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        dist[start] = 0.0;

        let mut heap = BinaryHeap::new();
        heap.push(SearchState {
            cost: 0.0,
            node: start,
        });

        while let Some(SearchState { cost, node }) = heap.pop() {
            if cost > dist[node] {
                continue;
            }
            if node == goal {
                break;
            }
            for &next in &self.following[node] {
                let new_dist = cost + self.costs[next];
                if new_dist < dist[next] {
                    dist[next] = new_dist;
                    prev[next] = Some(node);
                    heap.push(SearchState {
                        cost: new_dist,
                        node: next,
                    });
                }
            }
        }

        if !dist[goal].is_finite() {
            return None;
        }

        let mut path = vec![self.ids[goal]];
        let mut current = goal;
        while current != start {
            current = prev[current]?;
            path.push(self.ids[current]);
        }
        path.reverse();

        Some(LaneletPath {
            lanelets: path,
            cost: dist[goal],
        })
    }
}

#[derive(Clone, Copy)]
enum BoundEnd {
    Front,
    Back,
}

fn bound_key(map: &LaneletMap, lanelet: &Lanelet, end: BoundEnd) -> Option<(Id, Id)> {
    let left = map.line_string(lanelet.left)?;
    let right = map.line_string(lanelet.right)?;
    match end {
        BoundEnd::Front => Some((left.front()?, right.front()?)),
        BoundEnd::Back => Some((left.back()?, right.back()?)),
    }
}

/// Eintrag der Prioritätswarteschlange (Min-Heap über die Kosten).
#[derive(Clone, Copy, Debug)]
struct SearchState {
    cost: f64,
    node: usize,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for SearchState {}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap ist ein Max-Heap → umgekehrt vergleichen
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
