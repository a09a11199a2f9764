//! Die zentrale LaneletMap-Datenstruktur mit Punkten, Randkurven, Lanelets und Spatial-Index.

use glam::{DVec2, DVec3};
use indexmap::IndexMap;

use super::error::{LaneletError, Result};
use super::geometry::midpoints;
use super::{AttributeMap, Id, Lanelet, LineString, Origin, Point, SpatialIndex};

/// Container für das gesamte Lanelet-Netz.
///
/// Alle Layer behalten ihre Einfügereihenfolge; "erster Treffer"-Abfragen
/// (Nachbarn, Nachfolger) hängen davon ab.
#[derive(Debug, Clone)]
pub struct LaneletMap {
    points: IndexMap<Id, Point>,
    line_strings: IndexMap<Id, LineString>,
    lanelets: IndexMap<Id, Lanelet>,
    /// Geographischer Bezugspunkt der lokalen Koordinaten
    pub origin: Origin,
    /// Nächste freie ID (gemeinsamer ID-Raum aller Layer)
    next_id: Id,
    /// Wird bei jeder Einfügung erhöht
    revision: u64,
    spatial_index: SpatialIndex,
    spatial_dirty: bool,
}

impl LaneletMap {
    /// Erstellt eine neue leere LaneletMap
    pub fn new(origin: Origin) -> Self {
        Self {
            points: IndexMap::new(),
            line_strings: IndexMap::new(),
            lanelets: IndexMap::new(),
            origin,
            next_id: 1,
            revision: 0,
            spatial_index: SpatialIndex::empty(),
            spatial_dirty: false,
        }
    }

    fn allocate_id(&mut self) -> Result<Id> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or_else(id_space_exhausted)?;
        Ok(id)
    }

    /// Merkt eine vorgegebene ID vor; `next_id` bleibt stets darüber.
    fn reserve_id(&mut self, id: Id) -> Result<()> {
        if id >= self.next_id {
            self.next_id = id.checked_add(1).ok_or_else(id_space_exhausted)?;
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ── Einfügen ───────────────────────────────────────────────────

    /// Fügt einen neuen Punkt (z = 0) mit frischer ID hinzu
    pub fn add_point(&mut self, x: f64, y: f64) -> Result<Id> {
        let id = self.allocate_id()?;
        self.points.insert(id, Point::planar(id, x, y));
        self.touch();
        Ok(id)
    }

    /// Fügt einen Punkt mit vorgegebener ID ein (z.B. beim Laden)
    pub fn insert_point(&mut self, point: Point) -> Result<()> {
        if self.points.contains_key(&point.id) {
            return Err(LaneletError::InvalidGeometry(format!(
                "Punkt-ID {} doppelt vergeben",
                point.id
            )));
        }
        self.reserve_id(point.id)?;
        self.points.insert(point.id, point);
        self.touch();
        Ok(())
    }

    /// Fügt eine neue Randkurve über existierende Punkte hinzu
    pub fn add_line_string(&mut self, points: Vec<Id>) -> Result<Id> {
        self.validate_line_points(&points)?;
        let id = self.allocate_id()?;
        self.line_strings.insert(id, LineString::new(id, points));
        self.touch();
        Ok(id)
    }

    /// Fügt eine Randkurve mit vorgegebener ID ein
    pub fn insert_line_string(&mut self, line: LineString) -> Result<()> {
        if self.line_strings.contains_key(&line.id) {
            return Err(LaneletError::InvalidGeometry(format!(
                "Kurven-ID {} doppelt vergeben",
                line.id
            )));
        }
        self.validate_line_points(&line.points)?;
        self.reserve_id(line.id)?;
        self.line_strings.insert(line.id, line);
        self.touch();
        Ok(())
    }

    /// Fügt ein neues Lanelet hinzu
    pub fn add_lanelet(
        &mut self,
        left: Id,
        right: Id,
        centerline: Option<Id>,
        attributes: AttributeMap,
    ) -> Result<Id> {
        let id = self.next_id;
        let mut lanelet = Lanelet::new(id, left, right).with_attributes(attributes);
        lanelet.centerline = centerline;
        self.validate_lanelet(&lanelet)?;

        let id = self.allocate_id()?;
        self.lanelets.insert(id, lanelet);
        self.spatial_dirty = true;
        self.touch();
        Ok(id)
    }

    /// Fügt ein Lanelet mit vorgegebener ID ein
    pub fn insert_lanelet(&mut self, lanelet: Lanelet) -> Result<()> {
        if self.lanelets.contains_key(&lanelet.id) {
            return Err(LaneletError::InvalidGeometry(format!(
                "Lanelet-ID {} doppelt vergeben",
                lanelet.id
            )));
        }
        self.validate_lanelet(&lanelet)?;
        self.reserve_id(lanelet.id)?;
        self.lanelets.insert(lanelet.id, lanelet);
        self.spatial_dirty = true;
        self.touch();
        Ok(())
    }

    fn validate_line_points(&self, points: &[Id]) -> Result<()> {
        if points.len() < 2 {
            return Err(LaneletError::InvalidGeometry(format!(
                "Randkurve braucht mindestens 2 Punkte, erhalten: {}",
                points.len()
            )));
        }
        match points.iter().find(|id| !self.points.contains_key(*id)) {
            Some(&missing) => Err(LaneletError::UnknownPrimitive(missing)),
            None => Ok(()),
        }
    }

    /// Prüft Referenzen und die Punktanzahl-Invariante (gematchte Samples).
    fn validate_lanelet(&self, lanelet: &Lanelet) -> Result<()> {
        let left = self
            .line_strings
            .get(&lanelet.left)
            .ok_or(LaneletError::UnknownPrimitive(lanelet.left))?;
        let right = self
            .line_strings
            .get(&lanelet.right)
            .ok_or(LaneletError::UnknownPrimitive(lanelet.right))?;

        match lanelet.centerline {
            None if left.len() != right.len() => Err(LaneletError::InvalidGeometry(format!(
                "Lanelet {}: linker Rand hat {} Punkte, rechter {}",
                lanelet.id,
                left.len(),
                right.len()
            ))),
            None => Ok(()),
            Some(center_id) => {
                let center = self
                    .line_strings
                    .get(&center_id)
                    .ok_or(LaneletError::UnknownPrimitive(center_id))?;
                if center.len() != left.len() || center.len() != right.len() {
                    return Err(LaneletError::InvalidGeometry(format!(
                        "Lanelet {}: Mittellinie hat {} Punkte, Raender {}/{}",
                        lanelet.id,
                        center.len(),
                        left.len(),
                        right.len()
                    )));
                }
                Ok(())
            }
        }
    }

    // ── Lookup ─────────────────────────────────────────────────────

    pub fn point(&self, id: Id) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn line_string(&self, id: Id) -> Option<&LineString> {
        self.line_strings.get(&id)
    }

    pub fn lanelet(&self, id: Id) -> Option<&Lanelet> {
        self.lanelets.get(&id)
    }

    /// Position des Lanelets in der Einfügereihenfolge
    pub fn lanelet_order(&self, id: Id) -> Option<usize> {
        self.lanelets.get_index_of(&id)
    }

    /// Iterator über alle Punkte (Einfügereihenfolge)
    pub fn points_iter(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    /// Iterator über alle Randkurven (Einfügereihenfolge)
    pub fn line_strings_iter(&self) -> impl Iterator<Item = &LineString> {
        self.line_strings.values()
    }

    /// Iterator über alle Lanelets (Einfügereihenfolge)
    pub fn lanelets_iter(&self) -> impl Iterator<Item = &Lanelet> {
        self.lanelets.values()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn line_string_count(&self) -> usize {
        self.line_strings.len()
    }

    pub fn lanelet_count(&self) -> usize {
        self.lanelets.len()
    }

    /// Änderungszähler; dient abgeleiteten Caches zur Erkennung von Veraltung.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Alle Lanelets, die die Kurve als linken oder rechten Rand nutzen.
    pub fn find_usages(&self, line_id: Id) -> Vec<&Lanelet> {
        self.lanelets
            .values()
            .filter(|lanelet| lanelet.uses_bound(line_id))
            .collect()
    }

    // ── Geometrie ──────────────────────────────────────────────────

    /// Koordinaten der Punkte einer Randkurve
    pub fn line_points(&self, line_id: Id) -> Option<Vec<DVec3>> {
        self.line_strings
            .get(&line_id)?
            .points
            .iter()
            .map(|id| self.points.get(id).map(|p| p.position))
            .collect()
    }

    /// Mittellinie: explizit gesetzt oder aus den gematchten Rand-Samples abgeleitet.
    pub fn centerline(&self, lanelet_id: Id) -> Option<Vec<DVec3>> {
        let lanelet = self.lanelets.get(&lanelet_id)?;
        if let Some(center_id) = lanelet.centerline {
            return self.line_points(center_id);
        }
        let left = self.line_points(lanelet.left)?;
        let right = self.line_points(lanelet.right)?;
        midpoints(&left, &right)
    }

    /// Umriss des Lanelets: linker Rand vorwärts, rechter Rand rückwärts.
    pub fn lanelet_polygon(&self, lanelet_id: Id) -> Option<Vec<DVec2>> {
        let lanelet = self.lanelets.get(&lanelet_id)?;
        let left = self.line_points(lanelet.left)?;
        let right = self.line_points(lanelet.right)?;
        Some(
            left.iter()
                .chain(right.iter().rev())
                .map(|p| p.truncate())
                .collect(),
        )
    }

    // ── Spatial-Index ──────────────────────────────────────────────

    /// Aktueller Spatial-Index, `None` wenn seit der letzten Änderung nicht neu aufgebaut.
    pub fn spatial_index(&self) -> Option<&SpatialIndex> {
        (!self.spatial_dirty).then_some(&self.spatial_index)
    }

    /// Baut den Spatial-Index nur neu auf, wenn Lanelets hinzugekommen sind.
    pub fn ensure_spatial_index(&mut self) {
        if self.spatial_dirty {
            self.rebuild_spatial_index();
        }
    }

    /// Baut den persistenten Spatial-Index aus den aktuellen Lanelets neu auf.
    pub fn rebuild_spatial_index(&mut self) {
        let polygons: Vec<(Id, Vec<DVec2>)> = self
            .lanelets
            .keys()
            .filter_map(|&id| Some((id, self.lanelet_polygon(id)?)))
            .collect();
        self.spatial_index = SpatialIndex::from_polygons(polygons);
        self.spatial_dirty = false;
        log::debug!(
            "Spatial-Index neu aufgebaut: {} Eckpunkte",
            self.spatial_index.len()
        );
    }
}

fn id_space_exhausted() -> LaneletError {
    LaneletError::InvalidGeometry(format!("ID-Raum erschoepft (maximal {})", Id::MAX - 1))
}

impl Default for LaneletMap {
    fn default() -> Self {
        Self::new(Origin::default())
    }
}
