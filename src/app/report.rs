//! Berichtstypen der Facade (Laden, Kennzahlen).

use serde::Serialize;

/// Ergebnis eines robusten Ladevorgangs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Geladene Lanelets
    pub lanelets: usize,
    /// Übersprungene Primitive bzw. sonstige nicht-fatale Meldungen
    pub errors: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Kennzahlen der aktuell gehaltenen Map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapInfo {
    pub lanelets: usize,
    pub line_strings: usize,
    pub points: usize,
    /// Meldungen des letzten Ladevorgangs
    pub load_errors: Vec<String>,
}

impl std::fmt::Display for MapInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Anzahl")?;
        writeln!(f, "Lanelets: {}", self.lanelets)?;
        writeln!(f, "Randkurven: {}", self.line_strings)?;
        write!(f, "Punkte: {}", self.points)?;
        if !self.load_errors.is_empty() {
            write!(f, "\nLadefehler: {}", self.load_errors.len())?;
        }
        Ok(())
    }
}
