//! Fehlertypen der Library-Oberfläche.

use thiserror::Error;

use super::Id;

/// Fehler beim Aufbau, Laden, Speichern oder Abfragen eines Lanelet-Netzes.
#[derive(Error, Debug)]
pub enum LaneletError {
    /// Ein Strip braucht mindestens linke und rechte Randkurve.
    #[error("Strip braucht mindestens 2 Sequenzen, erhalten: {found}")]
    TooFewSequences { found: usize },

    /// Alle Sequenzen sind leer.
    #[error("Strip enthaelt keine Samples")]
    EmptyStrip,

    /// Sequenzen mit unterschiedlicher Länge (Index-Korrespondenz verletzt).
    #[error("Sequenz {sequence} hat {found} Werte, erwartet {expected}")]
    ShapeMismatch {
        sequence: usize,
        expected: usize,
        found: usize,
    },

    /// Nicht-numerisches Feld in einer Sample-Datei.
    #[error("Zeile {line}, Spalte {column}: '{value}' ist keine gueltige Zahl")]
    SampleParse {
        line: usize,
        column: usize,
        value: String,
    },

    /// Referenz auf ein Primitiv, das nicht in der Map liegt.
    #[error("Unbekanntes Primitiv: {0}")]
    UnknownPrimitive(Id),

    /// Verletzte Geometrie-Invariante (Punktanzahl, Mindestlänge).
    #[error("Ungueltige Geometrie: {0}")]
    InvalidGeometry(String),

    /// `following` auf einem Lanelet ohne ausgehende Kante.
    #[error("Lanelet {0} hat keinen Nachfolger im Routing-Graph")]
    NoSuccessor(Id),

    /// Fehlerliste des Map-Formats beim Laden (unverändert weitergereicht).
    #[error("Laden fehlgeschlagen: {}", .0.join("; "))]
    LoadFailure(Vec<String>),

    /// Fehlerliste des Map-Formats beim Speichern (unverändert weitergereicht).
    #[error("Speichern fehlgeschlagen: {}", .0.join("; "))]
    SaveFailure(Vec<String>),

    #[error("I/O-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LaneletError>;
