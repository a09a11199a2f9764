//! Zentrale Konfiguration für den Lanelet-Strip-Builder.
//!
//! `BuilderOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use crate::core::geometry::DEFAULT_CONTAINS_TOLERANCE;
use crate::core::{AttributeMap, Origin, TrafficRules};

// ── Lanelet-Profil ──────────────────────────────────────────────────

/// Standard-Umgebung gebauter Lanelets.
pub const DEFAULT_LOCATION: &str = "nonurban";
/// Standard-Einbahn-Kennung.
pub const DEFAULT_ONE_WAY: &str = "yes";
/// Standard-Region (Verkehrsregeln).
pub const DEFAULT_REGION: &str = "de";
/// Standard-Lanelet-Typ.
pub const DEFAULT_SUBTYPE: &str = "highway";

// ── Sample-Eingabe ──────────────────────────────────────────────────

/// Trennzeichen der Sample-Dateien.
pub const SAMPLE_DELIMITER: char = ',';

/// Attribut-Profil, das der Builder auf jedes erzeugte Lanelet schreibt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneletProfile {
    pub location: String,
    pub one_way: String,
    pub region: String,
    pub subtype: String,
}

impl Default for LaneletProfile {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            one_way: DEFAULT_ONE_WAY.to_string(),
            region: DEFAULT_REGION.to_string(),
            subtype: DEFAULT_SUBTYPE.to_string(),
        }
    }
}

impl LaneletProfile {
    /// Attribut-Tabelle in fester Schlüssel-Reihenfolge
    pub fn to_attributes(&self) -> AttributeMap {
        let mut attributes = AttributeMap::new();
        attributes.insert("location".to_string(), self.location.clone());
        attributes.insert("one_way".to_string(), self.one_way.clone());
        attributes.insert("region".to_string(), self.region.clone());
        attributes.insert("subtype".to_string(), self.subtype.clone());
        attributes
    }
}

/// Alle zur Laufzeit änderbaren Builder-Optionen.
/// Wird als `lanelet_strip_builder.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderOptions {
    /// Attribute neu gebauter Lanelets
    #[serde(default)]
    pub profile: LaneletProfile,
    /// Verkehrsregeln für den Routing-Graphen
    #[serde(default)]
    pub traffic_rules: TrafficRules,
    /// Geographischer Bezugspunkt für Laden/Speichern
    #[serde(default)]
    pub origin: Origin,
    /// Rand-Toleranz der Enthaltensein-Prüfung (Meter)
    #[serde(default = "default_contains_tolerance")]
    pub contains_tolerance: f64,
    /// Trennzeichen der Sample-Dateien
    #[serde(default = "default_sample_delimiter")]
    pub sample_delimiter: char,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            profile: LaneletProfile::default(),
            traffic_rules: TrafficRules::default(),
            origin: Origin::default(),
            contains_tolerance: DEFAULT_CONTAINS_TOLERANCE,
            sample_delimiter: SAMPLE_DELIMITER,
        }
    }
}

fn default_contains_tolerance() -> f64 {
    DEFAULT_CONTAINS_TOLERANCE
}

fn default_sample_delimiter() -> char {
    SAMPLE_DELIMITER
}

impl BuilderOptions {
    /// Lädt Optionen aus einer TOML-Datei. Fehlt die Datei oder ist sie fehlerhaft,
    /// werden die Standardwerte verwendet.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("lanelet_strip_builder"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("lanelet_strip_builder.toml")
    }
}
