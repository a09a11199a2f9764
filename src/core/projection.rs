//! Umrechnung zwischen geographischen und lokalen, planaren Koordinaten.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Erdradius der sphärischen Mercator-Projektion (WGS84-Halbachse).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Bezugspunkt der lokalen Koordinaten. (0, 0) = rein lokal, ohne Geo-Verankerung.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lon: f64,
}

impl Origin {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographische Koordinate in Grad, Höhe in Metern.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, ele: f64) -> Self {
        Self { lat, lon, ele }
    }
}

/// Projektions-Schnittstelle (geo ⇄ lokal).
pub trait Projector {
    /// Bezugspunkt der Projektion
    fn origin(&self) -> Origin;

    /// Geographisch → lokal (Meter relativ zum Origin)
    fn forward(&self, geo: GeoPoint) -> DVec3;

    /// Lokal → geographisch
    fn reverse(&self, local: DVec3) -> GeoPoint;
}

/// Sphärische Mercator-Projektion, skaliert auf den Breitengrad des Origins.
///
/// Der Origin liegt auf lokal (0, 0); Abstände in Origin-Nähe sind metrisch.
#[derive(Debug, Clone, Copy)]
pub struct MercatorProjector {
    origin: Origin,
    scale: f64,
    offset: DVec2,
}

impl MercatorProjector {
    pub fn new(origin: Origin) -> Self {
        let scale = origin.lat.to_radians().cos();
        let offset = Self::raw_forward(scale, origin.lat, origin.lon);
        Self {
            origin,
            scale,
            offset,
        }
    }

    fn raw_forward(scale: f64, lat: f64, lon: f64) -> DVec2 {
        let x = scale * EARTH_RADIUS_M * lon.to_radians();
        let y = scale
            * EARTH_RADIUS_M
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() * 0.5)
                .tan()
                .ln();
        DVec2::new(x, y)
    }
}

impl Default for MercatorProjector {
    fn default() -> Self {
        Self::new(Origin::default())
    }
}

impl Projector for MercatorProjector {
    fn origin(&self) -> Origin {
        self.origin
    }

    fn forward(&self, geo: GeoPoint) -> DVec3 {
        let xy = Self::raw_forward(self.scale, geo.lat, geo.lon) - self.offset;
        xy.extend(geo.ele)
    }

    fn reverse(&self, local: DVec3) -> GeoPoint {
        let raw = local.truncate() + self.offset;
        let radius = self.scale * EARTH_RADIUS_M;
        let lon = (raw.x / radius).to_degrees();
        let lat = (2.0 * (raw.y / radius).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
        GeoPoint::new(lat, lon, local.z)
    }
}
