//! Strip-Builder: verbindet index-synchrone Punktfolgen zu aufeinanderfolgenden Lanelets.

use glam::DVec2;

use crate::core::geometry::midpoints;
use crate::core::{AttributeMap, Id, LaneletError, LaneletMap, Result};
use crate::shared::LaneletProfile;

/// Schalter eines Strip-Aufbaus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripOptions {
    /// Letzten Sample-Index wieder mit dem ersten verbinden (Rundkurs)
    pub close_ring: bool,
    /// Mittellinie aus den ersten beiden Sequenzen ableiten und anhängen
    pub with_centerline: bool,
}

/// Was ein Strip-Aufbau in die Map geschrieben hat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripReport {
    /// Anzahl neu angelegter Punkte
    pub points: usize,
    /// Anzahl neu angelegter Randkurven
    pub line_strings: usize,
    /// Neue Lanelet-IDs in Erzeugungsreihenfolge
    pub lanelets: Vec<Id>,
}

/// Prüft die Vorbedingungen eines Strips und liefert die gemeinsame Länge.
///
/// - mindestens zwei Sequenzen (links/rechts)
/// - keine leere Sequenz
/// - alle Sequenzen gleich lang (Sample i gehört geometrisch zu Sample i)
/// - nur endliche Koordinaten
pub fn validate_strip(sequences: &[Vec<DVec2>]) -> Result<usize> {
    if sequences.len() < 2 {
        return Err(LaneletError::TooFewSequences {
            found: sequences.len(),
        });
    }

    let expected = sequences[0].len();
    if expected == 0 {
        return Err(LaneletError::EmptyStrip);
    }

    for (sequence, samples) in sequences.iter().enumerate().skip(1) {
        if samples.len() != expected {
            return Err(LaneletError::ShapeMismatch {
                sequence,
                expected,
                found: samples.len(),
            });
        }
    }

    for (sequence, samples) in sequences.iter().enumerate() {
        if let Some(index) = samples.iter().position(|sample| !sample.is_finite()) {
            return Err(LaneletError::InvalidGeometry(format!(
                "Sequenz {sequence}, Sample {index}: Koordinate nicht endlich ({})",
                samples[index]
            )));
        }
    }

    Ok(expected)
}

/// Baut einen Strip in die Map.
///
/// Ablauf:
/// 1. Index 0: je Sequenz einen Punkt anlegen (Start und Ring-Anker)
/// 2. Index 1..L: je Sequenz neuen Punkt und Randkurve (Start → neu) anlegen,
///    je benachbartem Sequenz-Paar (S0,S1), (S1,S2), … ein Lanelet
/// 3. Optional Ring-Schluss: ein weiterer Schritt vom letzten zurück zum ersten Index
///
/// Mit `with_centerline` läuft die Mittelpunkt-Folge der ersten beiden Sequenzen als
/// zusätzliche Sequenz mit; ihre Kurve wird Mittellinie des (S0,S1)-Lanelets.
///
/// Die Vorbedingungen werden vor der ersten Einfügung geprüft. Ein späterer Fehler
/// hinterlässt eine teilweise gefüllte Map (kein Rollback).
pub fn build_strip(
    map: &mut LaneletMap,
    sequences: &[Vec<DVec2>],
    options: StripOptions,
    profile: &LaneletProfile,
) -> Result<StripReport> {
    let length = validate_strip(sequences)?;
    let pair_count = sequences.len() - 1;

    let centerline_samples = if options.with_centerline {
        midpoints(&sequences[0], &sequences[1])
    } else {
        None
    };
    let mut working: Vec<&[DVec2]> = sequences.iter().map(Vec::as_slice).collect();
    let centerline_index = centerline_samples.as_deref().map(|samples| {
        working.push(samples);
        working.len() - 1
    });

    let points_before = map.point_count();
    let lines_before = map.line_string_count();
    let attributes = profile.to_attributes();
    let mut stitcher = Stitcher {
        pair_count,
        centerline_index,
        attributes: &attributes,
        lanelets: Vec::with_capacity(pair_count * length),
    };

    // Erste Punkte merken: Start des ersten Schritts und Ziel des Ring-Schlusses
    let first: Vec<Id> = working
        .iter()
        .map(|samples| map.add_point(samples[0].x, samples[0].y))
        .collect::<Result<_>>()?;
    let mut start = first.clone();

    for index in 1..length {
        let next: Vec<Id> = working
            .iter()
            .map(|samples| map.add_point(samples[index].x, samples[index].y))
            .collect::<Result<_>>()?;
        stitcher.stitch(map, &start, &next)?;
        start = next;
    }

    if options.close_ring && length > 1 {
        stitcher.stitch(map, &start, &first)?;
    }

    map.ensure_spatial_index();

    let report = StripReport {
        points: map.point_count() - points_before,
        line_strings: map.line_string_count() - lines_before,
        lanelets: stitcher.lanelets,
    };
    log::info!(
        "Strip gebaut: {} Sequenzen x {} Samples → {} Punkte, {} Randkurven, {} Lanelets{}",
        sequences.len(),
        length,
        report.points,
        report.line_strings,
        report.lanelets.len(),
        if options.close_ring { " (Ring)" } else { "" }
    );
    Ok(report)
}

/// Ein Stitch-Schritt: Kurven je Sequenz und Lanelets je benachbartem Paar.
struct Stitcher<'a> {
    pair_count: usize,
    centerline_index: Option<usize>,
    attributes: &'a AttributeMap,
    lanelets: Vec<Id>,
}

impl Stitcher<'_> {
    fn stitch(&mut self, map: &mut LaneletMap, start: &[Id], end: &[Id]) -> Result<()> {
        let lines = start
            .iter()
            .zip(end)
            .map(|(&a, &b)| map.add_line_string(vec![a, b]))
            .collect::<Result<Vec<Id>>>()?;

        for pair in 0..self.pair_count {
            let centerline = match self.centerline_index {
                Some(index) if pair == 0 => Some(lines[index]),
                _ => None,
            };
            let id = map.add_lanelet(
                lines[pair],
                lines[pair + 1],
                centerline,
                self.attributes.clone(),
            )?;
            self.lanelets.push(id);
        }
        Ok(())
    }
}
