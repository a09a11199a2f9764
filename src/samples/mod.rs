//! Einlesen paralleler Randkurven-Samples aus Textdateien.
//!
//! Jede Zeile enthält `2·N` Zahlen; Feld `2k`/`2k+1` ist (x, y) von Sequenz `k`.
//! Leerzeilen werden übersprungen, Felder getrimmt. Ein Header ist nicht vorgesehen.

use std::path::Path;

use glam::DVec2;

use crate::core::{LaneletError, Result};

/// Parsed Sample-Records in Sequenzen (`result[k][i]` = Sample `i` von Sequenz `k`).
///
/// Fehlerhafte oder nicht-endliche Zahlen (`nan`, `inf`) liefern `SampleParse` mit 1-basierter Zeile/Spalte,
/// ungerade oder abweichende Feldanzahl liefert `ShapeMismatch`.
pub fn parse_sample_records(text: &str, delimiter: char) -> Result<Vec<Vec<DVec2>>> {
    let mut sequences: Vec<Vec<DVec2>> = Vec::new();
    let mut fields_per_record: Option<usize> = None;

    for (line_index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let values = line
            .split(delimiter)
            .enumerate()
            .map(|(column, field)| {
                let field = field.trim();
                field
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| LaneletError::SampleParse {
                        line: line_index + 1,
                        column: column + 1,
                        value: field.to_string(),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.len() % 2 != 0 {
            return Err(LaneletError::ShapeMismatch {
                sequence: values.len() / 2,
                expected: values.len() + 1,
                found: values.len(),
            });
        }

        match fields_per_record {
            None => {
                fields_per_record = Some(values.len());
                sequences = vec![Vec::new(); values.len() / 2];
            }
            Some(expected) if expected != values.len() => {
                // Erste Sequenz, die nicht in beiden Records vorkommt
                return Err(LaneletError::ShapeMismatch {
                    sequence: expected.min(values.len()) / 2,
                    expected,
                    found: values.len(),
                });
            }
            Some(_) => {}
        }

        for (sequence, xy) in sequences.iter_mut().zip(values.chunks_exact(2)) {
            sequence.push(DVec2::new(xy[0], xy[1]));
        }
    }

    Ok(sequences)
}

/// Liest eine Sample-Datei von der Platte.
pub fn read_sample_file(path: &Path, delimiter: char) -> Result<Vec<Vec<DVec2>>> {
    let text = std::fs::read_to_string(path)?;
    let sequences = parse_sample_records(&text, delimiter)?;
    log::info!(
        "Samples geladen aus {}: {} Sequenzen x {} Samples",
        path.display(),
        sequences.len(),
        sequences.first().map_or(0, Vec::len)
    );
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_sequences() {
        let text = "0,0,0,5\n10,0,10,5\n\n  10 , 10 , 10 , 15  \n";
        let sequences = parse_sample_records(text, ',').unwrap();

        assert_eq!(sequences.len(), 2);
        assert_eq!(
            sequences[0],
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(10.0, 0.0),
                DVec2::new(10.0, 10.0)
            ]
        );
        assert_eq!(sequences[1][2], DVec2::new(10.0, 15.0));
    }

    #[test]
    fn test_custom_delimiter() {
        let sequences = parse_sample_records("1;2;3;4", ';').unwrap();
        assert_eq!(sequences[1][0], DVec2::new(3.0, 4.0));
    }

    #[test]
    fn test_non_numeric_field_reports_position() {
        let err = parse_sample_records("0,0,0,5\n10,x,10,5\n", ',').unwrap_err();
        match err {
            LaneletError::SampleParse {
                line,
                column,
                value,
            } => {
                assert_eq!((line, column), (2, 2));
                assert_eq!(value, "x");
            }
            other => panic!("unerwarteter Fehler: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_field_is_parse_error() {
        for (text, column, value) in [
            ("0,0,0,5\nnan,nan,nan,nan\n", 1, "nan"),
            ("0,0,inf,5\n", 3, "inf"),
            ("0,0,0,-Infinity\n", 4, "-Infinity"),
        ] {
            match parse_sample_records(text, ',') {
                Err(LaneletError::SampleParse {
                    column: found,
                    value: found_value,
                    ..
                }) => {
                    assert_eq!(found, column, "{text:?}");
                    assert_eq!(found_value, value);
                }
                other => panic!("SampleParse erwartet fuer {text:?}, erhalten: {other:?}"),
            }
        }
    }

    #[test]
    fn test_odd_field_count_is_shape_mismatch() {
        assert!(matches!(
            parse_sample_records("0,0,0", ','),
            Err(LaneletError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_differing_record_width_is_shape_mismatch() {
        assert!(matches!(
            parse_sample_records("0,0,0,5\n10,0,10,5,20,5\n", ','),
            Err(LaneletError::ShapeMismatch {
                expected: 4,
                found: 6,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_text_gives_no_sequences() {
        assert!(parse_sample_records("\n  \n", ',').unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_sample_file(Path::new("/nicht/vorhanden.csv"), ',').unwrap_err();
        assert!(matches!(err, LaneletError::Io(_)));
    }
}
