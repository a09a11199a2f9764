//! Writer für Lanelet2-OSM-Dateien.

use std::fmt::Write as _;

use anyhow::Result;

use crate::core::{AttributeMap, Id, LaneletMap, Projector};

/// Schreibt eine LaneletMap als Lanelet2-OSM-XML.
///
/// Lokale Koordinaten werden über den Projektor nach lat/lon zurückgerechnet,
/// die Höhe landet im Tag `ele`. Punkte mit nicht-endlichen Koordinaten werden
/// übersprungen und als Meldung zurückgegeben.
pub fn write_osm(map: &LaneletMap, projector: &dyn Projector) -> Result<(String, Vec<String>)> {
    let mut errors = Vec::new();
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str("<osm version=\"0.6\" generator=\"lanelet_strip_builder\">\n");

    for point in map.points_iter() {
        let geo = projector.reverse(point.position);
        if !(geo.lat.is_finite() && geo.lon.is_finite() && geo.ele.is_finite()) {
            errors.push(format!(
                "Node {}: Koordinaten nicht darstellbar, uebersprungen",
                point.id
            ));
            continue;
        }
        writeln!(
            output,
            "  <node id=\"{}\" lat=\"{}\" lon=\"{}\">",
            point.id,
            format_float(geo.lat),
            format_float(geo.lon)
        )?;
        writeln!(
            output,
            "    <tag k=\"ele\" v=\"{}\"/>",
            format_float(geo.ele)
        )?;
        output.push_str("  </node>\n");
    }

    for line in map.line_strings_iter() {
        writeln!(output, "  <way id=\"{}\">", line.id)?;
        for point_id in &line.points {
            writeln!(output, "    <nd ref=\"{}\"/>", point_id)?;
        }
        write_tags(&mut output, &line.attributes)?;
        output.push_str("  </way>\n");
    }

    for lanelet in map.lanelets_iter() {
        writeln!(output, "  <relation id=\"{}\">", lanelet.id)?;
        write_member(&mut output, "left", lanelet.left)?;
        write_member(&mut output, "right", lanelet.right)?;
        if let Some(center_id) = lanelet.centerline {
            write_member(&mut output, "centerline", center_id)?;
        }
        output.push_str("    <tag k=\"type\" v=\"lanelet\"/>\n");
        write_tags(&mut output, &lanelet.attributes)?;
        output.push_str("  </relation>\n");
    }

    output.push_str("</osm>\n");

    for err in &errors {
        log::warn!("{}", err);
    }
    Ok((output, errors))
}

fn write_member(output: &mut String, role: &str, way_id: Id) -> std::fmt::Result {
    writeln!(
        output,
        "    <member type=\"way\" role=\"{}\" ref=\"{}\"/>",
        role, way_id
    )
}

fn write_tags(output: &mut String, attributes: &AttributeMap) -> std::fmt::Result {
    for (key, value) in attributes {
        writeln!(
            output,
            "    <tag k=\"{}\" v=\"{}\"/>",
            escape_xml(key),
            escape_xml(value)
        )?;
    }
    Ok(())
}

/// Kürzeste Dezimaldarstellung, die beim Einlesen denselben Wert ergibt
fn format_float(value: f64) -> String {
    format!("{}", value)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
