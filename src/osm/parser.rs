//! Parser für Lanelet2-OSM-Dateien.

use anyhow::{bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::{AttributeMap, GeoPoint, Id, Lanelet, LaneletMap, LineString, Point, Projector};

/// Rohdaten eines `<node>`.
#[derive(Debug, Default)]
struct RawNode {
    id: Id,
    lat: f64,
    lon: f64,
    tags: AttributeMap,
}

/// Rohdaten eines `<way>`.
#[derive(Debug, Default)]
struct RawWay {
    id: Id,
    refs: Vec<Id>,
    tags: AttributeMap,
}

/// Ein `<member>` einer Relation.
#[derive(Debug)]
struct RawMember {
    kind: String,
    role: String,
    reference: Id,
}

/// Rohdaten einer `<relation>`.
#[derive(Debug, Default)]
struct RawRelation {
    id: Id,
    members: Vec<RawMember>,
    tags: AttributeMap,
}

/// Element, dessen Kinder (`tag`, `nd`, `member`) gerade gelesen werden.
enum Current {
    None,
    Node(RawNode),
    Way(RawWay),
    Relation(RawRelation),
}

#[derive(Default)]
struct RawOsm {
    nodes: Vec<RawNode>,
    ways: Vec<RawWay>,
    relations: Vec<RawRelation>,
}

/// Parsed eine Lanelet2-OSM-Datei aus einem XML-String.
///
/// XML- und Attribut-Fehler sind fatal. Inhaltliche Probleme (fehlende Referenzen,
/// ungültige Geometrie, unbekannte Relationen) werden gesammelt, das betroffene
/// Primitiv übersprungen und mit dem Rest weitergemacht.
pub fn parse_osm(xml_content: &str, projector: &dyn Projector) -> Result<(LaneletMap, Vec<String>)> {
    let raw = read_raw(xml_content)?;
    let mut errors = Vec::new();
    let mut map = LaneletMap::new(projector.origin());

    for node in raw.nodes {
        let ele = match node.tags.get("ele") {
            Some(text) => text.trim().parse::<f64>().unwrap_or_else(|_| {
                errors.push(format!("Node {}: ungueltige Hoehe '{}'", node.id, text));
                0.0
            }),
            None => 0.0,
        };
        let local = projector.forward(GeoPoint::new(node.lat, node.lon, ele));
        if !local.is_finite() {
            errors.push(format!(
                "Node {}: Koordinate nicht endlich (lat {}, lon {}, ele {}), ignoriert",
                node.id, node.lat, node.lon, ele
            ));
            continue;
        }
        if let Err(e) = map.insert_point(Point::new(node.id, local)) {
            errors.push(format!("Node {}: {}", node.id, e));
        }
    }

    for way in raw.ways {
        let line = LineString {
            id: way.id,
            points: way.refs,
            attributes: way.tags,
        };
        if let Err(e) = map.insert_line_string(line) {
            errors.push(format!("Way {}: {}", way.id, e));
        }
    }

    for relation in raw.relations {
        match relation_to_lanelet(relation) {
            Ok(lanelet) => {
                let id = lanelet.id;
                if let Err(e) = map.insert_lanelet(lanelet) {
                    errors.push(format!("Lanelet {}: {}", id, e));
                }
            }
            Err(msg) => errors.push(msg),
        }
    }

    map.rebuild_spatial_index();

    for err in &errors {
        log::warn!("{}", err);
    }
    log::info!(
        "{} errors, {} lanes detected",
        errors.len(),
        map.lanelet_count()
    );

    Ok((map, errors))
}

/// Übersetzt eine Relation in ein Lanelet; andere Relationstypen werden gemeldet.
fn relation_to_lanelet(mut relation: RawRelation) -> std::result::Result<Lanelet, String> {
    let kind = relation.tags.shift_remove("type").unwrap_or_default();
    if kind != "lanelet" {
        return Err(format!(
            "Relation {}: Typ '{}' wird nicht unterstuetzt, ignoriert",
            relation.id, kind
        ));
    }

    let role = |name: &str| {
        relation
            .members
            .iter()
            .find(|m| m.kind == "way" && m.role == name)
            .map(|m| m.reference)
    };
    let left = role("left").ok_or_else(|| format!("Lanelet {}: linker Rand fehlt", relation.id))?;
    let right =
        role("right").ok_or_else(|| format!("Lanelet {}: rechter Rand fehlt", relation.id))?;
    let centerline = role("centerline");

    let lanelet = Lanelet::new(relation.id, left, right).with_attributes(relation.tags);
    Ok(match centerline {
        Some(center_id) => lanelet.with_centerline(center_id),
        None => lanelet,
    })
}

/// Liest alle Nodes, Ways und Relationen ohne inhaltliche Prüfung.
fn read_raw(xml_content: &str) -> Result<RawOsm> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut buffer = Vec::new();
    let mut raw = RawOsm::default();
    let mut current = Current::None;
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                saw_root |= tag == "osm";
                current = open_element(&reader, &tag, e, current)?;
            }
            Ok(Event::Empty(ref e)) => {
                // Selbstschließende Elemente sind sofort vollständig
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                current = open_element(&reader, &tag, e, current)?;
                current = close_element(&tag, current, &mut raw);
            }
            Ok(Event::End(ref e)) => {
                let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
                current = close_element(&tag, current, &mut raw);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err).context("Fehler beim Parsen des OSM-XML"),
            _ => {}
        }

        buffer.clear();
    }

    if !saw_root {
        bail!("Kein <osm>-Wurzelelement gefunden");
    }

    Ok(raw)
}

fn open_element(
    reader: &Reader<&[u8]>,
    tag: &str,
    e: &BytesStart,
    current: Current,
) -> Result<Current> {
    let next = match (tag, current) {
        ("node", _) => Current::Node(RawNode {
            id: required_attr(reader, e, "id")?,
            lat: required_attr(reader, e, "lat")?,
            lon: required_attr(reader, e, "lon")?,
            tags: AttributeMap::new(),
        }),
        ("way", _) => Current::Way(RawWay {
            id: required_attr(reader, e, "id")?,
            ..RawWay::default()
        }),
        ("relation", _) => Current::Relation(RawRelation {
            id: required_attr(reader, e, "id")?,
            ..RawRelation::default()
        }),
        ("tag", mut element) => {
            let key: String = required_attr(reader, e, "k")?;
            let value: String = required_attr(reader, e, "v")?;
            match &mut element {
                Current::Node(node) => {
                    node.tags.insert(key, value);
                }
                Current::Way(way) => {
                    way.tags.insert(key, value);
                }
                Current::Relation(relation) => {
                    relation.tags.insert(key, value);
                }
                Current::None => {}
            }
            element
        }
        ("nd", Current::Way(mut way)) => {
            way.refs.push(required_attr(reader, e, "ref")?);
            Current::Way(way)
        }
        ("member", Current::Relation(mut relation)) => {
            relation.members.push(RawMember {
                kind: required_attr(reader, e, "type")?,
                role: required_attr(reader, e, "role")?,
                reference: required_attr(reader, e, "ref")?,
            });
            Current::Relation(relation)
        }
        (_, element) => element,
    };
    Ok(next)
}

fn close_element(tag: &str, current: Current, raw: &mut RawOsm) -> Current {
    match (tag, current) {
        ("node", Current::Node(node)) => {
            raw.nodes.push(node);
            Current::None
        }
        ("way", Current::Way(way)) => {
            raw.ways.push(way);
            Current::None
        }
        ("relation", Current::Relation(relation)) => {
            raw.relations.push(relation);
            Current::None
        }
        (_, element) => element,
    }
}

/// Liest ein Pflicht-Attribut und parsed es in den Zieltyp.
fn required_attr<T>(reader: &Reader<&[u8]>, e: &BytesStart, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    <T as std::str::FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        let key = reader.decoder().decode(attr.key.as_ref())?;
        if key == name {
            let value = attr.unescape_value()?;
            let element = reader.decoder().decode(e.name().as_ref())?.into_owned();
            return value.trim().parse::<T>().with_context(|| {
                format!(
                    "Attribut '{}' von <{}> konnte nicht geparst werden: '{}'",
                    name,
                    element,
                    truncate_for_error(&value)
                )
            });
        }
    }
    let element_name = e.name();
    let element = reader.decoder().decode(element_name.as_ref())?;
    bail!("Pflicht-Attribut '{}' fehlt in <{}>", name, element)
}

/// Kürzt einen String für Fehlermeldungen auf max. 40 Zeichen
fn truncate_for_error(s: &str) -> &str {
    match s.char_indices().nth(40) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests;
