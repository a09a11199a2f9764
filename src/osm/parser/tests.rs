use super::*;
use crate::core::{MercatorProjector, Origin};
use approx::assert_relative_eq;

const TWO_LANE_OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="49.0" lon="8.4"><tag k="ele" v="112.5"/></node>
  <node id="2" lat="49.0" lon="8.4001"/>
  <node id="3" lat="49.00003" lon="8.4"/>
  <node id="4" lat="49.00003" lon="8.4001"/>
  <way id="10"><nd ref="1"/><nd ref="2"/></way>
  <way id="11"><nd ref="3"/><nd ref="4"/><tag k="type" v="line_thin"/></way>
  <relation id="20">
    <member type="way" role="left" ref="10"/>
    <member type="way" role="right" ref="11"/>
    <tag k="type" v="lanelet"/>
    <tag k="subtype" v="road"/>
    <tag k="one_way" v="yes"/>
  </relation>
</osm>
"#;

fn projector() -> MercatorProjector {
    MercatorProjector::new(Origin::new(49.0, 8.4))
}

#[test]
fn test_parse_simple_lanelet() {
    let (map, errors) = parse_osm(TWO_LANE_OSM, &projector()).unwrap();

    assert!(errors.is_empty(), "unerwartete Fehler: {errors:?}");
    assert_eq!(map.point_count(), 4);
    assert_eq!(map.line_string_count(), 2);
    assert_eq!(map.lanelet_count(), 1);

    let lanelet = map.lanelet(20).unwrap();
    assert_eq!(lanelet.left, 10);
    assert_eq!(lanelet.right, 11);
    assert_eq!(lanelet.attribute("subtype"), Some("road"));
    assert_eq!(lanelet.attribute("type"), None, "Relationstyp ist kein Attribut");

    let line = map.line_string(11).unwrap();
    assert_eq!(line.attributes.get("type").map(String::as_str), Some("line_thin"));
}

#[test]
fn test_parse_projects_to_local_coordinates() {
    let (map, _) = parse_osm(TWO_LANE_OSM, &projector()).unwrap();

    let origin = map.point(1).unwrap();
    assert_relative_eq!(origin.position.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(origin.position.y, 0.0, epsilon = 1e-6);
    assert_relative_eq!(origin.position.z, 112.5);

    let east = map.point(2).unwrap();
    assert!(east.position.x > 7.0 && east.position.x < 7.5);
}

#[test]
fn test_next_id_continues_after_loaded_ids() {
    let (mut map, _) = parse_osm(TWO_LANE_OSM, &projector()).unwrap();
    assert_eq!(map.add_point(0.0, 0.0).unwrap(), 21);
}

#[test]
fn test_spatial_index_ready_after_load() {
    let (map, _) = parse_osm(TWO_LANE_OSM, &projector()).unwrap();
    assert!(map.spatial_index().is_some());
}

#[test]
fn test_missing_references_are_collected() {
    let xml = r#"
    <osm version="0.6">
      <node id="1" lat="0" lon="0"/>
      <node id="2" lat="0" lon="0.0001"/>
      <way id="10"><nd ref="1"/><nd ref="2"/></way>
      <way id="11"><nd ref="1"/><nd ref="99"/></way>
      <relation id="20">
        <member type="way" role="left" ref="10"/>
        <member type="way" role="right" ref="11"/>
        <tag k="type" v="lanelet"/>
      </relation>
      <relation id="21">
        <member type="way" role="left" ref="10"/>
        <tag k="type" v="lanelet"/>
      </relation>
      <relation id="30">
        <tag k="type" v="regulatory_element"/>
      </relation>
    </osm>
    "#;

    let (map, errors) = parse_osm(xml, &MercatorProjector::default()).unwrap();

    assert_eq!(map.point_count(), 2);
    assert_eq!(map.line_string_count(), 1);
    assert_eq!(map.lanelet_count(), 0);
    assert_eq!(errors.len(), 4, "Fehlerliste: {errors:?}");
    assert!(errors[0].starts_with("Way 11"));
    assert!(errors[1].starts_with("Lanelet 20"));
    assert!(errors[2].contains("rechter Rand fehlt"));
    assert!(errors[3].contains("regulatory_element"));
}

#[test]
fn test_duplicate_node_is_collected() {
    let xml = r#"
    <osm version="0.6">
      <node id="1" lat="0" lon="0"/>
      <node id="1" lat="1" lon="1"/>
    </osm>
    "#;

    let (map, errors) = parse_osm(xml, &MercatorProjector::default()).unwrap();
    assert_eq!(map.point_count(), 1);
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_parse_fails_for_invalid_coordinate() {
    let xml = r#"<osm version="0.6"><node id="1" lat="abc" lon="0"/></osm>"#;

    let err = parse_osm(xml, &MercatorProjector::default()).expect_err("Parser sollte fehlschlagen");
    let msg = format!("{err:#}");
    assert!(msg.contains("lat"));
}

#[test]
fn test_parse_fails_for_broken_xml() {
    let xml = r#"<osm version="0.6"><node id="1" lat="0" lon="0"></way></osm>"#;
    assert!(parse_osm(xml, &MercatorProjector::default()).is_err());
}

#[test]
fn test_parse_fails_without_osm_root() {
    let xml = r#"<AutoDrive><waypoints/></AutoDrive>"#;
    assert!(parse_osm(xml, &MercatorProjector::default()).is_err());
}

#[test]
fn test_escaped_tag_values_are_unescaped() {
    let xml = r#"
    <osm version="0.6">
      <node id="1" lat="0" lon="0"/>
      <node id="2" lat="0" lon="0.0001"/>
      <way id="3"><nd ref="1"/><nd ref="2"/><tag k="name" v="A &amp; B"/></way>
    </osm>
    "#;

    let (map, _) = parse_osm(xml, &MercatorProjector::default()).unwrap();
    let line = map.line_string(3).unwrap();
    assert_eq!(line.attributes.get("name").map(String::as_str), Some("A & B"));
}

#[test]
fn test_non_finite_nodes_are_skipped() {
    let xml = r#"
    <osm version="0.6">
      <node id="1" lat="nan" lon="0"/>
      <node id="2" lat="0" lon="inf"/>
      <node id="3" lat="0" lon="0"><tag k="ele" v="NaN"/></node>
      <node id="4" lat="0" lon="0.0001"/>
    </osm>
    "#;

    let (map, errors) = parse_osm(xml, &MercatorProjector::default()).unwrap();
    assert_eq!(map.point_count(), 1);
    assert!(map.point(4).is_some());
    assert_eq!(errors.len(), 3, "Fehlerliste: {errors:?}");
    assert!(errors[0].starts_with("Node 1"));
    assert!(errors[2].starts_with("Node 3"));
    assert!(errors.iter().all(|e| e.contains("nicht endlich")));
}

#[test]
fn test_largest_id_is_reported_not_inserted() {
    let xml = r#"
    <osm version="0.6">
      <node id="9223372036854775807" lat="0" lon="0"/>
      <node id="5" lat="0" lon="0"/>
    </osm>
    "#;

    let (mut map, errors) = parse_osm(xml, &MercatorProjector::default()).unwrap();
    assert_eq!(map.point_count(), 1);
    assert_eq!(errors.len(), 1, "Fehlerliste: {errors:?}");
    assert!(errors[0].starts_with("Node 9223372036854775807"));
    assert_eq!(map.add_point(1.0, 1.0).unwrap(), 6);
}

#[test]
fn test_missing_attribute_names_element() {
    let xml = r#"<osm version="0.6"><node id="1" lat="0"/></osm>"#;

    let err = parse_osm(xml, &MercatorProjector::default()).expect_err("Parser sollte fehlschlagen");
    let msg = format!("{err:#}");
    assert!(msg.contains("lon"));
    assert!(msg.contains("node"));
}
