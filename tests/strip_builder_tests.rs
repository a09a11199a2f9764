/// Integration-Tests für den Strip-Builder und die Nachbarschafts-Abfragen
use glam::DVec2;
use lanelet_strip_builder::query::{left_neighbor, right_neighbor};
use lanelet_strip_builder::{
    build_strip, parse_sample_records, LaneletMap, LaneletProfile, MapFacade, Origin,
    StripOptions,
};

fn fixture_sequences(text: &str) -> Vec<Vec<DVec2>> {
    parse_sample_records(text, ',').expect("Fixture muss parsebar sein")
}

#[test]
fn test_two_sequence_scenario_builds_two_tagged_lanelets() {
    let sequences = fixture_sequences(include_str!("fixtures/two_lane_strip.csv"));
    assert_eq!(sequences.len(), 2);

    let mut facade = MapFacade::new(Origin::default());
    let report = facade
        .build_strip(&sequences, StripOptions::default())
        .unwrap();

    assert_eq!(report.lanelets.len(), 2);
    for &id in &report.lanelets {
        let lanelet = facade.lanelet(id).unwrap();
        let pairs: Vec<(&str, &str)> = lanelet
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("location", "nonurban"),
                ("one_way", "yes"),
                ("region", "de"),
                ("subtype", "highway"),
            ]
        );
    }

    // Zwei Sequenzen: aufeinanderfolgende Zellen teilen keine Randkurve
    assert!(facade.left_neighbor(report.lanelets[1]).is_none());
    assert_eq!(
        facade.following(report.lanelets[0]).unwrap().id,
        report.lanelets[1]
    );
}

#[test]
fn test_left_neighbor_over_shared_middle_curve() {
    let s0 = vec![
        DVec2::new(0.0, 0.0),
        DVec2::new(10.0, 0.0),
        DVec2::new(10.0, 10.0),
    ];
    let s1 = vec![
        DVec2::new(0.0, 5.0),
        DVec2::new(10.0, 5.0),
        DVec2::new(10.0, 15.0),
    ];
    let s2: Vec<DVec2> = s1.iter().map(|p| *p + DVec2::new(0.0, 5.0)).collect();

    let mut map = LaneletMap::default();
    let report = build_strip(
        &mut map,
        &[s0, s1, s2],
        StripOptions::default(),
        &LaneletProfile::default(),
    )
    .unwrap();

    // Erzeugungsreihenfolge: (S0,S1), (S1,S2) je Schritt
    let first = report.lanelets[0];
    let second = report.lanelets[1];
    assert_eq!(map.lanelet(first).unwrap().right, map.lanelet(second).unwrap().left);
    assert_eq!(left_neighbor(&map, second).map(|l| l.id), Some(first));
    assert_eq!(right_neighbor(&map, first).map(|l| l.id), Some(second));
}

#[test]
fn test_left_of_right_is_identity_for_two_cell_sharing() {
    let sequences = fixture_sequences(include_str!("fixtures/three_curves.csv"));
    let mut map = LaneletMap::default();
    let report = build_strip(
        &mut map,
        &sequences,
        StripOptions::default(),
        &LaneletProfile::default(),
    )
    .unwrap();

    for &id in &report.lanelets {
        if let Some(right) = right_neighbor(&map, id) {
            let back = left_neighbor(&map, right.id).map(|l| l.id);
            assert!(back.is_none() || back == Some(id), "Lanelet {id}: {back:?}");
        }
    }
}

#[test]
fn test_counts_per_pair_with_and_without_ring() {
    let sequences = fixture_sequences(include_str!("fixtures/three_curves.csv"));
    let length = sequences[0].len();
    assert_eq!(length, 5, "Leerzeile wird uebersprungen");

    let mut open = LaneletMap::default();
    let report = build_strip(
        &mut open,
        &sequences,
        StripOptions::default(),
        &LaneletProfile::default(),
    )
    .unwrap();
    assert_eq!(report.lanelets.len(), 2 * (length - 1));
    assert_eq!(report.line_strings, 3 * (length - 1));

    let mut ring = LaneletMap::default();
    let report = build_strip(
        &mut ring,
        &sequences,
        StripOptions {
            close_ring: true,
            with_centerline: false,
        },
        &LaneletProfile::default(),
    )
    .unwrap();
    assert_eq!(report.lanelets.len(), 2 * length);
    assert_eq!(report.line_strings, 3 * length);
    assert_eq!(report.points, 3 * length);
}

#[test]
fn test_centerline_mode_with_three_sequences() {
    let sequences = fixture_sequences(include_str!("fixtures/three_curves.csv"));
    let mut facade = MapFacade::default();
    let report = facade
        .build_strip(
            &sequences,
            StripOptions {
                close_ring: false,
                with_centerline: true,
            },
        )
        .unwrap();

    // Mittellinie nur am (S0,S1)-Lanelet jedes Schritts
    for (i, &id) in report.lanelets.iter().enumerate() {
        let lanelet = facade.lanelet(id).unwrap();
        assert_eq!(lanelet.centerline.is_some(), i % 2 == 0, "Lanelet {id}");
    }

    let center = facade.centerline(report.lanelets[0]).unwrap();
    assert_eq!(center[0].truncate(), DVec2::new(0.0, 2.0));
    assert_eq!(center[1].truncate(), DVec2::new(10.0, 2.0));

    // Abgeleitete Mittellinie für Lanelets ohne explizite
    let derived = facade.centerline(report.lanelets[1]).unwrap();
    assert_eq!(derived[0].truncate(), DVec2::new(0.0, 6.0));
}
