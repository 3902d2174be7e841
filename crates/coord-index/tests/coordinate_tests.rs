//! Tests for coordinate construction, lookup, persistence and sharing.

use coord_common::{CoordValue, EnsMember, VertLevel};
use coord_index::{
    CoordValues, Coordinate, CoordinateBuilder, CoordinateKind, CoordinateND,
    CoordinateNDBuilder, CoordinateSharer, IndexError,
};
use rand::seq::SliceRandom;
use test_utils::{
    offsets, pressure_levels, random_offsets, reference_run, runtime_coordinate, runtimes,
    seeded_rng, time2d_coordinate, time_coordinate, vert_coordinate,
};

fn assert_axis_contract(coord: &Coordinate) {
    let values: Vec<CoordValue> = coord.iter().collect();
    assert_eq!(values.len(), coord.size());
    assert!(values.windows(2).all(|w| w[0] < w[1]));
    for idx in 0..coord.size() {
        let value = coord.value_at(idx).unwrap();
        assert_eq!(value.kind(), coord.kind());
        assert_eq!(coord.index_of(&value), Some(idx));
    }
}

// ============================================================================
// Builder tests
// ============================================================================

#[test]
fn test_builder_random_order_matches_sorted() {
    let mut rng = seeded_rng(42);
    let mut raw = random_offsets(&mut rng, 40, 240);
    let mut expected = raw.clone();
    expected.sort();

    raw.extend(raw.clone());
    raw.shuffle(&mut rng);

    let mut builder = CoordinateBuilder::new(CoordinateKind::Time);
    for t in raw {
        builder.add(t.into()).unwrap();
    }
    let coord = builder.finish();

    assert_eq!(coord.values(), CoordValues::Time(&expected));
    assert_axis_contract(&coord);
}

#[test]
fn test_every_kind_honors_axis_contract() {
    let runs = runtimes(reference_run(), 5, 6);
    let ens: Vec<CoordValue> = [(3, 2), (3, 0), (1, 5)]
        .iter()
        .map(|&(code, number)| EnsMember::new(code, number).into())
        .collect();

    let coords = vec![
        runtime_coordinate(&runs),
        time_coordinate(&offsets(0, 8, 3)),
        vert_coordinate(&pressure_levels(6)),
        time2d_coordinate(&runs[..2], &[0, 6]),
        test_utils::coordinate(CoordinateKind::Ensemble, ens),
    ];
    for coord in &coords {
        assert_axis_contract(coord);
    }
}

#[test]
fn test_vert_layers_compare_exactly() {
    let coord = vert_coordinate(&[
        VertLevel::layer(0.0, 10.0),
        VertLevel::layer(0.0, 2.0),
        VertLevel::single(0.0),
        VertLevel::layer(0.0, 10.0),
    ]);
    assert_eq!(coord.size(), 3);
    assert_eq!(coord.index_of(&VertLevel::layer(0.0, 10.0000001).into()), None);
    assert!(coord.index_of(&VertLevel::layer(0.0, 2.0).into()).is_some());
}

// ============================================================================
// Lookup tests
// ============================================================================

#[test]
fn test_value_at_out_of_bounds() {
    let coord = time_coordinate(&[0, 6]);
    assert_eq!(
        coord.value_at(2).unwrap_err(),
        IndexError::out_of_bounds(0, 2, 2)
    );
    assert_eq!(coord.get(2), None);
}

#[test]
fn test_index_of_miss_and_wrong_kind() {
    let coord = time_coordinate(&[0, 6]);
    assert_eq!(coord.index_of(&3.into()), None);
    assert_eq!(coord.index_of(&VertLevel::single(6.0).into()), None);
}

#[test]
fn test_empty_builder_finishes_empty() {
    for kind in [CoordinateKind::Runtime, CoordinateKind::Time2D, CoordinateKind::Ensemble] {
        let coord = CoordinateBuilder::new(kind).finish();
        assert_eq!(coord.kind(), kind);
        assert!(coord.is_empty());
        assert_eq!(coord, Coordinate::empty(kind));
    }
}

// ============================================================================
// Persistence tests
// ============================================================================

#[test]
fn test_from_sorted_round_trip() {
    let coord = vert_coordinate(&pressure_levels(4));
    let rebuilt = Coordinate::from_sorted(coord.kind(), coord.iter().collect()).unwrap();
    assert_eq!(rebuilt, coord);
}

#[test]
fn test_from_sorted_rejects_unsorted_and_duplicates() {
    let unsorted = vec![CoordValue::Time(6), CoordValue::Time(0)];
    assert!(matches!(
        Coordinate::from_sorted(CoordinateKind::Time, unsorted),
        Err(IndexError::Configuration(_))
    ));

    let dup = vec![CoordValue::Time(0), CoordValue::Time(0)];
    assert!(matches!(
        Coordinate::from_sorted(CoordinateKind::Time, dup),
        Err(IndexError::Configuration(_))
    ));

    let mixed = vec![CoordValue::Time(0), VertLevel::single(1.0).into()];
    assert!(matches!(
        Coordinate::from_sorted(CoordinateKind::Time, mixed),
        Err(IndexError::KindMismatch { .. })
    ));
}

#[test]
fn test_json_round_trip_every_kind() {
    let runs = runtimes(reference_run(), 3, 6);
    let coords = vec![
        runtime_coordinate(&runs),
        time_coordinate(&[0, 3]),
        vert_coordinate(&[VertLevel::layer(0.0, 10.0), VertLevel::single(2.0)]),
        time2d_coordinate(&runs, &[0, 6]),
    ];
    for coord in coords {
        let json = serde_json::to_string(&coord).unwrap();
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coord, "round trip of {}", json);
    }
}

#[test]
fn test_json_rejects_unsorted_axis() {
    let json = r#"{"kind":"time","values":[6,0]}"#;
    assert!(serde_json::from_str::<Coordinate>(json).is_err());
}

// ============================================================================
// CoordinateND tests
// ============================================================================

#[test]
fn test_nd_builder_duplicate_records_keep_last() {
    let mut builder = CoordinateNDBuilder::new(&[CoordinateKind::Time]);
    builder.add_record(vec![6.into()], "first").unwrap();
    builder.add_record(vec![6.into()], "second").unwrap();
    let nd: CoordinateND<&str> = builder.finish().unwrap();

    assert_eq!(nd.sparse_array().ndups(), 1);
    assert_eq!(nd.get(&[6.into()]).unwrap(), Some(&"second"));
    assert_eq!(nd.get_coordinate(CoordinateKind::Time).unwrap().size(), 1);
    assert!(nd.get_coordinate(CoordinateKind::Vert).is_none());
}

#[test]
fn test_nd_arity_mismatch_is_configuration_error() {
    let mut builder = CoordinateNDBuilder::new(&[CoordinateKind::Time, CoordinateKind::Vert]);
    builder
        .add_record(vec![0.into(), VertLevel::single(1.0).into()], 1u8)
        .unwrap();
    let nd = builder.finish().unwrap();
    assert!(matches!(nd.get(&[0.into()]), Err(IndexError::Configuration(_))));
}

// ============================================================================
// Sharer tests
// ============================================================================

#[test]
fn test_sharer_across_variables() {
    let runs = runtimes(reference_run(), 2, 12);
    let levels = pressure_levels(3);

    // temperature and height share every axis, wind has fewer levels
    let temperature = vec![time2d_coordinate(&runs, &[0, 6]), vert_coordinate(&levels)];
    let height = temperature.clone();
    let wind = vec![time2d_coordinate(&runs, &[0, 6]), vert_coordinate(&levels[..1])];

    let mut sharer = CoordinateSharer::new();
    for coords in [&temperature, &height, &wind] {
        sharer.add_coords(coords).unwrap();
    }
    let shared = sharer.finish().unwrap();
    // time2D, two vert axes, plus the runtime inside the time2D
    assert_eq!(shared.len(), 4);

    assert_eq!(sharer.reindex_to_shared(&temperature).unwrap(), vec![0, 1]);
    assert_eq!(sharer.reindex_to_shared(&height).unwrap(), vec![0, 1]);
    assert_eq!(sharer.reindex_to_shared(&wind).unwrap(), vec![0, 2]);
    assert_eq!(
        sharer
            .reindex_to_shared(&[runtime_coordinate(&runs)])
            .unwrap(),
        vec![3]
    );
}

#[test]
fn test_sharer_reuses_existing_runtime() {
    let runs = runtimes(reference_run(), 2, 12);
    let mut sharer = CoordinateSharer::new();
    sharer
        .add_coords(&[runtime_coordinate(&runs), time2d_coordinate(&runs, &[0])])
        .unwrap();
    let shared = sharer.finish().unwrap();
    assert_eq!(shared.len(), 2);

    let time2d = shared[1].as_time2d().unwrap().clone();
    assert_eq!(sharer.runtime_index(&time2d).unwrap(), 0);
}
