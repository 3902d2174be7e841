//! End-to-end tests: partitions merged onto canonical axes and queried.

use coord_common::VertLevel;
use coord_index::{
    CoordValue, CoordinateKind, CoordinateND, CoordinateNDBuilder, CoordinateUniquify,
    IndexConfig, IndexError, Occupancy,
};
use test_utils::{
    assert_approx_eq, assert_density, full_nd, init_test_tracing, offsets, partition_a,
    partition_b, pressure_levels, reference_run, runtime_coordinate, runtimes, time_coordinate,
    vert_coordinate, RecordRef,
};

fn finished(sources: &[&CoordinateND<RecordRef>], config: IndexConfig) -> CoordinateUniquify {
    let mut uniquify = CoordinateUniquify::with_config(config);
    for source in sources {
        uniquify.add_coordinates(source.coordinates()).unwrap();
    }
    uniquify.finish().unwrap();
    uniquify
}

// ============================================================================
// Canonical axis tests
// ============================================================================

#[test]
fn test_canonical_shape_is_union() {
    init_test_tracing();
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&a, &b], IndexConfig::default());

    let canonical = uniquify.canonical().unwrap();
    let sizes: Vec<usize> = canonical.iter().map(|c| c.size()).collect();
    assert_eq!(sizes, vec![11, 11, 10]);

    let kinds: Vec<CoordinateKind> = canonical.iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![CoordinateKind::Runtime, CoordinateKind::Time, CoordinateKind::Vert]
    );

    for source in [&a, &b] {
        for local in source.coordinates() {
            let canon = uniquify.canonical_for(local.kind()).unwrap().unwrap();
            assert!(canon.is_superset_of(local));
        }
    }
}

#[test]
fn test_canonical_axes_are_strictly_ascending() {
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&b, &a], IndexConfig::default());

    for coord in uniquify.canonical().unwrap() {
        let values: Vec<_> = coord.iter().collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{} not ascending", coord);
        for idx in 0..coord.size() {
            assert_eq!(coord.index_of(&coord.value_at(idx).unwrap()), Some(idx));
        }
    }
}

// ============================================================================
// Reindex tests
// ============================================================================

#[test]
fn test_end_to_end_density() {
    init_test_tracing();
    let a = partition_a();
    let b = partition_b();
    assert_eq!(a.sparse_array().density(), 1.0);

    let uniquify = finished(&[&a, &b], IndexConfig::default());
    let out = uniquify.reindex(&a).unwrap();

    assert_eq!(out.coordinate.shape(), &[11, 11, 10]);
    assert_density!(out.coordinate.sparse_array(), 1000, 1210);
    assert_approx_eq!(out.coordinate.sparse_array().density(), 0.826446, 1e-6);

    let out_b = uniquify.reindex(&b).unwrap();
    assert_eq!(out_b.coordinate.sparse_array().density(), 1.0);
}

#[test]
fn test_reindex_is_lossless() {
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&a, &b], IndexConfig::default());

    for source in [&a, &b] {
        let out = uniquify.reindex(source).unwrap();
        assert_eq!(out.coordinate.sparse_array().count(), source.sparse_array().count());
        assert_eq!(out.coordinate.sparse_array().ndups(), 0);
        for (values, record) in source.records() {
            assert_eq!(out.coordinate.get(&values).unwrap(), Some(record));
        }
    }
}

/// Sparse index over (time, level) holding one record per listed pair.
fn scanned(file: u32, cells: &[(i32, f64)]) -> CoordinateND<RecordRef> {
    let mut builder = CoordinateNDBuilder::new(&[CoordinateKind::Time, CoordinateKind::Vert]);
    for (pos, &(time, level)) in cells.iter().enumerate() {
        let values: Vec<CoordValue> = vec![time.into(), VertLevel::single(level).into()];
        builder
            .add_record(values, RecordRef { file, pos: pos as u64 })
            .unwrap();
    }
    builder.finish().unwrap()
}

#[test]
fn test_reindex_sparse_sources_is_lossless() {
    // checkerboard over 3x3 and a scattered 4-of-9, interleaved on both axes
    let x = scanned(
        1,
        &[(0, 1000.0), (0, 800.0), (6, 900.0), (12, 1000.0), (12, 800.0)],
    );
    let y = scanned(2, &[(3, 950.0), (9, 850.0), (12, 800.0), (12, 950.0)]);
    assert_density!(x.sparse_array(), 5, 9);
    assert_density!(y.sparse_array(), 4, 9);

    let uniquify = finished(&[&x, &y], IndexConfig::default());
    for source in [&x, &y] {
        let out = uniquify.reindex(source).unwrap();
        let merged = &out.coordinate;
        assert_eq!(merged.shape(), &[5, 5]);
        assert_eq!(merged.sparse_array().count(), source.sparse_array().count());
        assert_eq!(merged.sparse_array().ndups(), 0);

        // every canonical cell holds exactly what the source holds there
        for flat in 0..merged.sparse_array().total_size() {
            let values = merged.values_at(flat).unwrap();
            assert_eq!(merged.get(&values).unwrap(), source.get(&values).unwrap());
        }
    }
}

#[test]
fn test_signed_zero_levels_share_one_canonical_entry() {
    let positive = scanned(1, &[(0, 0.0)]);
    let negative = scanned(2, &[(0, -0.0 * 100.0)]);
    let uniquify = finished(&[&positive, &negative], IndexConfig::default());

    let vert = uniquify
        .canonical_for(CoordinateKind::Vert)
        .unwrap()
        .unwrap();
    assert_eq!(vert.size(), 1);

    let merged = uniquify.reindex(&negative).unwrap().coordinate;
    let query: Vec<CoordValue> = vec![0.into(), VertLevel::single(0.0).into()];
    assert_eq!(
        merged.get(&query).unwrap(),
        Some(&RecordRef { file: 2, pos: 0 })
    );
}

#[test]
fn test_translations_map_local_to_canonical() {
    // b's first run is missing, so every local index shifts by one
    let runs = runtimes(reference_run(), 4, 6);
    let src = full_nd(
        vec![
            runtime_coordinate(&runs[1..]),
            time_coordinate(&offsets(0, 2, 6)),
        ],
        9,
    );
    let full = full_nd(
        vec![runtime_coordinate(&runs), time_coordinate(&offsets(0, 2, 6))],
        1,
    );
    let uniquify = finished(&[&src, &full], IndexConfig::default());

    let out = uniquify.reindex(&src).unwrap();
    assert_eq!(out.translations, vec![vec![1, 2, 3], vec![0, 1]]);

    let canon = out.coordinate.sparse_array();
    for (local_flat, record) in src.sparse_array().iter() {
        let local = src.sparse_array().unflatten(local_flat);
        let dest: Vec<usize> = local
            .iter()
            .enumerate()
            .map(|(axis, &idx)| out.translations[axis][idx])
            .collect();
        assert_eq!(canon.get(&dest).unwrap(), Some(record));
    }
    // the missing first run is empty
    assert_eq!(canon.get(&[0, 0]).unwrap(), None);
}

#[test]
fn test_reindex_keeps_source_axis_order() {
    let levels = pressure_levels(3);
    let src = full_nd(
        vec![vert_coordinate(&levels), time_coordinate(&[0, 6])],
        3,
    );
    let other = full_nd(vec![time_coordinate(&[3]), vert_coordinate(&levels[..1])], 4);
    let uniquify = finished(&[&other, &src], IndexConfig::default());

    let out = uniquify.reindex(&src).unwrap();
    assert_eq!(out.coordinate.coordinates()[0].kind(), CoordinateKind::Vert);
    assert_eq!(out.coordinate.shape(), &[3, 3]);
}

#[test]
fn test_reindex_requires_finish() {
    let a = partition_a();
    let mut uniquify = CoordinateUniquify::new();
    uniquify.add_coordinates(a.coordinates()).unwrap();
    assert!(matches!(uniquify.reindex(&a), Err(IndexError::IllegalState(_))));
}

#[test]
fn test_reindex_foreign_source_is_invariant_violation() {
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&a], IndexConfig::default());
    let err = uniquify.reindex(&b).unwrap_err();
    assert!(matches!(err, IndexError::InvariantViolation(_)));
}

// ============================================================================
// Batch and concurrency tests
// ============================================================================

#[test]
fn test_reindex_all_parallel_matches_sequential() {
    init_test_tracing();
    let sources: Vec<CoordinateND<RecordRef>> = (0..10)
        .map(|i| if i % 2 == 0 { partition_a() } else { partition_b() })
        .collect();
    let refs: Vec<&CoordinateND<RecordRef>> = sources.iter().collect();

    let parallel = finished(&refs, IndexConfig::default());
    assert!(parallel.config().use_parallel(sources.len()));
    let sequential = finished(
        &refs,
        IndexConfig {
            parallel_reindex: false,
            ..Default::default()
        },
    );

    let par_out = parallel.reindex_all(&sources).unwrap();
    let seq_out = sequential.reindex_all(&sources).unwrap();
    assert_eq!(par_out.len(), 10);
    assert_eq!(par_out, seq_out);
}

#[test]
fn test_finished_index_shared_across_threads() {
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&a, &b], IndexConfig::default());
    let merged = uniquify.reindex(&a).unwrap().coordinate;
    let expected: Vec<_> = a.records().map(|(v, r)| (v, *r)).collect();

    std::thread::scope(|s| {
        for chunk in expected.chunks(250) {
            let merged = &merged;
            s.spawn(move || {
                for (values, record) in chunk {
                    assert_eq!(merged.get(values).unwrap(), Some(record));
                }
            });
        }
    });
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_show_info_reports_empty_indices() {
    let a = partition_a();
    let b = partition_b();
    let uniquify = finished(&[&a, &b], IndexConfig::default());
    let merged = uniquify.reindex(&a).unwrap().coordinate;

    let mut occupancy = Occupancy::new(merged.shape());
    let mut out = String::new();
    merged.show_info(&mut out, Some(&mut occupancy)).unwrap();

    assert_eq!(occupancy.total(), 1000);
    assert_eq!(occupancy.empty_indices(0), vec![10]);
    assert_eq!(occupancy.empty_indices(1), vec![10]);
    assert!(occupancy.empty_indices(2).is_empty());
    assert!(out.contains("records=1000 total=1210"));
}
