mod support;

use mesh_arrangement::{
    ArrangementConfig, ArrangementError, ArrangementInput, ArrangementWarning, CoplanarPolicy, EngineKind, InputError,
    Stage, build_arrangement,
};
use std::time::Duration;
use support::*;

fn engines() -> Vec<ArrangementConfig> {
    let mut configs = vec![ArrangementConfig::mesh(), ArrangementConfig::fast()];
    if cfg!(feature = "parry") {
        configs.push(ArrangementConfig::backend());
    }
    configs
}

#[test]
fn single_tetrahedron() {
    for config in engines() {
        let arrangement = build_arrangement(&tets(&[0.0]), &config).unwrap();
        assert_eq!(arrangement.cell_count(), 2, "{}", config.engine);
        assert_eq!(arrangement.patch_count(), 1);
        assert_eq!(arrangement.vertices().len(), 4);
        assert_eq!(arrangement.facets().len(), 4);
        assert_eq!(sorted_windings(&arrangement), vec![vec![0], vec![1]]);
        assert!(arrangement.warnings().is_empty());

        // outward facets: outside on the positive side
        assert!(arrangement.winding_numbers().iter().all(|w| *w == Some([0, 1])));
        assert_eq!(arrangement.cells(), vec![[0, 1]]);
        assert_eq!(arrangement.cell(0).unwrap().winding, Some(vec![0]));
    }
}

#[test]
fn disjoint_tetrahedra() {
    for config in engines() {
        let arrangement = build_arrangement(&tets(&[0.0, 10.0]), &config).unwrap();
        assert_eq!(arrangement.cell_count(), 3);
        assert_eq!(arrangement.patch_count(), 2);
        assert_eq!(arrangement.vertices().len(), 8);
        assert_eq!(arrangement.facets().len(), 8);
        assert_eq!(sorted_windings(&arrangement), vec![vec![0, 0], vec![0, 1], vec![1, 0]]);
    }
}

#[test]
fn overlapping_tetrahedra() {
    for config in engines() {
        let arrangement = build_arrangement(&tets(&[0.0, 0.2]), &config).unwrap();
        assert_eq!(arrangement.cell_count(), 4);
        assert_eq!(
            sorted_windings(&arrangement),
            vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
        for pair in arrangement.winding_numbers() {
            let [pos, neg] = pair.unwrap();
            assert_eq!((pos - neg).abs(), 1);
        }

        assert_eq!(arrangement.winding_at([0.25, 0.25, 0.25]).unwrap(), Some(&[1, 1][..]));
        assert_eq!(arrangement.winding_at([0.05, 0.05, 0.05]).unwrap(), Some(&[1, 0][..]));
        assert_eq!(arrangement.winding_at([0.9, 0.25, 0.25]).unwrap(), Some(&[0, 1][..]));
        assert_eq!(arrangement.winding_at([5.0, 5.0, 5.0]).unwrap(), Some(&[0, 0][..]));
        assert_eq!(arrangement.locate([5.0, -3.0, 2.0]).unwrap(), Some(0));
    }
}

#[test]
fn facets_only_change_their_own_winding() {
    for config in engines() {
        let arrangement = build_arrangement(&tets(&[0.0, 0.2, 0.45]), &config).unwrap();
        assert_eq!(arrangement.num_meshes(), 3);
        for (facet, source) in arrangement.output_facets().iter().enumerate() {
            let [pos, neg] = arrangement.facet_winding(facet).unwrap();
            assert_eq!(pos.len(), 3);
            for mesh in 0..3 {
                assert_eq!(neg[mesh] - pos[mesh], i32::from(mesh == source.mesh), "facet {facet}, mesh {mesh}");
            }
        }
        assert!(arrangement.facet_winding(arrangement.facets().len()).is_none());
    }
}

#[test]
fn boolean_extraction_volumes() {
    let arrangement = build_arrangement(&tets(&[0.0, 0.2]), &ArrangementConfig::default()).unwrap();
    let tet = 1.0 / 6.0;
    let common = 0.4f64.powi(3) / 6.0;
    let cases = [
        (arrangement.union(), 2.0 * tet - common),
        (arrangement.intersection(), common),
        (arrangement.difference(0, 1), tet - common),
        (arrangement.difference(1, 0), tet - common),
        (arrangement.xor(), 2.0 * tet - 2.0 * common),
    ];
    for (faces, expected) in cases {
        assert!(is_closed(&faces));
        let volume = signed_volume(arrangement.vertices(), &faces);
        assert!(approx_eq(volume, expected, 1e-9), "{volume} != {expected}");
    }
}

#[test]
fn duplicated_triangle_with_exact_engine() {
    let mut input = tets(&[0.0]);
    input.add_mesh(&TET_VERTICES[..3], &[[0, 1, 2]]);

    let arrangement = build_arrangement(&input, &ArrangementConfig::mesh()).unwrap();
    assert_eq!(arrangement.cell_count(), 3);
    assert_eq!(arrangement.patch_count(), 3);
    assert_eq!(arrangement.vertices().len(), 4);
    assert_eq!(arrangement.facets().len(), 5);

    let degenerate: Vec<usize> = (0..arrangement.cell_count())
        .filter(|&c| arrangement.cell(c).unwrap().degenerate)
        .collect();
    assert_eq!(degenerate.len(), 1);
    assert!(arrangement
        .warnings()
        .contains(&ArrangementWarning::DegenerateCell { cell: degenerate[0] }));
    let flagged = (0..arrangement.patch_count())
        .filter(|&p| arrangement.patch(p).unwrap().degenerate)
        .count();
    assert_eq!(flagged, 2);
}

#[test]
fn duplicated_triangle_merged_by_fast_engine() {
    let mut input = tets(&[0.0]);
    input.add_mesh(&TET_VERTICES[..3], &[[0, 1, 2]]);

    let arrangement = build_arrangement(&input, &ArrangementConfig::fast()).unwrap();
    assert_eq!(arrangement.coplanar_policy(), CoplanarPolicy::Merge);
    assert_eq!(arrangement.cell_count(), 2);
    assert_eq!(arrangement.vertices().len(), 4);
    assert_eq!(arrangement.facets().len(), 4);
    assert!(arrangement
        .warnings()
        .contains(&ArrangementWarning::MergedCoplanarFacets { count: 1 }));
    // the tetrahedron itself stays consistent
    assert!(!arrangement
        .warnings()
        .iter()
        .any(|w| matches!(w, ArrangementWarning::InconsistentWinding { mesh: 0, .. })));
}

#[test]
fn triangle_cutting_a_tetrahedron() {
    let cut = [[0.0, 0.0, 0.5], [1.0, 0.0, 0.5], [0.0, 1.0, 0.5]];
    for config in engines() {
        let mut input = tets(&[0.0]);
        input.add_mesh(&cut, &[[0, 1, 2]]);
        let arrangement = build_arrangement(&input, &config).unwrap();
        assert_eq!(arrangement.cell_count(), 3);
        assert_eq!(arrangement.patch_count(), 4);
        assert_eq!(arrangement.vertices().len(), 9);
        assert_eq!(arrangement.facets().len(), 13);

        let inside: Vec<i32> = (1..3)
            .map(|c| arrangement.cell(c).unwrap().winding.as_ref().unwrap()[0])
            .collect();
        assert_eq!(inside, vec![1, 1]);
        // the cut splits into the inner triangle and a trapezoid
        let pieces = (0..13).filter(|&f| arrangement.source_label(f) == Some((1, 0))).count();
        assert_eq!(pieces, 3);
    }
}

#[test]
fn glued_tetrahedra() {
    let below: Vec<[f64; 3]> = TET_VERTICES.iter().map(|&[x, y, z]| [x, y, -z]).collect();
    let below_facets: Vec<[usize; 3]> = TET_FACETS.iter().map(|&[a, b, c]| [a, c, b]).collect();
    let mut input = tets(&[0.0]);
    input.add_mesh(&below, &below_facets);

    let separate = build_arrangement(&input, &ArrangementConfig::mesh()).unwrap();
    assert_eq!(separate.cell_count(), 4);
    assert_eq!(
        (0..4).filter(|&c| separate.cell(c).unwrap().degenerate).count(),
        1
    );

    let merged = build_arrangement(&input, &ArrangementConfig::fast()).unwrap();
    assert_eq!(merged.cell_count(), 3);
    assert_eq!(sorted_windings(&merged), vec![vec![0, 0], vec![0, 1], vec![1, 0]]);
    for arrangement in [&separate, &merged] {
        assert!(!arrangement
            .warnings()
            .iter()
            .any(|w| matches!(w, ArrangementWarning::InconsistentWinding { .. })));
    }
}

#[test]
fn nested_cubes() {
    let mut input = ArrangementInput::default();
    input.add_mesh(&cube([0.0; 3], [4.0; 3]), &CUBE_FACETS);
    input.add_mesh(&cube([1.0; 3], [2.0; 3]), &CUBE_FACETS);

    let arrangement = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.cell_count(), 3);
    assert_eq!(arrangement.patch_count(), 2);
    assert_eq!(sorted_windings(&arrangement), vec![vec![0, 0], vec![1, 0], vec![1, 1]]);
    assert_eq!(arrangement.winding_at([1.5, 1.5, 1.5]).unwrap(), Some(&[1, 1][..]));
    assert_eq!(arrangement.winding_at([3.0, 0.5, 3.5]).unwrap(), Some(&[1, 0][..]));
    assert_eq!(arrangement.locate([2.0, 1.5, 1.5]).unwrap(), None);

    let shell = arrangement.difference(0, 1);
    assert!(approx_eq(signed_volume(arrangement.vertices(), &shell), 63.0, 1e-9));
}

#[test]
fn overlapping_cubes() {
    let mut input = ArrangementInput::default();
    input.add_mesh(&cube([0.0; 3], [1.0; 3]), &CUBE_FACETS);
    input.add_mesh(&cube([0.5; 3], [1.5; 3]), &CUBE_FACETS);

    let arrangement = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.cell_count(), 4);
    let union = arrangement.union();
    assert!(is_closed(&union));
    assert!(approx_eq(signed_volume(arrangement.vertices(), &union), 1.875, 1e-9));
    assert!(approx_eq(
        signed_volume(arrangement.vertices(), &arrangement.intersection()),
        0.125,
        1e-9
    ));
}

#[test]
fn cubes_with_coplanar_faces() {
    let mut input = ArrangementInput::default();
    input.add_mesh(&cube([0.0; 3], [1.0; 3]), &CUBE_FACETS);
    input.add_mesh(&cube([0.5, 0.5, 0.0], [1.5, 1.5, 1.0]), &CUBE_FACETS);

    for policy in [CoplanarPolicy::Merge, CoplanarPolicy::KeepSeparate] {
        let config = ArrangementConfig::default().with_coplanar_policy(policy);
        let arrangement = build_arrangement(&input, &config).unwrap();
        assert!(!arrangement
            .warnings()
            .iter()
            .any(|w| matches!(w, ArrangementWarning::InconsistentWinding { .. })));

        let union = arrangement.union();
        assert!(is_closed(&union));
        assert!(approx_eq(signed_volume(arrangement.vertices(), &union), 1.75, 1e-9));
        let both = arrangement.intersection();
        assert!(approx_eq(signed_volume(arrangement.vertices(), &both), 0.25, 1e-9));

        let degenerate = (0..arrangement.cell_count()).any(|c| arrangement.cell(c).unwrap().degenerate);
        assert_eq!(degenerate, policy == CoplanarPolicy::KeepSeparate);
    }
}

#[test]
fn faces_of_cell_are_oriented_outward() {
    let arrangement = build_arrangement(&tets(&[0.0]), &ArrangementConfig::default()).unwrap();
    let inside = arrangement.faces_of_cell(1).unwrap();
    assert_eq!(inside.len(), 4);
    assert!(approx_eq(signed_volume(arrangement.vertices(), &inside), 1.0 / 6.0, 1e-12));
    let outside = arrangement.faces_of_cell(0).unwrap();
    assert!(approx_eq(signed_volume(arrangement.vertices(), &outside), -1.0 / 6.0, 1e-12));

    assert_eq!(
        arrangement.faces_of_cell(2),
        Err(ArrangementError::InvalidCell { cell: 2, count: 2 })
    );
}

#[test]
fn open_sheet_bounds_the_same_cell_twice() {
    let mut input = ArrangementInput::default();
    input.add_mesh(&TET_VERTICES[..3], &[[0, 1, 2]]);
    let arrangement = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.cell_count(), 1);
    assert_eq!(arrangement.cells(), vec![[0, 0]]);
    assert_eq!(arrangement.faces_of_cell(0).unwrap().len(), 2);
    assert!(arrangement
        .warnings()
        .contains(&ArrangementWarning::InconsistentWinding { mesh: 0, patch: 0 }));
}

#[test]
fn labels_and_vertex_map_follow_the_input() {
    let input = ArrangementInput::with_labels(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
        TET_FACETS.to_vec(),
        vec![10, 11, 12, 13],
        vec![0; 4],
    )
    .unwrap();
    let arrangement = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.input_vertex_map(), &[0, 1, 2, 3, 1]);
    assert_eq!(arrangement.face_labels(), vec![10, 11, 12, 13]);
    assert_eq!(arrangement.source_label(3), Some((0, 13)));
    assert_eq!(arrangement.source_label(4), None);
    assert_eq!(arrangement.patches(), &[0, 0, 0, 0]);
}

#[test]
fn rebuilding_is_deterministic() {
    let input = tets(&[0.0, 0.2, 0.45]);
    let first = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    let second = build_arrangement(&input, &ArrangementConfig::default()).unwrap();
    assert_eq!(first.facets(), second.facets());
    assert_eq!(first.cells(), second.cells());
    assert_eq!(sorted_windings(&first), sorted_windings(&second));
}

#[test]
fn engines_agree_on_windings() {
    let input = tets(&[0.0, 0.2, 0.45]);
    let reference = build_arrangement(&input, &ArrangementConfig::mesh()).unwrap();
    for config in engines() {
        let arrangement = build_arrangement(&input, &config.clone().with_delaunay(false)).unwrap();
        assert_eq!(arrangement.engine(), config.engine);
        assert_eq!(arrangement.cell_count(), reference.cell_count());
        assert_eq!(sorted_windings(&arrangement), sorted_windings(&reference));
    }
}

#[test]
fn degenerate_facets_are_dropped_and_reported() {
    let mut vertices = TET_VERTICES.to_vec();
    vertices.push([2.0, 0.0, 0.0]);
    let mut facets = TET_FACETS.to_vec();
    facets.push([0, 1, 4]);
    facets.push([2, 2, 3]);
    let arrangement = build_arrangement(&ArrangementInput::new(vertices, facets), &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.facets().len(), 4);
    assert_eq!(
        arrangement.warnings(),
        &[ArrangementWarning::DroppedDegenerateFacets { facets: vec![4, 5] }]
    );
}

#[test]
fn malformed_input_is_rejected() {
    let out_of_range = ArrangementInput::new(TET_VERTICES.to_vec(), vec![[0, 1, 7]]);
    assert_eq!(
        build_arrangement(&out_of_range, &ArrangementConfig::default()).unwrap_err(),
        ArrangementError::Input(InputError::IndexOutOfRange {
            facet: 0,
            index: 7,
            vertex_count: 4
        })
    );

    let mut vertices = TET_VERTICES.to_vec();
    vertices[2][1] = f64::NAN;
    let non_finite = ArrangementInput::new(vertices, TET_FACETS.to_vec());
    for config in engines() {
        assert_eq!(
            build_arrangement(&non_finite, &config).unwrap_err(),
            ArrangementError::Input(InputError::NonFiniteCoordinate { vertex: 2 })
        );
    }

    let labels = ArrangementInput::with_labels(TET_VERTICES.to_vec(), TET_FACETS.to_vec(), vec![0; 3], vec![0; 4]);
    assert!(matches!(labels, Err(InputError::LabelMismatch { name: "source_facet_ids", .. })));

    let arrangement = build_arrangement(&tets(&[0.0]), &ArrangementConfig::default()).unwrap();
    assert!(matches!(
        arrangement.locate([f64::INFINITY, 0.0, 0.0]),
        Err(ArrangementError::Input(InputError::NonFiniteCoordinate { .. }))
    ));
}

#[test]
fn huge_coordinates_need_the_exact_engine() {
    let vertices: Vec<[f64; 3]> = TET_VERTICES.iter().map(|p| p.map(|c| c * 1e250)).collect();
    let input = ArrangementInput::new(vertices, TET_FACETS.to_vec());

    match build_arrangement(&input, &ArrangementConfig::fast()) {
        Err(ArrangementError::PrecisionExceeded { engine, vertex, .. }) => {
            assert_eq!(engine, EngineKind::Fast);
            assert_eq!(vertex, 1);
        },
        other => panic!("expected PrecisionExceeded, got {other:?}"),
    }

    let exact = build_arrangement(&input, &ArrangementConfig::mesh()).unwrap();
    assert_eq!(exact.cell_count(), 2);
    assert_eq!(sorted_windings(&exact), vec![vec![0], vec![1]]);
}

#[test]
fn time_limit_is_checked_between_stages() {
    let config = ArrangementConfig::default().with_time_limit(Duration::ZERO);
    assert!(matches!(
        build_arrangement(&tets(&[0.0]), &config),
        Err(ArrangementError::TimeLimitExceeded {
            stage: Stage::Preparation,
            ..
        })
    ));
}

#[cfg(not(feature = "parry"))]
#[test]
fn backend_requires_the_parry_feature() {
    assert_eq!(
        build_arrangement(&tets(&[0.0]), &ArrangementConfig::backend()).unwrap_err(),
        ArrangementError::EngineUnavailable(EngineKind::Backend)
    );
}

#[test]
fn empty_input_has_only_the_exterior() {
    let arrangement = build_arrangement(&ArrangementInput::default(), &ArrangementConfig::default()).unwrap();
    assert_eq!(arrangement.cell_count(), 1);
    assert_eq!(arrangement.patch_count(), 0);
    assert_eq!(arrangement.locate([1.0, 2.0, 3.0]).unwrap(), Some(0));
    assert!(arrangement.union().is_empty());
}
