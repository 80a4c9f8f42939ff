use ogrid_kernel::geom::primitives::{
    make_cone, make_cylinder, make_hollow_cylinder, make_hollow_sphere, make_sphere,
};
use ogrid_kernel::geom::{GeomStore, GeomVolumeId};
use ogrid_kernel::topology::{audit, GeomAssociation, TopoStore};
use ogrid_kernel::Tolerance;
use ogrid_ops::{execute_ogrid, BuildError, OGridBuild};
use ogrid_types::{
    ConeProfile, ConeSpec, CylinderSpec, HollowCylinderSpec, HollowSphereSpec, OGridSpec, Portion,
    SphereSpec,
};

fn run(
    geom: &GeomStore,
    volume: GeomVolumeId,
    grid: &OGridSpec,
) -> Result<(TopoStore, OGridBuild), BuildError> {
    let mut topo = TopoStore::new();
    let tol = Tolerance::default();
    let build = execute_ogrid(geom, &mut topo, &tol, volume, grid)?;
    Ok((topo, build))
}

/// Build and assert the whole boundary ended up associated.
fn run_ok(geom: &GeomStore, volume: GeomVolumeId, grid: &OGridSpec) -> (TopoStore, OGridBuild) {
    let (topo, build) = run(geom, volume, grid).expect("o-grid build failed");
    let loose = audit::unassociated_boundary(&topo).unwrap();
    assert!(loose.is_empty(), "unassociated boundary entities: {loose:?}");
    for (_, b) in topo.live_blocks() {
        assert_eq!(b.assoc, GeomAssociation::Volume(volume), "block not on volume");
    }
    (topo, build)
}

fn sizes(topo: &TopoStore) -> Vec<(u32, u32, u32)> {
    let mut out: Vec<_> = topo
        .live_blocks()
        .map(|(_, b)| (b.size.n_i, b.size.n_j, b.size.n_k))
        .collect();
    out.sort_unstable();
    out
}

fn cylinder(angle_deg: f64) -> (GeomStore, GeomVolumeId) {
    let mut geom = GeomStore::new();
    let vol = make_cylinder(
        &mut geom,
        &CylinderSpec {
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            radius: 1.0,
            height: 2.0,
            angle_deg,
        },
    )
    .unwrap();
    (geom, vol)
}

fn cone(profile: ConeProfile, angle_deg: f64) -> (GeomStore, GeomVolumeId) {
    let mut geom = GeomStore::new();
    let vol = make_cone(
        &mut geom,
        &ConeSpec {
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            profile,
            height: 2.0,
            angle_deg,
        },
    )
    .unwrap();
    (geom, vol)
}

fn sphere(portion: Portion) -> (GeomStore, GeomVolumeId) {
    let mut geom = GeomStore::new();
    let vol = make_sphere(
        &mut geom,
        &SphereSpec {
            center: [0.0, 0.0, 0.0],
            radius: 1.0,
            portion,
        },
    )
    .unwrap();
    (geom, vol)
}

fn hollow_cylinder(angle_deg: f64) -> (GeomStore, GeomVolumeId) {
    let mut geom = GeomStore::new();
    let vol = make_hollow_cylinder(
        &mut geom,
        &HollowCylinderSpec {
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            r_int: 0.5,
            r_ext: 1.0,
            height: 2.0,
            angle_deg,
        },
    )
    .unwrap();
    (geom, vol)
}

fn hollow_sphere(portion: Portion) -> (GeomStore, GeomVolumeId) {
    let mut geom = GeomStore::new();
    let vol = make_hollow_sphere(
        &mut geom,
        &HollowSphereSpec {
            center: [0.0, 0.0, 0.0],
            r_int: 0.5,
            r_ext: 1.0,
            portion,
        },
    )
    .unwrap();
    (geom, vol)
}

// ── Cylinders ──────────────────────────────────────────────────────────────

#[test]
fn cylinder_full_one_block() {
    let (geom, vol) = cylinder(360.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    assert_eq!(build.blocks.len(), 1);
    assert_eq!(sizes(&topo), vec![(8, 8, 5)]);
}

#[test]
fn cylinder_full_ogrid_has_core_and_ring() {
    let (geom, vol) = cylinder(360.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert_eq!(build.blocks.len(), 5);
    assert_eq!(
        sizes(&topo),
        vec![(3, 8, 5), (3, 8, 5), (8, 3, 5), (8, 3, 5), (8, 8, 5)]
    );
}

#[test]
fn cylinder_full_degenerate_collapses_onto_axis() {
    let (geom, vol) = cylinder(360.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.0));
    assert_eq!(build.blocks.len(), 4);
    assert_eq!(sizes(&topo), vec![(8, 5, 3); 4]);
    for (_, b) in topo.live_blocks() {
        assert!(b.is_degenerate(), "axis blocks must share collapsed corners");
    }
}

#[test]
fn cylinder_quarter_one_block() {
    let (geom, vol) = cylinder(90.0);
    let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    assert_eq!(build.blocks.len(), 1);
}

#[test]
fn cylinder_quarter_ogrid() {
    let (geom, vol) = cylinder(90.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert_eq!(build.blocks.len(), 3);
    assert_eq!(sizes(&topo), vec![(3, 4, 5), (4, 3, 5), (4, 4, 5)]);
}

#[test]
fn cylinder_half_one_block_splits_diameter_face() {
    let (geom, vol) = cylinder(180.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    assert_eq!(build.blocks.len(), 1);
    // The diameter face slot carries the two cut plane halves.
    let (_, block) = topo.live_blocks().next().unwrap();
    assert_eq!(block.faces[2].len(), 2, "JMin slot should hold both halves");
}

#[test]
fn cylinder_half_ogrid() {
    let (geom, vol) = cylinder(180.0);
    let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert_eq!(build.blocks.len(), 4);
}

#[test]
fn cylinder_wedge_degenerate_is_single_block() {
    for angle in [90.0, 180.0] {
        let (geom, vol) = cylinder(angle);
        let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.0));
        assert_eq!(build.blocks.len(), 1, "angle {angle}");
    }
}

// ── Cones ──────────────────────────────────────────────────────────────────

#[test]
fn cone_frustum_behaves_like_cylinder() {
    let profile = ConeProfile::Frustum { r1: 1.0, r2: 0.5 };
    let (geom, vol) = cone(profile, 360.0);
    let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert_eq!(build.blocks.len(), 5);

    let (geom, vol) = cone(profile, 90.0);
    let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    assert_eq!(build.blocks.len(), 1);
}

#[test]
fn cone_apex_full_one_block_collapses_to_tip() {
    let (geom, vol) = cone(ConeProfile::Apex { r2: 1.0 }, 360.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    assert_eq!(build.blocks.len(), 1);
    let (_, block) = topo.live_blocks().next().unwrap();
    assert!(block.is_degenerate());
}

#[test]
fn cone_apex_ogrid_counts() {
    for (angle, expected) in [(360.0, 5), (180.0, 4), (90.0, 3)] {
        let (geom, vol) = cone(ConeProfile::Apex { r2: 1.0 }, angle);
        let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
        assert_eq!(build.blocks.len(), expected, "angle {angle}");
    }
}

#[test]
fn cone_apex_rejects_degenerate_core() {
    let (geom, vol) = cone(ConeProfile::Apex { r2: 1.0 }, 360.0);
    let err = run(&geom, vol, &OGridSpec::new(4, 3, 5, 0.0)).unwrap_err();
    assert!(
        matches!(err, BuildError::UnsupportedConfiguration { .. }),
        "got {err:?}"
    );
}

#[test]
fn failed_build_leaves_store_empty() {
    let (geom, vol) = cone(ConeProfile::Apex { r2: 1.0 }, 360.0);
    let mut topo = TopoStore::new();
    let tol = Tolerance::default();
    let err = execute_ogrid(&geom, &mut topo, &tol, vol, &OGridSpec::new(4, 3, 5, 0.0));
    assert!(err.is_err());
    assert_eq!(topo.live_blocks().count(), 0, "rollback must drop all blocks");
}

// ── Spheres ────────────────────────────────────────────────────────────────

#[test]
fn sphere_one_block_counts() {
    for portion in [Portion::Full, Portion::Half, Portion::Quarter, Portion::Eighth] {
        let (geom, vol) = sphere(portion);
        let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
        assert_eq!(build.blocks.len(), 1, "{portion:?}");
    }
}

#[test]
fn sphere_ogrid_shell_counts() {
    for (portion, expected) in [
        (Portion::Full, 7),
        (Portion::Half, 6),
        (Portion::Quarter, 5),
        (Portion::Eighth, 4),
    ] {
        let (geom, vol) = sphere(portion);
        let (_, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
        assert_eq!(build.blocks.len(), expected, "{portion:?}");
    }
}

#[test]
fn sphere_degenerate_shell_counts() {
    for (portion, expected) in [
        (Portion::Full, 6),
        (Portion::Half, 5),
        (Portion::Quarter, 4),
        (Portion::Eighth, 3),
    ] {
        let (geom, vol) = sphere(portion);
        let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.0));
        assert_eq!(build.blocks.len(), expected, "{portion:?}");
        for (_, b) in topo.live_blocks() {
            assert!(b.is_degenerate(), "{portion:?}: shells must collapse inward");
        }
    }
}

#[test]
fn sphere_full_ogrid_sizes() {
    let (geom, vol) = sphere(Portion::Full);
    let (topo, _) = run_ok(&geom, vol, &OGridSpec::new(2, 3, 5, 0.5));
    let mut expected = vec![(4, 4, 3); 6];
    expected.push((4, 4, 4));
    expected.sort_unstable();
    assert_eq!(sizes(&topo), expected);
}

// ── Hollow shapes ──────────────────────────────────────────────────────────

#[test]
fn hollow_cylinder_full_is_a_ring_of_four() {
    let (geom, vol) = hollow_cylinder(360.0);
    let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert_eq!(build.blocks.len(), 4);
    assert_eq!(sizes(&topo), vec![(8, 5, 3); 4]);
}

#[test]
fn hollow_cylinder_wedges_are_single_blocks() {
    for (angle, n_arc) in [(90.0, 8), (180.0, 16)] {
        let (geom, vol) = hollow_cylinder(angle);
        let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
        assert_eq!(build.blocks.len(), 1, "angle {angle}");
        assert_eq!(sizes(&topo), vec![(n_arc, 5, 3)], "angle {angle}");
    }
}

#[test]
fn hollow_sphere_shell_counts() {
    for (portion, expected) in [
        (Portion::Full, 6),
        (Portion::Half, 5),
        (Portion::Quarter, 4),
        (Portion::Eighth, 3),
    ] {
        let (geom, vol) = hollow_sphere(portion);
        let (topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
        assert_eq!(build.blocks.len(), expected, "{portion:?}");
        for (_, b) in topo.live_blocks() {
            assert!(!b.is_degenerate(), "{portion:?}: the hole replaces the core");
        }
    }
}

// ── Journal round trips ────────────────────────────────────────────────────

#[test]
fn journal_replays_backward_and_forward() {
    let (geom, vol) = cylinder(360.0);
    let (mut topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 0.5));
    assert!(!build.changes.is_empty());
    assert_eq!(topo.live_blocks().count(), 5);

    topo.apply_changes(&build.changes, true);
    assert_eq!(topo.live_blocks().count(), 0);
    assert_eq!(topo.live_faces().count(), 0);
    assert_eq!(topo.live_vertices().count(), 0);

    topo.apply_changes(&build.changes, false);
    assert_eq!(topo.live_blocks().count(), 5);
    audit::audit(&topo).expect("redo must restore a clean topology");
}

#[test]
fn journal_round_trip_survives_a_split() {
    // A half cylinder build destroys a face while splitting, so the change
    // set mixes creations and destructions.
    let (geom, vol) = cylinder(180.0);
    let (mut topo, build) = run_ok(&geom, vol, &OGridSpec::new(4, 3, 5, 1.0));
    let faces_before = topo.live_faces().count();

    topo.apply_changes(&build.changes, true);
    assert_eq!(topo.live_faces().count(), 0);
    topo.apply_changes(&build.changes, false);
    assert_eq!(topo.live_faces().count(), faces_before);
    audit::audit(&topo).expect("redo must restore a clean topology");
}

// ── Validation ─────────────────────────────────────────────────────────────

#[test]
fn bad_discretization_is_rejected_before_building() {
    let (geom, vol) = cylinder(360.0);
    for grid in [
        OGridSpec::new(0, 3, 5, 0.5),
        OGridSpec::new(4, 3, 5, 1.5),
        OGridSpec::new(4, 3, 5, f64::NAN),
    ] {
        let err = run(&geom, vol, &grid).unwrap_err();
        assert!(matches!(err, BuildError::Validation { .. }), "got {err:?}");
    }
}
