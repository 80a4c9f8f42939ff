//! Factories for the canonical solid primitives.
//!
//! Each factory creates the volume and its complete ordered boundary
//! (vertices, curves, surfaces). The enumeration order is fixed and
//! documented per shape: the o-grid builders index directly into these lists
//! and gate themselves on the exact counts, so order is part of the contract.

use nalgebra::{Point3, Rotation3, Unit, Vector3};
use ogrid_types::{
    ConeProfile, ConeSpec, CylinderSpec, HollowCylinderSpec, HollowSphereSpec, Portion,
    PrimitiveShape, SphereSpec,
};
use tracing::instrument;

use super::store::{
    CurveKind, GeomCurveId, GeomError, GeomStore, GeomSurfaceId, GeomVertexId, GeomVolumeId,
    SurfaceKind,
};

/// Rotation mapping the local `+z` axis onto `axis`, using the spherical
/// angles of `axis` so the transverse directions are deterministic.
pub fn axis_rotation(axis: &Vector3<f64>) -> Result<Rotation3<f64>, GeomError> {
    let n = axis.norm();
    if n < 1e-14 {
        return Err(GeomError::ZeroAxis);
    }
    let theta = (axis.z / n).clamp(-1.0, 1.0).acos();
    let phi = axis.y.atan2(axis.x);
    Ok(Rotation3::from_axis_angle(&Vector3::z_axis(), phi)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), theta))
}

/// Local frame of a primitive: `z` along the axis, origin at the base center.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub origin: Point3<f64>,
    pub rot: Rotation3<f64>,
}

impl Frame {
    pub fn new(center: [f64; 3], axis: [f64; 3]) -> Result<Self, GeomError> {
        let origin = Point3::new(center[0], center[1], center[2]);
        let rot = axis_rotation(&Vector3::new(axis[0], axis[1], axis[2]))?;
        Ok(Self { origin, rot })
    }

    /// Frame with an arbitrary (identity) orientation, for spheres.
    pub fn at(center: [f64; 3]) -> Self {
        Self {
            origin: Point3::new(center[0], center[1], center[2]),
            rot: Rotation3::identity(),
        }
    }

    pub fn pt(&self, x: f64, y: f64, z: f64) -> Point3<f64> {
        self.origin + self.rot * Vector3::new(x, y, z)
    }

    pub fn dir(&self, x: f64, y: f64, z: f64) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.rot * Vector3::new(x, y, z))
    }
}

fn check_positive(what: &'static str, value: f64) -> Result<(), GeomError> {
    if value <= 0.0 {
        return Err(GeomError::InvalidParameter { what, value });
    }
    Ok(())
}

fn portion_of(angle_deg: f64) -> Result<Portion, GeomError> {
    Portion::from_angle_deg(angle_deg).map_err(|_| GeomError::InvalidParameter {
        what: "angle",
        value: angle_deg,
    })
}

fn arc(
    frame: &Frame,
    center_z: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
) -> CurveKind {
    let start = frame.dir(start_angle.cos(), start_angle.sin(), 0.0);
    CurveKind::Arc {
        center: frame.pt(0.0, 0.0, center_z),
        axis: frame.dir(0.0, 0.0, 1.0),
        start,
        radius,
        sweep,
    }
}

fn segment(a: Point3<f64>, b: Point3<f64>) -> CurveKind {
    CurveKind::Segment { a, b }
}

/// Build a cylinder volume.
///
/// Full (360°) boundary order:
/// - surfaces: `[lateral, top disk, bottom disk]`
/// - curves: `[top circle, seam segment, bottom circle]`
/// - vertices: `[bottom seam rim, top seam rim]`
///
/// Quarter/half boundary order (cut at angles `0` and `a`):
/// - vertices: `[bottom axis, top axis, bottom rim@0, top rim@0,
///   bottom rim@a, top rim@a]`
/// - curves: `[top arc, bottom arc, bottom radius@0, top radius@0,
///   bottom radius@a, top radius@a, rim vertical@0, rim vertical@a, axis]`
/// - surfaces: `[lateral, top, bottom, cut plane@0, cut plane@a]`
#[instrument(skip(store))]
pub fn make_cylinder(store: &mut GeomStore, spec: &CylinderSpec) -> Result<GeomVolumeId, GeomError> {
    check_positive("radius", spec.radius)?;
    check_positive("height", spec.height)?;
    let portion = portion_of(spec.angle_deg)?;
    let frame = Frame::new(spec.center, spec.axis)?;
    let (r, h) = (spec.radius, spec.height);

    match portion {
        Portion::Full => {
            let v0 = store.add_vertex(frame.pt(r, 0.0, 0.0));
            let v1 = store.add_vertex(frame.pt(r, 0.0, h));
            let tau = std::f64::consts::TAU;
            let c_top = store.add_curve(arc(&frame, h, r, 0.0, tau), vec![]);
            let c_seam = store.add_curve(segment(frame.pt(r, 0.0, 0.0), frame.pt(r, 0.0, h)), vec![v0, v1]);
            let c_bot = store.add_curve(arc(&frame, 0.0, r, 0.0, tau), vec![]);
            let lateral = store.add_surface(
                SurfaceKind::Cylindrical {
                    center: frame.origin,
                    axis: frame.dir(0.0, 0.0, 1.0),
                    radius: r,
                },
                vec![c_top, c_bot, c_seam],
            );
            let top = store.add_surface(plane(&frame, h, 1.0), vec![c_top]);
            let bottom = store.add_surface(plane(&frame, 0.0, -1.0), vec![c_bot]);
            Ok(store.add_volume(
                PrimitiveShape::Cylinder(*spec),
                vec![lateral, top, bottom],
                vec![c_top, c_seam, c_bot],
                vec![v0, v1],
            ))
        }
        Portion::Quarter | Portion::Half => {
            let a = spec.angle_deg.to_radians();
            let wedge = WedgeBoundary::build(store, &frame, r, r, h, a, None)?;
            Ok(store.add_volume(
                PrimitiveShape::Cylinder(*spec),
                wedge.surfaces,
                wedge.curves,
                wedge.vertices,
            ))
        }
        Portion::Eighth => Err(GeomError::InvalidParameter {
            what: "portion",
            value: spec.angle_deg,
        }),
    }
}

/// Build a cone volume.
///
/// Frustum variants share the cylinder boundary orders, with radius `r1` at
/// the base and `r2` at the far end. Apex variants:
/// - full: surfaces `[lateral, far disk]`, curves `[far circle, slant seam]`,
///   vertices `[apex, far seam rim]`
/// - quarter/half: vertices `[apex, far center, far rim@0, far rim@a]`,
///   curves `[far arc, slant@0, slant@a, far radius@0, far radius@a, axis]`,
///   surfaces `[lateral, far disk, cut plane@0, cut plane@a]`
#[instrument(skip(store))]
pub fn make_cone(store: &mut GeomStore, spec: &ConeSpec) -> Result<GeomVolumeId, GeomError> {
    check_positive("height", spec.height)?;
    let (r1, r2) = spec.profile.radii();
    check_positive("r2", r2)?;
    if let ConeProfile::Frustum { r1, .. } = spec.profile {
        check_positive("r1", r1)?;
    }
    let portion = portion_of(spec.angle_deg)?;
    let frame = Frame::new(spec.center, spec.axis)?;
    let h = spec.height;

    let lateral_kind = SurfaceKind::Conical {
        origin: frame.origin,
        axis: frame.dir(0.0, 0.0, 1.0),
        r_origin: r1,
        r_far: r2,
        height: h,
    };

    match (portion, spec.profile.is_apex()) {
        (Portion::Full, false) => {
            let v0 = store.add_vertex(frame.pt(r1, 0.0, 0.0));
            let v1 = store.add_vertex(frame.pt(r2, 0.0, h));
            let tau = std::f64::consts::TAU;
            let c_far = store.add_curve(arc(&frame, h, r2, 0.0, tau), vec![]);
            let c_seam = store.add_curve(segment(frame.pt(r1, 0.0, 0.0), frame.pt(r2, 0.0, h)), vec![v0, v1]);
            let c_base = store.add_curve(arc(&frame, 0.0, r1, 0.0, tau), vec![]);
            let lateral = store.add_surface(lateral_kind, vec![c_far, c_base, c_seam]);
            let far = store.add_surface(plane(&frame, h, 1.0), vec![c_far]);
            let base = store.add_surface(plane(&frame, 0.0, -1.0), vec![c_base]);
            Ok(store.add_volume(
                PrimitiveShape::Cone(*spec),
                vec![lateral, far, base],
                vec![c_far, c_seam, c_base],
                vec![v0, v1],
            ))
        }
        (Portion::Full, true) => {
            let apex = store.add_vertex(frame.pt(0.0, 0.0, 0.0));
            let rim = store.add_vertex(frame.pt(r2, 0.0, h));
            let tau = std::f64::consts::TAU;
            let c_far = store.add_curve(arc(&frame, h, r2, 0.0, tau), vec![]);
            let c_slant = store.add_curve(segment(frame.pt(0.0, 0.0, 0.0), frame.pt(r2, 0.0, h)), vec![apex, rim]);
            let lateral = store.add_surface(lateral_kind, vec![c_far, c_slant]);
            let far = store.add_surface(plane(&frame, h, 1.0), vec![c_far]);
            Ok(store.add_volume(
                PrimitiveShape::Cone(*spec),
                vec![lateral, far],
                vec![c_far, c_slant],
                vec![apex, rim],
            ))
        }
        (Portion::Quarter | Portion::Half, false) => {
            let a = spec.angle_deg.to_radians();
            let wedge = WedgeBoundary::build(store, &frame, r1, r2, h, a, Some(lateral_kind))?;
            Ok(store.add_volume(
                PrimitiveShape::Cone(*spec),
                wedge.surfaces,
                wedge.curves,
                wedge.vertices,
            ))
        }
        (Portion::Quarter | Portion::Half, true) => {
            let a = spec.angle_deg.to_radians();
            let apex_p = frame.pt(0.0, 0.0, 0.0);
            let far_c = frame.pt(0.0, 0.0, h);
            let rim0 = frame.pt(r2, 0.0, h);
            let rim_a = frame.pt(r2 * a.cos(), r2 * a.sin(), h);

            let apex = store.add_vertex(apex_p);
            let center = store.add_vertex(far_c);
            let v_rim0 = store.add_vertex(rim0);
            let v_rim_a = store.add_vertex(rim_a);

            let c_arc = store.add_curve(arc(&frame, h, r2, 0.0, a), vec![v_rim0, v_rim_a]);
            let c_slant0 = store.add_curve(segment(apex_p, rim0), vec![apex, v_rim0]);
            let c_slant_a = store.add_curve(segment(apex_p, rim_a), vec![apex, v_rim_a]);
            let c_rad0 = store.add_curve(segment(far_c, rim0), vec![center, v_rim0]);
            let c_rad_a = store.add_curve(segment(far_c, rim_a), vec![center, v_rim_a]);
            let c_axis = store.add_curve(segment(apex_p, far_c), vec![apex, center]);

            let lateral = store.add_surface(lateral_kind, vec![c_arc, c_slant0, c_slant_a]);
            let far = store.add_surface(plane(&frame, h, 1.0), vec![c_arc, c_rad0, c_rad_a]);
            let cut0 = store.add_surface(cut_plane(&frame, 0.0), vec![c_slant0, c_rad0, c_axis]);
            let cut_a = store.add_surface(cut_plane(&frame, a), vec![c_slant_a, c_rad_a, c_axis]);

            Ok(store.add_volume(
                PrimitiveShape::Cone(*spec),
                vec![lateral, far, cut0, cut_a],
                vec![c_arc, c_slant0, c_slant_a, c_rad0, c_rad_a, c_axis],
                vec![apex, center, v_rim0, v_rim_a],
            ))
        }
        (Portion::Eighth, _) => Err(GeomError::InvalidParameter {
            what: "portion",
            value: spec.angle_deg,
        }),
    }
}

/// Build a sphere volume. Portions are cut by coordinate planes through the
/// center; the poles sit on the local `z` axis.
///
/// Boundary orders:
/// - full: surfaces `[shell]`
/// - half (kept `y >= 0`): vertices `[north pole, south pole]`, curves
///   `[rim arc through +x, rim arc through -x, polar axis segment]`,
///   surfaces `[shell, half disk +x, half disk -x]`
/// - quarter (kept `x, y >= 0`): vertices `[north, south]`, curves
///   `[rim arc in y=0, rim arc in x=0, polar axis segment]`,
///   surfaces `[shell, cut plane y=0, cut plane x=0]`
/// - eighth (kept `x, y, z >= 0`): vertices `[center, +x, +y, +z]`, curves
///   `[arc x->y, arc y->z, arc z->x, radius->x, radius->y, radius->z]`,
///   surfaces `[shell, plane z=0, plane x=0, plane y=0]`
#[instrument(skip(store))]
pub fn make_sphere(store: &mut GeomStore, spec: &SphereSpec) -> Result<GeomVolumeId, GeomError> {
    check_positive("radius", spec.radius)?;
    let frame = Frame::at(spec.center);
    let r = spec.radius;
    let shell_kind = SurfaceKind::Spherical {
        center: frame.origin,
        radius: r,
    };

    match spec.portion {
        Portion::Full => {
            let shell = store.add_surface(shell_kind, vec![]);
            Ok(store.add_volume(PrimitiveShape::Sphere(*spec), vec![shell], vec![], vec![]))
        }
        Portion::Half | Portion::Quarter => {
            let north_p = frame.pt(0.0, 0.0, r);
            let south_p = frame.pt(0.0, 0.0, -r);
            let north = store.add_vertex(north_p);
            let south = store.add_vertex(south_p);

            // Pole-to-pole meridian arcs bounding the kept region.
            let pi = std::f64::consts::PI;
            let arc_a = store.add_curve(
                CurveKind::Arc {
                    center: frame.origin,
                    axis: frame.dir(0.0, 1.0, 0.0),
                    start: frame.dir(0.0, 0.0, 1.0),
                    radius: r,
                    sweep: pi,
                },
                vec![north, south],
            );
            let second_axis = match spec.portion {
                // Half keeps y >= 0: second meridian passes through -x.
                Portion::Half => frame.dir(0.0, -1.0, 0.0),
                // Quarter keeps x, y >= 0: second meridian passes through +y.
                _ => frame.dir(-1.0, 0.0, 0.0),
            };
            let arc_b = store.add_curve(
                CurveKind::Arc {
                    center: frame.origin,
                    axis: second_axis,
                    start: frame.dir(0.0, 0.0, 1.0),
                    radius: r,
                    sweep: pi,
                },
                vec![north, south],
            );
            let polar = store.add_curve(segment(north_p, south_p), vec![north, south]);

            let shell = store.add_surface(shell_kind, vec![arc_a, arc_b]);
            let disk_a = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(0.0, 1.0, 0.0),
                },
                vec![arc_a, polar],
            );
            let disk_b = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: match spec.portion {
                        Portion::Half => frame.dir(0.0, 1.0, 0.0),
                        _ => frame.dir(1.0, 0.0, 0.0),
                    },
                },
                vec![arc_b, polar],
            );
            Ok(store.add_volume(
                PrimitiveShape::Sphere(*spec),
                vec![shell, disk_a, disk_b],
                vec![arc_a, arc_b, polar],
                vec![north, south],
            ))
        }
        Portion::Eighth => {
            let c_p = frame.pt(0.0, 0.0, 0.0);
            let x_p = frame.pt(r, 0.0, 0.0);
            let y_p = frame.pt(0.0, r, 0.0);
            let z_p = frame.pt(0.0, 0.0, r);
            let center = store.add_vertex(c_p);
            let vx = store.add_vertex(x_p);
            let vy = store.add_vertex(y_p);
            let vz = store.add_vertex(z_p);

            let q = std::f64::consts::FRAC_PI_2;
            let arc_xy = store.add_curve(
                CurveKind::Arc {
                    center: frame.origin,
                    axis: frame.dir(0.0, 0.0, 1.0),
                    start: frame.dir(1.0, 0.0, 0.0),
                    radius: r,
                    sweep: q,
                },
                vec![vx, vy],
            );
            let arc_yz = store.add_curve(
                CurveKind::Arc {
                    center: frame.origin,
                    axis: frame.dir(1.0, 0.0, 0.0),
                    start: frame.dir(0.0, 1.0, 0.0),
                    radius: r,
                    sweep: q,
                },
                vec![vy, vz],
            );
            let arc_zx = store.add_curve(
                CurveKind::Arc {
                    center: frame.origin,
                    axis: frame.dir(0.0, 1.0, 0.0),
                    start: frame.dir(0.0, 0.0, 1.0),
                    radius: r,
                    sweep: q,
                },
                vec![vz, vx],
            );
            let rad_x = store.add_curve(segment(c_p, x_p), vec![center, vx]);
            let rad_y = store.add_curve(segment(c_p, y_p), vec![center, vy]);
            let rad_z = store.add_curve(segment(c_p, z_p), vec![center, vz]);

            let shell = store.add_surface(shell_kind, vec![arc_xy, arc_yz, arc_zx]);
            let plane_z = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(0.0, 0.0, 1.0),
                },
                vec![arc_xy, rad_x, rad_y],
            );
            let plane_x = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(1.0, 0.0, 0.0),
                },
                vec![arc_yz, rad_y, rad_z],
            );
            let plane_y = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(0.0, 1.0, 0.0),
                },
                vec![arc_zx, rad_z, rad_x],
            );
            Ok(store.add_volume(
                PrimitiveShape::Sphere(*spec),
                vec![shell, plane_z, plane_x, plane_y],
                vec![arc_xy, arc_yz, arc_zx, rad_x, rad_y, rad_z],
                vec![center, vx, vy, vz],
            ))
        }
    }
}

/// Build a hollow cylinder volume.
///
/// Full boundary order:
/// - vertices: `[bottom outer seam, top outer seam, bottom inner seam,
///   top inner seam]`
/// - curves: `[top outer circle, top inner circle, bottom outer circle,
///   bottom inner circle, outer seam, inner seam]`
/// - surfaces: `[outer lateral, inner lateral, top ring, bottom ring]`
///
/// Quarter/half boundary order (cut at angles `0` and `a`):
/// - vertices: `[bot outer@0, top outer@0, bot inner@0, top inner@0,
///   bot outer@a, top outer@a, bot inner@a, top inner@a]`
/// - curves: `[top outer arc, top inner arc, bot outer arc, bot inner arc,
///   outer vertical@0, inner vertical@0, outer vertical@a, inner vertical@a,
///   top radial@0, bot radial@0, top radial@a, bot radial@a]`
/// - surfaces: `[outer lateral, inner lateral, top ring, bottom ring,
///   cut plane@0, cut plane@a]`
#[instrument(skip(store))]
pub fn make_hollow_cylinder(
    store: &mut GeomStore,
    spec: &HollowCylinderSpec,
) -> Result<GeomVolumeId, GeomError> {
    check_positive("r_int", spec.r_int)?;
    check_positive("height", spec.height)?;
    if spec.r_ext <= spec.r_int {
        return Err(GeomError::InvalidParameter {
            what: "r_ext",
            value: spec.r_ext,
        });
    }
    let portion = portion_of(spec.angle_deg)?;
    let frame = Frame::new(spec.center, spec.axis)?;
    let (ri, re, h) = (spec.r_int, spec.r_ext, spec.height);

    let outer_kind = SurfaceKind::Cylindrical {
        center: frame.origin,
        axis: frame.dir(0.0, 0.0, 1.0),
        radius: re,
    };
    let inner_kind = SurfaceKind::Cylindrical {
        center: frame.origin,
        axis: frame.dir(0.0, 0.0, 1.0),
        radius: ri,
    };

    match portion {
        Portion::Full => {
            let v0 = store.add_vertex(frame.pt(re, 0.0, 0.0));
            let v1 = store.add_vertex(frame.pt(re, 0.0, h));
            let v2 = store.add_vertex(frame.pt(ri, 0.0, 0.0));
            let v3 = store.add_vertex(frame.pt(ri, 0.0, h));
            let tau = std::f64::consts::TAU;
            let c_te = store.add_curve(arc(&frame, h, re, 0.0, tau), vec![]);
            let c_ti = store.add_curve(arc(&frame, h, ri, 0.0, tau), vec![]);
            let c_be = store.add_curve(arc(&frame, 0.0, re, 0.0, tau), vec![]);
            let c_bi = store.add_curve(arc(&frame, 0.0, ri, 0.0, tau), vec![]);
            let c_se = store.add_curve(segment(frame.pt(re, 0.0, 0.0), frame.pt(re, 0.0, h)), vec![v0, v1]);
            let c_si = store.add_curve(segment(frame.pt(ri, 0.0, 0.0), frame.pt(ri, 0.0, h)), vec![v2, v3]);

            let outer = store.add_surface(outer_kind, vec![c_te, c_be, c_se]);
            let inner = store.add_surface(inner_kind, vec![c_ti, c_bi, c_si]);
            let top = store.add_surface(plane(&frame, h, 1.0), vec![c_te, c_ti]);
            let bottom = store.add_surface(plane(&frame, 0.0, -1.0), vec![c_be, c_bi]);
            Ok(store.add_volume(
                PrimitiveShape::HollowCylinder(*spec),
                vec![outer, inner, top, bottom],
                vec![c_te, c_ti, c_be, c_bi, c_se, c_si],
                vec![v0, v1, v2, v3],
            ))
        }
        Portion::Quarter | Portion::Half => {
            let a = spec.angle_deg.to_radians();
            let p = |radius: f64, ang: f64, z: f64| frame.pt(radius * ang.cos(), radius * ang.sin(), z);

            let verts_p = [
                p(re, 0.0, 0.0),
                p(re, 0.0, h),
                p(ri, 0.0, 0.0),
                p(ri, 0.0, h),
                p(re, a, 0.0),
                p(re, a, h),
                p(ri, a, 0.0),
                p(ri, a, h),
            ];
            let v: Vec<GeomVertexId> = verts_p.iter().map(|q| store.add_vertex(*q)).collect();

            let c_te = store.add_curve(arc(&frame, h, re, 0.0, a), vec![v[1], v[5]]);
            let c_ti = store.add_curve(arc(&frame, h, ri, 0.0, a), vec![v[3], v[7]]);
            let c_be = store.add_curve(arc(&frame, 0.0, re, 0.0, a), vec![v[0], v[4]]);
            let c_bi = store.add_curve(arc(&frame, 0.0, ri, 0.0, a), vec![v[2], v[6]]);
            let c_ve0 = store.add_curve(segment(verts_p[0], verts_p[1]), vec![v[0], v[1]]);
            let c_vi0 = store.add_curve(segment(verts_p[2], verts_p[3]), vec![v[2], v[3]]);
            let c_vea = store.add_curve(segment(verts_p[4], verts_p[5]), vec![v[4], v[5]]);
            let c_via = store.add_curve(segment(verts_p[6], verts_p[7]), vec![v[6], v[7]]);
            let c_tr0 = store.add_curve(segment(verts_p[3], verts_p[1]), vec![v[3], v[1]]);
            let c_br0 = store.add_curve(segment(verts_p[2], verts_p[0]), vec![v[2], v[0]]);
            let c_tra = store.add_curve(segment(verts_p[7], verts_p[5]), vec![v[7], v[5]]);
            let c_bra = store.add_curve(segment(verts_p[6], verts_p[4]), vec![v[6], v[4]]);

            let outer = store.add_surface(outer_kind, vec![c_te, c_be, c_ve0, c_vea]);
            let inner = store.add_surface(inner_kind, vec![c_ti, c_bi, c_vi0, c_via]);
            let top = store.add_surface(plane(&frame, h, 1.0), vec![c_te, c_ti, c_tr0, c_tra]);
            let bottom = store.add_surface(plane(&frame, 0.0, -1.0), vec![c_be, c_bi, c_br0, c_bra]);
            let cut0 = store.add_surface(cut_plane(&frame, 0.0), vec![c_ve0, c_vi0, c_tr0, c_br0]);
            let cut_a = store.add_surface(cut_plane(&frame, a), vec![c_vea, c_via, c_tra, c_bra]);

            Ok(store.add_volume(
                PrimitiveShape::HollowCylinder(*spec),
                vec![outer, inner, top, bottom, cut0, cut_a],
                vec![
                    c_te, c_ti, c_be, c_bi, c_ve0, c_vi0, c_vea, c_via, c_tr0, c_br0, c_tra, c_bra,
                ],
                v,
            ))
        }
        Portion::Eighth => Err(GeomError::InvalidParameter {
            what: "portion",
            value: spec.angle_deg,
        }),
    }
}

/// Build a hollow sphere volume. Same cutting convention as [`make_sphere`].
///
/// Boundary orders:
/// - full: surfaces `[outer shell, inner shell]`
/// - half/quarter: vertices `[north outer, south outer, north inner,
///   south inner]`, curves `[outer arc A, outer arc B, inner arc A,
///   inner arc B, north polar segment, south polar segment]`, surfaces
///   `[outer shell, inner shell, ring plane A, ring plane B]`
/// - eighth: vertices `[x outer, y outer, z outer, x inner, y inner,
///   z inner]`, curves `[outer arcs xy/yz/zx, inner arcs xy/yz/zx,
///   radial x/y/z]`, surfaces `[outer shell, inner shell, plane z=0,
///   plane x=0, plane y=0]`
#[instrument(skip(store))]
pub fn make_hollow_sphere(
    store: &mut GeomStore,
    spec: &HollowSphereSpec,
) -> Result<GeomVolumeId, GeomError> {
    check_positive("r_int", spec.r_int)?;
    if spec.r_ext <= spec.r_int {
        return Err(GeomError::InvalidParameter {
            what: "r_ext",
            value: spec.r_ext,
        });
    }
    let frame = Frame::at(spec.center);
    let (ri, re) = (spec.r_int, spec.r_ext);
    let outer_kind = SurfaceKind::Spherical {
        center: frame.origin,
        radius: re,
    };
    let inner_kind = SurfaceKind::Spherical {
        center: frame.origin,
        radius: ri,
    };

    match spec.portion {
        Portion::Full => {
            let outer = store.add_surface(outer_kind, vec![]);
            let inner = store.add_surface(inner_kind, vec![]);
            Ok(store.add_volume(
                PrimitiveShape::HollowSphere(*spec),
                vec![outer, inner],
                vec![],
                vec![],
            ))
        }
        Portion::Half | Portion::Quarter => {
            let pi = std::f64::consts::PI;
            let axis_a = frame.dir(0.0, 1.0, 0.0);
            let axis_b = match spec.portion {
                Portion::Half => frame.dir(0.0, -1.0, 0.0),
                _ => frame.dir(-1.0, 0.0, 0.0),
            };
            let zdir = frame.dir(0.0, 0.0, 1.0);

            let mk_verts = |store: &mut GeomStore, r: f64| {
                let n = store.add_vertex(frame.pt(0.0, 0.0, r));
                let s = store.add_vertex(frame.pt(0.0, 0.0, -r));
                (n, s)
            };
            let (ne, se) = mk_verts(store, re);
            let (ni, si) = mk_verts(store, ri);

            let mk_arc = |store: &mut GeomStore, r: f64, axis, ends: Vec<GeomVertexId>| {
                store.add_curve(
                    CurveKind::Arc {
                        center: frame.origin,
                        axis,
                        start: zdir,
                        radius: r,
                        sweep: pi,
                    },
                    ends,
                )
            };
            let c_ea = mk_arc(store, re, axis_a, vec![ne, se]);
            let c_eb = mk_arc(store, re, axis_b, vec![ne, se]);
            let c_ia = mk_arc(store, ri, axis_a, vec![ni, si]);
            let c_ib = mk_arc(store, ri, axis_b, vec![ni, si]);
            let c_np = store.add_curve(
                segment(frame.pt(0.0, 0.0, ri), frame.pt(0.0, 0.0, re)),
                vec![ni, ne],
            );
            let c_sp = store.add_curve(
                segment(frame.pt(0.0, 0.0, -ri), frame.pt(0.0, 0.0, -re)),
                vec![si, se],
            );

            let outer = store.add_surface(outer_kind, vec![c_ea, c_eb]);
            let inner = store.add_surface(inner_kind, vec![c_ia, c_ib]);
            let normal_a = frame.dir(0.0, 1.0, 0.0);
            let normal_b = match spec.portion {
                Portion::Half => frame.dir(0.0, 1.0, 0.0),
                _ => frame.dir(1.0, 0.0, 0.0),
            };
            let ring_a = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: normal_a,
                },
                vec![c_ea, c_ia, c_np, c_sp],
            );
            let ring_b = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: normal_b,
                },
                vec![c_eb, c_ib, c_np, c_sp],
            );
            Ok(store.add_volume(
                PrimitiveShape::HollowSphere(*spec),
                vec![outer, inner, ring_a, ring_b],
                vec![c_ea, c_eb, c_ia, c_ib, c_np, c_sp],
                vec![ne, se, ni, si],
            ))
        }
        Portion::Eighth => {
            let q = std::f64::consts::FRAC_PI_2;
            let dirs = [
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ];
            let mut verts = Vec::with_capacity(6);
            for r in [re, ri] {
                for d in &dirs {
                    let p = frame.origin + frame.rot * (d * r);
                    verts.push(store.add_vertex(p));
                }
            }
            // verts: [0] x outer, [1] y outer, [2] z outer, [3..6] inner.
            let mk_octant_arcs = |store: &mut GeomStore, r: f64, o: usize, verts: &[GeomVertexId]| {
                let xy = store.add_curve(
                    CurveKind::Arc {
                        center: frame.origin,
                        axis: frame.dir(0.0, 0.0, 1.0),
                        start: frame.dir(1.0, 0.0, 0.0),
                        radius: r,
                        sweep: q,
                    },
                    vec![verts[o], verts[o + 1]],
                );
                let yz = store.add_curve(
                    CurveKind::Arc {
                        center: frame.origin,
                        axis: frame.dir(1.0, 0.0, 0.0),
                        start: frame.dir(0.0, 1.0, 0.0),
                        radius: r,
                        sweep: q,
                    },
                    vec![verts[o + 1], verts[o + 2]],
                );
                let zx = store.add_curve(
                    CurveKind::Arc {
                        center: frame.origin,
                        axis: frame.dir(0.0, 1.0, 0.0),
                        start: frame.dir(0.0, 0.0, 1.0),
                        radius: r,
                        sweep: q,
                    },
                    vec![verts[o + 2], verts[o]],
                );
                (xy, yz, zx)
            };
            let (e_xy, e_yz, e_zx) = mk_octant_arcs(store, re, 0, &verts);
            let (i_xy, i_yz, i_zx) = mk_octant_arcs(store, ri, 3, &verts);
            let mut radials = Vec::with_capacity(3);
            for (k, d) in dirs.iter().enumerate() {
                let a = frame.origin + frame.rot * (d * ri);
                let b = frame.origin + frame.rot * (d * re);
                radials.push(store.add_curve(
                    CurveKind::Segment { a, b },
                    vec![verts[3 + k], verts[k]],
                ));
            }

            let outer = store.add_surface(outer_kind, vec![e_xy, e_yz, e_zx]);
            let inner = store.add_surface(inner_kind, vec![i_xy, i_yz, i_zx]);
            let plane_z = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(0.0, 0.0, 1.0),
                },
                vec![e_xy, i_xy, radials[0], radials[1]],
            );
            let plane_x = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(1.0, 0.0, 0.0),
                },
                vec![e_yz, i_yz, radials[1], radials[2]],
            );
            let plane_y = store.add_surface(
                SurfaceKind::Plane {
                    origin: frame.origin,
                    normal: frame.dir(0.0, 1.0, 0.0),
                },
                vec![e_zx, i_zx, radials[2], radials[0]],
            );
            Ok(store.add_volume(
                PrimitiveShape::HollowSphere(*spec),
                vec![outer, inner, plane_z, plane_x, plane_y],
                vec![e_xy, e_yz, e_zx, i_xy, i_yz, i_zx, radials[0], radials[1], radials[2]],
                verts,
            ))
        }
    }
}

/// Cap plane at height `z`, outward normal along `sign * z`.
fn plane(frame: &Frame, z: f64, sign: f64) -> SurfaceKind {
    SurfaceKind::Plane {
        origin: frame.pt(0.0, 0.0, z),
        normal: frame.dir(0.0, 0.0, sign),
    }
}

/// Cut plane containing the axis, at circumferential angle `ang`.
fn cut_plane(frame: &Frame, ang: f64) -> SurfaceKind {
    SurfaceKind::Plane {
        origin: frame.origin,
        normal: frame.dir(-ang.sin(), ang.cos(), 0.0),
    }
}

/// Shared boundary construction for cylinder and cone wedges (quarter/half).
/// Radius `r_bot` at the base, `r_top` at the far end.
struct WedgeBoundary {
    vertices: Vec<GeomVertexId>,
    curves: Vec<GeomCurveId>,
    surfaces: Vec<GeomSurfaceId>,
}

impl WedgeBoundary {
    fn build(
        store: &mut GeomStore,
        frame: &Frame,
        r_bot: f64,
        r_top: f64,
        h: f64,
        a: f64,
        lateral_kind: Option<SurfaceKind>,
    ) -> Result<Self, GeomError> {
        let o0 = frame.pt(0.0, 0.0, 0.0);
        let o1 = frame.pt(0.0, 0.0, h);
        let a0 = frame.pt(r_bot, 0.0, 0.0);
        let a1 = frame.pt(r_top, 0.0, h);
        let b0 = frame.pt(r_bot * a.cos(), r_bot * a.sin(), 0.0);
        let b1 = frame.pt(r_top * a.cos(), r_top * a.sin(), h);

        let v_o0 = store.add_vertex(o0);
        let v_o1 = store.add_vertex(o1);
        let v_a0 = store.add_vertex(a0);
        let v_a1 = store.add_vertex(a1);
        let v_b0 = store.add_vertex(b0);
        let v_b1 = store.add_vertex(b1);

        let c_top = store.add_curve(arc(frame, h, r_top, 0.0, a), vec![v_a1, v_b1]);
        let c_bot = store.add_curve(arc(frame, 0.0, r_bot, 0.0, a), vec![v_a0, v_b0]);
        let c_rb0 = store.add_curve(segment(o0, a0), vec![v_o0, v_a0]);
        let c_rt0 = store.add_curve(segment(o1, a1), vec![v_o1, v_a1]);
        let c_rba = store.add_curve(segment(o0, b0), vec![v_o0, v_b0]);
        let c_rta = store.add_curve(segment(o1, b1), vec![v_o1, v_b1]);
        let c_v0 = store.add_curve(segment(a0, a1), vec![v_a0, v_a1]);
        let c_va = store.add_curve(segment(b0, b1), vec![v_b0, v_b1]);
        let c_axis = store.add_curve(segment(o0, o1), vec![v_o0, v_o1]);

        let lateral_kind = lateral_kind.unwrap_or(SurfaceKind::Cylindrical {
            center: frame.origin,
            axis: frame.dir(0.0, 0.0, 1.0),
            radius: r_bot,
        });
        let lateral = store.add_surface(lateral_kind, vec![c_top, c_bot, c_v0, c_va]);
        let top = store.add_surface(plane(frame, h, 1.0), vec![c_top, c_rt0, c_rta]);
        let bottom = store.add_surface(plane(frame, 0.0, -1.0), vec![c_bot, c_rb0, c_rba]);
        let cut0 = store.add_surface(cut_plane(frame, 0.0), vec![c_rb0, c_rt0, c_v0, c_axis]);
        let cut_a = store.add_surface(cut_plane(frame, a), vec![c_rba, c_rta, c_va, c_axis]);

        Ok(Self {
            vertices: vec![v_o0, v_o1, v_a0, v_a1, v_b0, v_b1],
            curves: vec![c_top, c_bot, c_rb0, c_rt0, c_rba, c_rta, c_v0, c_va, c_axis],
            surfaces: vec![lateral, top, bottom, cut0, cut_a],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_cylinder() -> CylinderSpec {
        CylinderSpec {
            center: [0.0, 0.0, 0.0],
            axis: [0.0, 0.0, 1.0],
            radius: 1.0,
            height: 2.0,
            angle_deg: 360.0,
        }
    }

    #[test]
    fn full_cylinder_boundary_counts() {
        let mut store = GeomStore::new();
        let vol = make_cylinder(&mut store, &full_cylinder()).unwrap();
        let v = store.volume(vol).unwrap();
        assert_eq!(v.surfaces.len(), 3, "lateral + two caps");
        assert_eq!(v.curves.len(), 3, "two circles + seam");
    }

    #[test]
    fn quarter_cylinder_boundary_counts() {
        let mut store = GeomStore::new();
        let spec = CylinderSpec {
            angle_deg: 90.0,
            ..full_cylinder()
        };
        let vol = make_cylinder(&mut store, &spec).unwrap();
        let v = store.volume(vol).unwrap();
        assert_eq!(v.surfaces.len(), 5);
        assert_eq!(v.curves.len(), 9);
        assert_eq!(v.vertices.len(), 6);
    }

    #[test]
    fn half_cylinder_uses_wedge_counts() {
        let mut store = GeomStore::new();
        let spec = CylinderSpec {
            angle_deg: 180.0,
            ..full_cylinder()
        };
        let vol = make_cylinder(&mut store, &spec).unwrap();
        let v = store.volume(vol).unwrap();
        assert_eq!((v.surfaces.len(), v.curves.len(), v.vertices.len()), (5, 9, 6));
    }

    #[test]
    fn sphere_boundary_counts_per_portion() {
        for (portion, expect) in [
            (Portion::Full, (1, 0, 0)),
            (Portion::Half, (3, 3, 2)),
            (Portion::Quarter, (3, 3, 2)),
            (Portion::Eighth, (4, 6, 4)),
        ] {
            let mut store = GeomStore::new();
            let vol = make_sphere(
                &mut store,
                &SphereSpec {
                    center: [0.0, 0.0, 0.0],
                    radius: 1.0,
                    portion,
                },
            )
            .unwrap();
            let v = store.volume(vol).unwrap();
            assert_eq!(
                (v.surfaces.len(), v.curves.len(), v.vertices.len()),
                expect,
                "portion {:?}",
                portion
            );
        }
    }

    #[test]
    fn hollow_sphere_boundary_counts_per_portion() {
        for (portion, expect) in [
            (Portion::Full, (2, 0, 0)),
            (Portion::Half, (4, 6, 4)),
            (Portion::Quarter, (4, 6, 4)),
            (Portion::Eighth, (5, 9, 6)),
        ] {
            let mut store = GeomStore::new();
            let vol = make_hollow_sphere(
                &mut store,
                &HollowSphereSpec {
                    center: [0.0, 0.0, 0.0],
                    r_int: 0.5,
                    r_ext: 1.0,
                    portion,
                },
            )
            .unwrap();
            let v = store.volume(vol).unwrap();
            assert_eq!(
                (v.surfaces.len(), v.curves.len(), v.vertices.len()),
                expect,
                "portion {:?}",
                portion
            );
        }
    }

    #[test]
    fn cone_apex_full_boundary_counts() {
        let mut store = GeomStore::new();
        let vol = make_cone(
            &mut store,
            &ConeSpec {
                center: [0.0, 0.0, 0.0],
                axis: [1.0, 0.0, 0.0],
                profile: ConeProfile::Apex { r2: 1.0 },
                height: 3.0,
                angle_deg: 360.0,
            },
        )
        .unwrap();
        let v = store.volume(vol).unwrap();
        assert_eq!((v.surfaces.len(), v.curves.len(), v.vertices.len()), (2, 2, 2));
    }

    #[test]
    fn hollow_cylinder_quarter_has_eight_vertices() {
        let mut store = GeomStore::new();
        let vol = make_hollow_cylinder(
            &mut store,
            &HollowCylinderSpec {
                center: [0.0, 0.0, 0.0],
                axis: [0.0, 0.0, 1.0],
                r_int: 0.5,
                r_ext: 1.0,
                height: 2.0,
                angle_deg: 90.0,
            },
        )
        .unwrap();
        let v = store.volume(vol).unwrap();
        assert_eq!((v.surfaces.len(), v.curves.len(), v.vertices.len()), (6, 12, 8));
    }

    #[test]
    fn axis_rotation_is_orientation_invariant() {
        let r = axis_rotation(&Vector3::new(0.0, 3.0, 0.0)).unwrap();
        let mapped = r * Vector3::z();
        assert_relative_eq!(mapped.y, 1.0, epsilon = 1e-12);

        let down = axis_rotation(&Vector3::new(0.0, 0.0, -2.0)).unwrap();
        let mapped = down * Vector3::z();
        assert_relative_eq!(mapped.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_axis_is_rejected() {
        assert!(axis_rotation(&Vector3::zeros()).is_err());
    }
}
