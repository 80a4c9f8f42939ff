//! Analytic geometry model: vertices, curves, surfaces and volumes stored in
//! slotmap arenas, with the boundary queries the topology builders index into.
//!
//! This stands in for the external geometric kernel. Every entity is analytic
//! (points, segments, circular arcs, planes, quadrics), which is all the
//! o-grid construction needs: ordered boundary lists, point projection and
//! curve parameterization.

use nalgebra::{Point3, Unit, Vector3};
use ogrid_types::{Dim, PrimitiveShape};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct GeomVertexId;
    pub struct GeomCurveId;
    pub struct GeomSurfaceId;
    pub struct GeomVolumeId;
}

#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    #[error("dangling geometric {what} reference")]
    Missing { what: &'static str },

    #[error("axis has zero length")]
    ZeroAxis,

    #[error("invalid {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },
}

/// Non-owning reference to a geometric entity of any dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeomRef {
    Vertex(GeomVertexId),
    Curve(GeomCurveId),
    Surface(GeomSurfaceId),
    Volume(GeomVolumeId),
}

impl GeomRef {
    pub fn dim(&self) -> Dim {
        match self {
            GeomRef::Vertex(_) => Dim::D0,
            GeomRef::Curve(_) => Dim::D1,
            GeomRef::Surface(_) => Dim::D2,
            GeomRef::Volume(_) => Dim::D3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeomVertex {
    pub point: Point3<f64>,
}

/// Analytic curve shape.
#[derive(Debug, Clone)]
pub enum CurveKind {
    Segment {
        a: Point3<f64>,
        b: Point3<f64>,
    },
    /// Circular arc swept from `start` around `axis`. `sweep` is in radians;
    /// a full circle has `sweep == 2π`.
    Arc {
        center: Point3<f64>,
        axis: Unit<Vector3<f64>>,
        start: Unit<Vector3<f64>>,
        radius: f64,
        sweep: f64,
    },
}

#[derive(Debug, Clone)]
pub struct GeomCurve {
    pub kind: CurveKind,
    /// End vertices, `[start, end]`. Empty for closed curves.
    pub ends: Vec<GeomVertexId>,
}

impl GeomCurve {
    /// Evaluate at normalized parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        match &self.kind {
            CurveKind::Segment { a, b } => a + (b - a) * t,
            CurveKind::Arc {
                center,
                axis,
                start,
                radius,
                sweep,
            } => {
                let v = axis.cross(start);
                let ang = t * sweep;
                center + (start.into_inner() * ang.cos() + v * ang.sin()) * *radius
            }
        }
    }

    /// Closest point on the curve (treating arcs as full supporting circles).
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        match &self.kind {
            CurveKind::Segment { a, b } => {
                let d = b - a;
                let len2 = d.norm_squared();
                if len2 == 0.0 {
                    return *a;
                }
                let t = ((p - a).dot(&d) / len2).clamp(0.0, 1.0);
                a + d * t
            }
            CurveKind::Arc {
                center,
                axis,
                radius,
                start,
                ..
            } => {
                let rel = p - center;
                let radial = rel - axis.into_inner() * rel.dot(axis);
                let n = radial.norm();
                if n < 1e-14 {
                    // On the axis: any direction works, pick the arc start.
                    center + start.into_inner() * *radius
                } else {
                    center + radial * (*radius / n)
                }
            }
        }
    }

    /// Normalized parameter of the point nearest to `p`.
    pub fn parameter_of(&self, p: &Point3<f64>) -> f64 {
        match &self.kind {
            CurveKind::Segment { a, b } => {
                let d = b - a;
                let len2 = d.norm_squared();
                if len2 == 0.0 {
                    0.0
                } else {
                    ((p - a).dot(&d) / len2).clamp(0.0, 1.0)
                }
            }
            CurveKind::Arc {
                center,
                axis,
                start,
                sweep,
                ..
            } => {
                let rel = p - center;
                let radial = rel - axis.into_inner() * rel.dot(axis);
                let v = axis.cross(start);
                let ang = radial.dot(&v).atan2(radial.dot(start));
                let ang = if ang < 0.0 {
                    ang + 2.0 * std::f64::consts::PI
                } else {
                    ang
                };
                (ang / sweep).clamp(0.0, 1.0)
            }
        }
    }
}

/// Analytic surface shape.
#[derive(Debug, Clone)]
pub enum SurfaceKind {
    Plane {
        origin: Point3<f64>,
        normal: Unit<Vector3<f64>>,
    },
    Cylindrical {
        center: Point3<f64>,
        axis: Unit<Vector3<f64>>,
        radius: f64,
    },
    /// Lateral cone surface: radius varies linearly from `r_origin` at the
    /// axis origin to `r_far` at `origin + axis * height`.
    Conical {
        origin: Point3<f64>,
        axis: Unit<Vector3<f64>>,
        r_origin: f64,
        r_far: f64,
        height: f64,
    },
    Spherical {
        center: Point3<f64>,
        radius: f64,
    },
}

#[derive(Debug, Clone)]
pub struct GeomSurface {
    pub kind: SurfaceKind,
    /// Bounding curves, in the factory's documented order.
    pub curves: Vec<GeomCurveId>,
}

impl GeomSurface {
    pub fn project(&self, p: &Point3<f64>) -> Point3<f64> {
        match &self.kind {
            SurfaceKind::Plane { origin, normal } => p - normal.into_inner() * (p - origin).dot(normal),
            SurfaceKind::Cylindrical {
                center,
                axis,
                radius,
            } => {
                let rel = p - center;
                let h = rel.dot(axis);
                let radial = rel - axis.into_inner() * h;
                let n = radial.norm();
                if n < 1e-14 {
                    *p
                } else {
                    center + axis.into_inner() * h + radial * (radius / n)
                }
            }
            SurfaceKind::Conical {
                origin,
                axis,
                r_origin,
                r_far,
                height,
            } => {
                let rel = p - origin;
                let h = rel.dot(axis).clamp(0.0, *height);
                let radius = r_origin + (r_far - r_origin) * (h / height);
                let radial = rel - axis.into_inner() * rel.dot(axis);
                let n = radial.norm();
                if n < 1e-14 {
                    origin + axis.into_inner() * h
                } else {
                    origin + axis.into_inner() * h + radial * (radius / n)
                }
            }
            SurfaceKind::Spherical { center, radius } => {
                let rel = p - center;
                let n = rel.norm();
                if n < 1e-14 {
                    *p
                } else {
                    center + rel * (radius / n)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeomVolume {
    pub shape: PrimitiveShape,
    /// Ordered boundary entities. The per-shape order is fixed by the
    /// factory that built the volume and the builders index into it.
    pub surfaces: Vec<GeomSurfaceId>,
    pub curves: Vec<GeomCurveId>,
    pub vertices: Vec<GeomVertexId>,
}

/// Arena of geometric entities for one document.
#[derive(Debug, Default)]
pub struct GeomStore {
    pub vertices: SlotMap<GeomVertexId, GeomVertex>,
    pub curves: SlotMap<GeomCurveId, GeomCurve>,
    pub surfaces: SlotMap<GeomSurfaceId, GeomSurface>,
    pub volumes: SlotMap<GeomVolumeId, GeomVolume>,
}

impl GeomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, point: Point3<f64>) -> GeomVertexId {
        self.vertices.insert(GeomVertex { point })
    }

    pub fn add_curve(&mut self, kind: CurveKind, ends: Vec<GeomVertexId>) -> GeomCurveId {
        self.curves.insert(GeomCurve { kind, ends })
    }

    pub fn add_surface(&mut self, kind: SurfaceKind, curves: Vec<GeomCurveId>) -> GeomSurfaceId {
        self.surfaces.insert(GeomSurface { kind, curves })
    }

    pub fn add_volume(
        &mut self,
        shape: PrimitiveShape,
        surfaces: Vec<GeomSurfaceId>,
        curves: Vec<GeomCurveId>,
        vertices: Vec<GeomVertexId>,
    ) -> GeomVolumeId {
        self.volumes.insert(GeomVolume {
            shape,
            surfaces,
            curves,
            vertices,
        })
    }

    pub fn vertex(&self, id: GeomVertexId) -> Result<&GeomVertex, GeomError> {
        self.vertices.get(id).ok_or(GeomError::Missing { what: "vertex" })
    }

    pub fn curve(&self, id: GeomCurveId) -> Result<&GeomCurve, GeomError> {
        self.curves.get(id).ok_or(GeomError::Missing { what: "curve" })
    }

    pub fn surface(&self, id: GeomSurfaceId) -> Result<&GeomSurface, GeomError> {
        self.surfaces.get(id).ok_or(GeomError::Missing { what: "surface" })
    }

    pub fn volume(&self, id: GeomVolumeId) -> Result<&GeomVolume, GeomError> {
        self.volumes.get(id).ok_or(GeomError::Missing { what: "volume" })
    }

    // ─── Incidence queries ──────────────────────────────────────────────────

    /// Curves having `v` as an end vertex, in arena order.
    pub fn curves_of_vertex(&self, v: GeomVertexId) -> Vec<GeomCurveId> {
        self.curves
            .iter()
            .filter(|(_, c)| c.ends.contains(&v))
            .map(|(id, _)| id)
            .collect()
    }

    /// Surfaces bounded by curve `c`, in arena order.
    pub fn surfaces_of_curve(&self, c: GeomCurveId) -> Vec<GeomSurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.curves.contains(&c))
            .map(|(id, _)| id)
            .collect()
    }

    /// Volumes bounded by surface `s`, in arena order.
    pub fn volumes_of_surface(&self, s: GeomSurfaceId) -> Vec<GeomVolumeId> {
        self.volumes
            .iter()
            .filter(|(_, v)| v.surfaces.contains(&s))
            .map(|(id, _)| id)
            .collect()
    }

    /// Curves reachable from an association: a vertex reaches every curve it
    /// ends, a curve reaches itself, a surface reaches its bounding curves.
    pub fn reachable_curves(&self, r: &GeomRef) -> Vec<GeomCurveId> {
        match r {
            GeomRef::Vertex(v) => self.curves_of_vertex(*v),
            GeomRef::Curve(c) => vec![*c],
            GeomRef::Surface(s) => self
                .surfaces
                .get(*s)
                .map(|surf| surf.curves.clone())
                .unwrap_or_default(),
            GeomRef::Volume(_) => Vec::new(),
        }
    }

    /// Surfaces reachable from an association, one dimension up from
    /// [`Self::reachable_curves`].
    pub fn reachable_surfaces(&self, r: &GeomRef) -> Vec<GeomSurfaceId> {
        match r {
            GeomRef::Vertex(v) => {
                let mut out = Vec::new();
                for c in self.curves_of_vertex(*v) {
                    for s in self.surfaces_of_curve(c) {
                        if !out.contains(&s) {
                            out.push(s);
                        }
                    }
                }
                out
            }
            GeomRef::Curve(c) => self.surfaces_of_curve(*c),
            GeomRef::Surface(s) => vec![*s],
            GeomRef::Volume(_) => Vec::new(),
        }
    }

    /// Project a point onto a geometric entity.
    pub fn project(&self, p: &Point3<f64>, onto: &GeomRef) -> Result<Point3<f64>, GeomError> {
        match onto {
            GeomRef::Vertex(v) => Ok(self.vertex(*v)?.point),
            GeomRef::Curve(c) => Ok(self.curve(*c)?.project(p)),
            GeomRef::Surface(s) => Ok(self.surface(*s)?.project(p)),
            GeomRef::Volume(_) => Ok(*p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arc_point_at_quarter_turn() {
        let c = GeomCurve {
            kind: CurveKind::Arc {
                center: Point3::origin(),
                axis: Unit::new_normalize(Vector3::z()),
                start: Unit::new_normalize(Vector3::x()),
                radius: 2.0,
                sweep: std::f64::consts::FRAC_PI_2,
            },
            ends: vec![],
        };
        let p = c.point_at(1.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn segment_projection_clamps_to_ends() {
        let c = GeomCurve {
            kind: CurveKind::Segment {
                a: Point3::new(0.0, 0.0, 0.0),
                b: Point3::new(1.0, 0.0, 0.0),
            },
            ends: vec![],
        };
        let p = c.project(&Point3::new(2.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn sphere_projection_lands_on_radius() {
        let s = GeomSurface {
            kind: SurfaceKind::Spherical {
                center: Point3::new(1.0, 0.0, 0.0),
                radius: 3.0,
            },
            curves: vec![],
        };
        let p = s.project(&Point3::new(5.0, 0.0, 0.0));
        assert_relative_eq!((p - Point3::new(1.0, 0.0, 0.0)).norm(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn incidence_queries_follow_boundary() {
        let mut store = GeomStore::new();
        let va = store.add_vertex(Point3::origin());
        let vb = store.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = store.add_curve(
            CurveKind::Segment {
                a: Point3::origin(),
                b: Point3::new(1.0, 0.0, 0.0),
            },
            vec![va, vb],
        );
        let s = store.add_surface(
            SurfaceKind::Plane {
                origin: Point3::origin(),
                normal: Unit::new_normalize(Vector3::z()),
            },
            vec![c],
        );
        assert_eq!(store.curves_of_vertex(va), vec![c]);
        assert_eq!(store.surfaces_of_curve(c), vec![s]);
        assert_eq!(store.reachable_curves(&GeomRef::Surface(s)), vec![c]);
        assert_eq!(store.reachable_surfaces(&GeomRef::Vertex(vb)), vec![s]);
    }
}
