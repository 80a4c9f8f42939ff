use serde::{Deserialize, Serialize};

use crate::portion::Portion;

/// Topological/geometric dimension, 0 (vertex) through 3 (volume).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dim {
    D0,
    D1,
    D2,
    D3,
}

impl Dim {
    pub fn as_usize(&self) -> usize {
        match self {
            Dim::D0 => 0,
            Dim::D1 => 1,
            Dim::D2 => 2,
            Dim::D3 => 3,
        }
    }
}

/// Radial profile of a cone along its axis.
///
/// The first radius of the original primitive definition is either zero
/// (the cone tapers to an apex point) or strictly positive (a frustum).
/// Keeping the two cases as distinct variants means a zero radius can never
/// be mistaken for "unspecified".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConeProfile {
    /// Apex at the axis origin, radius `r2` at the far end.
    Apex { r2: f64 },
    /// Truncated cone: radius `r1` at the axis origin, `r2` at the far end.
    Frustum { r1: f64, r2: f64 },
}

impl ConeProfile {
    pub fn is_apex(&self) -> bool {
        matches!(self, ConeProfile::Apex { .. })
    }

    /// Radii at the axis origin and far end.
    pub fn radii(&self) -> (f64, f64) {
        match *self {
            ConeProfile::Apex { r2 } => (0.0, r2),
            ConeProfile::Frustum { r1, r2 } => (r1, r2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderSpec {
    /// Center of the base disk.
    pub center: [f64; 3],
    /// Axis direction, base toward top. Need not be unit length.
    pub axis: [f64; 3],
    pub radius: f64,
    pub height: f64,
    /// Revolution angle in degrees, classified by [`Portion::from_angle_deg`].
    pub angle_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeSpec {
    /// Center of the first base (or the apex for [`ConeProfile::Apex`]).
    pub center: [f64; 3],
    pub axis: [f64; 3],
    pub profile: ConeProfile,
    pub height: f64,
    pub angle_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereSpec {
    pub center: [f64; 3],
    pub radius: f64,
    pub portion: Portion,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HollowCylinderSpec {
    pub center: [f64; 3],
    pub axis: [f64; 3],
    pub r_int: f64,
    pub r_ext: f64,
    pub height: f64,
    pub angle_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HollowSphereSpec {
    pub center: [f64; 3],
    pub r_int: f64,
    pub r_ext: f64,
    pub portion: Portion,
}

/// Defining parameters of a canonical solid primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PrimitiveShape {
    Cylinder(CylinderSpec),
    Cone(ConeSpec),
    Sphere(SphereSpec),
    HollowCylinder(HollowCylinderSpec),
    HollowSphere(HollowSphereSpec),
}

impl PrimitiveShape {
    /// Portion spanned by the primitive, from its angle or explicit field.
    pub fn portion(&self) -> Result<Portion, crate::portion::PortionError> {
        match self {
            PrimitiveShape::Cylinder(c) => Portion::from_angle_deg(c.angle_deg),
            PrimitiveShape::Cone(c) => Portion::from_angle_deg(c.angle_deg),
            PrimitiveShape::Sphere(s) => Ok(s.portion),
            PrimitiveShape::HollowCylinder(c) => Portion::from_angle_deg(c.angle_deg),
            PrimitiveShape::HollowSphere(s) => Ok(s.portion),
        }
    }
}
