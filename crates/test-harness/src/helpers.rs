//! Error type and volume spec shorthands shared by the scenarios.

use command_engine::CommandError;
use ogrid_kernel::geom::GeomError;
use ogrid_kernel::topology::TopologyError;
use ogrid_types::{
    ConeProfile, ConeSpec, CylinderSpec, HollowCylinderSpec, HollowSphereSpec, Portion, SphereSpec,
};

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("volume not found: {name}")]
    VolumeNotFound { name: String },

    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Geometry(#[from] GeomError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

// ── Spec shorthands ─────────────────────────────────────────────────────────
// All volumes sit at the origin with the z axis as revolution axis; the
// scenarios only ever vary radii, heights and angular portions.

pub fn cylinder_spec(radius: f64, height: f64, angle_deg: f64) -> CylinderSpec {
    CylinderSpec {
        center: [0.0, 0.0, 0.0],
        axis: [0.0, 0.0, 1.0],
        radius,
        height,
        angle_deg,
    }
}

/// `r1 == 0` gives an apex cone, anything else a frustum.
pub fn cone_spec(r1: f64, r2: f64, height: f64, angle_deg: f64) -> ConeSpec {
    let profile = if r1 == 0.0 {
        ConeProfile::Apex { r2 }
    } else {
        ConeProfile::Frustum { r1, r2 }
    };
    ConeSpec {
        center: [0.0, 0.0, 0.0],
        axis: [0.0, 0.0, 1.0],
        profile,
        height,
        angle_deg,
    }
}

pub fn sphere_spec(radius: f64, portion: Portion) -> SphereSpec {
    SphereSpec {
        center: [0.0, 0.0, 0.0],
        radius,
        portion,
    }
}

pub fn hollow_cylinder_spec(r_int: f64, r_ext: f64, height: f64, angle_deg: f64) -> HollowCylinderSpec {
    HollowCylinderSpec {
        center: [0.0, 0.0, 0.0],
        axis: [0.0, 0.0, 1.0],
        r_int,
        r_ext,
        height,
        angle_deg,
    }
}

pub fn hollow_sphere_spec(r_int: f64, r_ext: f64, portion: Portion) -> HollowSphereSpec {
    HollowSphereSpec {
        center: [0.0, 0.0, 0.0],
        r_int,
        r_ext,
        portion,
    }
}
