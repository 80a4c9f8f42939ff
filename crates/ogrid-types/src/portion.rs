use serde::{Deserialize, Serialize};

/// Angular/solid fraction of a primitive of revolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Portion {
    /// At most a quarter turn (angle <= 135 degrees).
    Quarter,
    /// More than a quarter, less than a full turn.
    Half,
    /// Full 360-degree solid.
    Full,
    /// One octant. Only meaningful for spheres.
    Eighth,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PortionError {
    #[error("unsupported angle {angle} degrees: must be in (0, 360]")]
    UnsupportedAngle { angle: f64 },
}

impl Portion {
    /// Classify a revolution angle in degrees.
    ///
    /// Anything up to 135 degrees is meshed with the quarter topology,
    /// anything strictly between 135 and 360 with the half topology,
    /// exactly 360 with the full topology. Other values are rejected.
    pub fn from_angle_deg(angle: f64) -> Result<Portion, PortionError> {
        if angle <= 0.0 || angle > 360.0 {
            return Err(PortionError::UnsupportedAngle { angle });
        }
        if angle <= 135.0 {
            Ok(Portion::Quarter)
        } else if angle < 360.0 {
            Ok(Portion::Half)
        } else {
            Ok(Portion::Full)
        }
    }

    /// Fraction of a full turn this portion spans.
    pub fn turn_fraction(&self) -> f64 {
        match self {
            Portion::Quarter => 0.25,
            Portion::Half => 0.5,
            Portion::Full => 1.0,
            Portion::Eighth => 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_up_to_135() {
        assert_eq!(Portion::from_angle_deg(90.0), Ok(Portion::Quarter));
        assert_eq!(Portion::from_angle_deg(135.0), Ok(Portion::Quarter));
    }

    #[test]
    fn half_between_135_and_360() {
        assert_eq!(Portion::from_angle_deg(135.1), Ok(Portion::Half));
        assert_eq!(Portion::from_angle_deg(180.0), Ok(Portion::Half));
        assert_eq!(Portion::from_angle_deg(359.9), Ok(Portion::Half));
    }

    #[test]
    fn full_only_at_360() {
        assert_eq!(Portion::from_angle_deg(360.0), Ok(Portion::Full));
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Portion::from_angle_deg(0.0).is_err());
        assert!(Portion::from_angle_deg(-90.0).is_err());
        assert!(Portion::from_angle_deg(361.0).is_err());
    }
}
