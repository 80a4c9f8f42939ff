use ogrid_types::OGridSpec;

use crate::error::BuildError;

/// Topology family selected by the core ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    /// Ratio 0: the core collapses onto the axis or pole singularity.
    Degenerate,
    /// Ratio in (0, 1): a core block surrounded by a ring of blocks.
    OGrid,
    /// Ratio 1: a single block, no o-grid.
    OneBlock,
}

/// Validate the discretization and classify the ratio.
pub fn classify(grid: &OGridSpec) -> Result<GridKind, BuildError> {
    if grid.n_i == 0 || grid.n_r == 0 || grid.n_axe == 0 {
        return Err(BuildError::Validation {
            detail: format!(
                "subdivision counts must be positive, got n_i={} n_r={} n_axe={}",
                grid.n_i, grid.n_r, grid.n_axe
            ),
        });
    }
    if !grid.ratio.is_finite() || !(0.0..=1.0).contains(&grid.ratio) {
        return Err(BuildError::Validation {
            detail: format!("ratio must lie in [0, 1], got {}", grid.ratio),
        });
    }
    if grid.ratio == 0.0 {
        Ok(GridKind::Degenerate)
    } else if grid.ratio == 1.0 {
        Ok(GridKind::OneBlock)
    } else {
        Ok(GridKind::OGrid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_extremes_select_their_family() {
        assert_eq!(classify(&OGridSpec::new(4, 2, 3, 0.0)).unwrap(), GridKind::Degenerate);
        assert_eq!(classify(&OGridSpec::new(4, 2, 3, 0.5)).unwrap(), GridKind::OGrid);
        assert_eq!(classify(&OGridSpec::new(4, 2, 3, 1.0)).unwrap(), GridKind::OneBlock);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        assert!(classify(&OGridSpec::new(4, 2, 3, -0.1)).is_err());
        assert!(classify(&OGridSpec::new(4, 2, 3, 1.5)).is_err());
        assert!(classify(&OGridSpec::new(4, 2, 3, f64::NAN)).is_err());
    }

    #[test]
    fn zero_subdivisions_are_rejected() {
        assert!(classify(&OGridSpec::new(0, 2, 3, 0.5)).is_err());
        assert!(classify(&OGridSpec::new(4, 0, 3, 0.5)).is_err());
        assert!(classify(&OGridSpec::new(4, 2, 0, 0.5)).is_err());
    }
}
