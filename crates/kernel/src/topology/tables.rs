//! Structured-block index tables.
//!
//! Block corners are numbered by the bit encoding `index = i + 2j + 4k` with
//! `i, j, k` in `{0, 1}`. All tables below are expressed in that numbering and
//! every traversal of a block goes through them, so the numbering is never
//! reconstructed ad hoc.

use serde::{Deserialize, Serialize};

/// Corner indices of each face, as a cyclic quad.
///
/// Row order follows [`FaceOnBlock`]: i_min, i_max, j_min, j_max, k_min, k_max.
pub const VTX_BY_FACE: [[usize; 4]; 6] = [
    [4, 0, 2, 6],
    [5, 1, 3, 7],
    [4, 0, 1, 5],
    [6, 2, 3, 7],
    [2, 0, 1, 3],
    [6, 4, 5, 7],
];

/// Corner indices of the six faces in corner-bit order rather than cycle
/// order. Laying a new block onto face `f` of a corner cube with
/// `corners[n] = cube[VTX_BY_FACE_BITS[f][n]]` yields a right-handed block
/// whose `k` axis points into the cube.
pub const VTX_BY_FACE_BITS: [[usize; 4]; 6] = [
    [4, 0, 6, 2],
    [7, 3, 5, 1],
    [5, 1, 4, 0],
    [6, 2, 7, 3],
    [2, 0, 3, 1],
    [7, 5, 6, 4],
];

/// Corner pairs of the four edges running along each block direction.
pub const VTX_BY_EDGE_DIR: [[[usize; 2]; 4]; 3] = [
    [[0, 1], [2, 3], [4, 5], [6, 7]],
    [[0, 2], [1, 3], [4, 6], [5, 7]],
    [[0, 4], [1, 5], [2, 6], [3, 7]],
];

/// The six faces of a structured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceOnBlock {
    IMin,
    IMax,
    JMin,
    JMax,
    KMin,
    KMax,
}

impl FaceOnBlock {
    pub const ALL: [FaceOnBlock; 6] = [
        FaceOnBlock::IMin,
        FaceOnBlock::IMax,
        FaceOnBlock::JMin,
        FaceOnBlock::JMax,
        FaceOnBlock::KMin,
        FaceOnBlock::KMax,
    ];

    pub fn index(self) -> usize {
        match self {
            FaceOnBlock::IMin => 0,
            FaceOnBlock::IMax => 1,
            FaceOnBlock::JMin => 2,
            FaceOnBlock::JMax => 3,
            FaceOnBlock::KMin => 4,
            FaceOnBlock::KMax => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        match self {
            FaceOnBlock::IMin => FaceOnBlock::IMax,
            FaceOnBlock::IMax => FaceOnBlock::IMin,
            FaceOnBlock::JMin => FaceOnBlock::JMax,
            FaceOnBlock::JMax => FaceOnBlock::JMin,
            FaceOnBlock::KMin => FaceOnBlock::KMax,
            FaceOnBlock::KMax => FaceOnBlock::KMin,
        }
    }

    /// Block direction normal to the face.
    pub fn normal_dir(self) -> DirOnBlock {
        match self {
            FaceOnBlock::IMin | FaceOnBlock::IMax => DirOnBlock::I,
            FaceOnBlock::JMin | FaceOnBlock::JMax => DirOnBlock::J,
            FaceOnBlock::KMin | FaceOnBlock::KMax => DirOnBlock::K,
        }
    }

    /// Corner indices of this face, in the [`VTX_BY_FACE`] cycle.
    pub fn corners(self) -> [usize; 4] {
        VTX_BY_FACE[self.index()]
    }
}

/// The three logical directions of a structured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirOnBlock {
    I,
    J,
    K,
}

impl DirOnBlock {
    pub const ALL: [DirOnBlock; 3] = [DirOnBlock::I, DirOnBlock::J, DirOnBlock::K];

    pub fn index(self) -> usize {
        match self {
            DirOnBlock::I => 0,
            DirOnBlock::J => 1,
            DirOnBlock::K => 2,
        }
    }
}

/// Decompose a corner index into its `(i, j, k)` bits.
pub fn corner_bits(index: usize) -> (usize, usize, usize) {
    (index & 1, (index >> 1) & 1, (index >> 2) & 1)
}

/// Corner index from `(i, j, k)` bits.
pub fn corner_index(i: usize, j: usize, k: usize) -> usize {
    i + 2 * j + 4 * k
}

/// Corner permutation rotating the block so `face` lands on k_max.
///
/// The result maps new corner index to old corner index, and every mapping is
/// a proper rotation of the block (the permuted block keeps its handedness).
pub fn permutation_to_kmax(face: FaceOnBlock) -> [usize; 8] {
    let mut perm = [0usize; 8];
    for (new_idx, slot) in perm.iter_mut().enumerate() {
        let (i, j, k) = corner_bits(new_idx);
        let (oi, oj, ok) = match face {
            FaceOnBlock::IMin => (1 - k, j, i),
            FaceOnBlock::IMax => (k, j, 1 - i),
            FaceOnBlock::JMin => (i, 1 - k, j),
            FaceOnBlock::JMax => (i, k, 1 - j),
            FaceOnBlock::KMin => (i, 1 - j, 1 - k),
            FaceOnBlock::KMax => (i, j, k),
        };
        *slot = corner_index(oi, oj, ok);
    }
    perm
}

/// For the same rotation, which old face each new face slot comes from.
pub fn face_permutation_to_kmax(face: FaceOnBlock) -> [FaceOnBlock; 6] {
    let perm = permutation_to_kmax(face);
    let mut out = [FaceOnBlock::KMax; 6];
    for new_face in FaceOnBlock::ALL {
        let mapped: Vec<usize> = new_face.corners().iter().map(|&c| perm[c]).collect();
        let mut found = None;
        for old_face in FaceOnBlock::ALL {
            let corners = old_face.corners();
            if mapped.iter().all(|m| corners.contains(m)) {
                found = Some(old_face);
            }
        }
        // The mapping is a rotation, so a match always exists.
        out[new_face.index()] = found.unwrap_or(FaceOnBlock::KMax);
    }
    out
}

/// For the same rotation, which old direction each new direction follows.
pub fn dir_permutation_to_kmax(face: FaceOnBlock) -> [DirOnBlock; 3] {
    let perm = permutation_to_kmax(face);
    let mut out = [DirOnBlock::K; 3];
    for new_dir in DirOnBlock::ALL {
        let step = 1usize << new_dir.index();
        let a = perm[0];
        let b = perm[step];
        let diff = a ^ b;
        out[new_dir.index()] = match diff {
            1 => DirOnBlock::I,
            2 => DirOnBlock::J,
            _ => DirOnBlock::K,
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_corners_match_bit_encoding() {
        for face in FaceOnBlock::ALL {
            let fixed_dir = face.normal_dir().index();
            let expect_bit = usize::from(matches!(
                face,
                FaceOnBlock::IMax | FaceOnBlock::JMax | FaceOnBlock::KMax
            ));
            for &c in &face.corners() {
                let bits = [corner_bits(c).0, corner_bits(c).1, corner_bits(c).2];
                assert_eq!(bits[fixed_dir], expect_bit, "face {:?} corner {}", face, c);
            }
        }
    }

    #[test]
    fn permutations_are_bijective() {
        for face in FaceOnBlock::ALL {
            let perm = permutation_to_kmax(face);
            let mut seen = [false; 8];
            for &p in &perm {
                assert!(!seen[p]);
                seen[p] = true;
            }
        }
    }

    #[test]
    fn permutation_sends_face_to_kmax() {
        for face in FaceOnBlock::ALL {
            let perm = permutation_to_kmax(face);
            let old_corners = face.corners();
            for &new_c in &FaceOnBlock::KMax.corners() {
                assert!(
                    old_corners.contains(&perm[new_c]),
                    "face {:?}: new corner {} maps to {}",
                    face,
                    new_c,
                    perm[new_c]
                );
            }
            assert_eq!(face_permutation_to_kmax(face)[FaceOnBlock::KMax.index()], face);
        }
    }

    #[test]
    fn permutations_preserve_handedness() {
        // Signed volume of the corner tetrad (0 -> 1, 0 -> 2, 0 -> 4) must
        // stay positive under every rotation.
        for face in FaceOnBlock::ALL {
            let perm = permutation_to_kmax(face);
            let coord = |c: usize| {
                let (i, j, k) = corner_bits(c);
                [i as f64, j as f64, k as f64]
            };
            let o = coord(perm[0]);
            let sub = |a: [f64; 3]| [a[0] - o[0], a[1] - o[1], a[2] - o[2]];
            let u = sub(coord(perm[1]));
            let v = sub(coord(perm[2]));
            let w = sub(coord(perm[4]));
            let det = u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
                + u[2] * (v[0] * w[1] - v[1] * w[0]);
            assert!(det > 0.0, "face {:?} flips orientation", face);
        }
    }

    #[test]
    fn edge_dir_table_is_consistent() {
        for dir in DirOnBlock::ALL {
            for [a, b] in VTX_BY_EDGE_DIR[dir.index()] {
                assert_eq!(a ^ b, 1 << dir.index());
            }
        }
    }
}
