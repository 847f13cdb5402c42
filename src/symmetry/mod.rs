//! # Symmetry Module
//!
//! Symmetry operations of the square and the grid they are applied to.
//!
//! Every page template is re-oriented by one of seven operations before it is
//! resolved, so the same hand-built layout can show up mirrored or rotated in
//! different play sessions. Templates may forbid individual operations (a
//! layout with a gravity-dependent feature should not be flipped upside down).

pub mod grid;
pub mod transform;

pub use grid::*;
pub use transform::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One symmetry of the square used to re-orient a template.
///
/// Positions are `(row, col)` with row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymmetryOp {
    Identity,
    /// Mirror across the vertical center line
    FlipX,
    /// Mirror across the horizontal center line
    FlipY,
    /// Reflect across the main diagonal
    Transpose,
    RotateCw,
    RotateCcw,
    /// Reflect across the anti-diagonal
    AntiTranspose,
}

impl SymmetryOp {
    /// All seven operations, identity first.
    pub const ALL: [SymmetryOp; 7] = [
        SymmetryOp::Identity,
        SymmetryOp::FlipX,
        SymmetryOp::FlipY,
        SymmetryOp::Transpose,
        SymmetryOp::RotateCw,
        SymmetryOp::RotateCcw,
        SymmetryOp::AntiTranspose,
    ];

    /// Template property key that can disable this operation.
    ///
    /// Identity has no key because it can never be disabled.
    pub fn metadata_key(self) -> Option<&'static str> {
        match self {
            SymmetryOp::Identity => None,
            SymmetryOp::FlipX => Some("x_flip"),
            SymmetryOp::FlipY => Some("y_flip"),
            SymmetryOp::Transpose => Some("transpose"),
            SymmetryOp::RotateCw => Some("clockwise"),
            SymmetryOp::RotateCcw => Some("anti-clockwise"),
            SymmetryOp::AntiTranspose => Some("anti-transpose"),
        }
    }

    /// The operation that undoes this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::SymmetryOp;
    ///
    /// assert_eq!(SymmetryOp::RotateCw.inverse(), SymmetryOp::RotateCcw);
    /// assert_eq!(SymmetryOp::FlipX.inverse(), SymmetryOp::FlipX);
    /// ```
    pub fn inverse(self) -> Self {
        match self {
            SymmetryOp::RotateCw => SymmetryOp::RotateCcw,
            SymmetryOp::RotateCcw => SymmetryOp::RotateCw,
            other => other,
        }
    }

    /// Where the cell at `(row, col)` ends up after this operation on an
    /// `n`×`n` grid.
    ///
    /// Returns `None` for a position outside the grid, which includes every
    /// position of an empty grid.
    pub fn map_position(self, n: usize, row: usize, col: usize) -> Option<(usize, usize)> {
        if row >= n || col >= n {
            return None;
        }
        let last = n - 1;
        let moved = match self {
            SymmetryOp::Identity => (row, col),
            SymmetryOp::FlipX => (row, last - col),
            SymmetryOp::FlipY => (last - row, col),
            SymmetryOp::Transpose => (col, row),
            SymmetryOp::RotateCw => (col, last - row),
            SymmetryOp::RotateCcw => (last - col, row),
            SymmetryOp::AntiTranspose => (last - col, last - row),
        };
        Some(moved)
    }

    fn bit(self) -> u8 {
        match self {
            SymmetryOp::Identity => 1 << 0,
            SymmetryOp::FlipX => 1 << 1,
            SymmetryOp::FlipY => 1 << 2,
            SymmetryOp::Transpose => 1 << 3,
            SymmetryOp::RotateCw => 1 << 4,
            SymmetryOp::RotateCcw => 1 << 5,
            SymmetryOp::AntiTranspose => 1 << 6,
        }
    }
}

impl fmt::Display for SymmetryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymmetryOp::Identity => "identity",
            SymmetryOp::FlipX => "x_flip",
            SymmetryOp::FlipY => "y_flip",
            SymmetryOp::Transpose => "transpose",
            SymmetryOp::RotateCw => "clockwise",
            SymmetryOp::RotateCcw => "anti-clockwise",
            SymmetryOp::AntiTranspose => "anti-transpose",
        };
        f.write_str(name)
    }
}

/// The set of operations a template permits.
///
/// Identity is always a member, so selection always has a legal choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AllowedOps {
    mask: u8,
}

impl AllowedOps {
    /// Every operation allowed.
    pub fn all() -> Self {
        Self {
            mask: SymmetryOp::ALL.iter().fold(0, |mask, op| mask | op.bit()),
        }
    }

    /// Only identity allowed.
    pub fn identity_only() -> Self {
        Self {
            mask: SymmetryOp::Identity.bit(),
        }
    }

    /// Disables an operation. Disabling identity has no effect.
    pub fn disable(&mut self, op: SymmetryOp) {
        if op != SymmetryOp::Identity {
            self.mask &= !op.bit();
        }
    }

    /// Re-enables an operation.
    pub fn enable(&mut self, op: SymmetryOp) {
        self.mask |= op.bit();
    }

    /// Checks whether an operation may be selected.
    pub fn contains(&self, op: SymmetryOp) -> bool {
        self.mask & op.bit() != 0
    }

    /// Allowed operations in [`SymmetryOp::ALL`] order.
    pub fn ops(&self) -> Vec<SymmetryOp> {
        SymmetryOp::ALL
            .iter()
            .copied()
            .filter(|op| self.contains(*op))
            .collect()
    }

    /// Number of allowed operations, between 1 and 7.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Always false; kept for parity with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for AllowedOps {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_ops_default_is_all() {
        let allowed = AllowedOps::default();
        assert_eq!(allowed.len(), 7);
        assert_eq!(allowed.ops(), SymmetryOp::ALL.to_vec());
    }

    #[test]
    fn test_identity_cannot_be_disabled() {
        let mut allowed = AllowedOps::all();
        for op in SymmetryOp::ALL {
            allowed.disable(op);
        }
        assert_eq!(allowed, AllowedOps::identity_only());
        assert!(allowed.contains(SymmetryOp::Identity));
        assert_eq!(allowed.len(), 1);
    }

    #[test]
    fn test_disable_exactly_one() {
        let mut allowed = AllowedOps::all();
        allowed.disable(SymmetryOp::Transpose);
        assert!(!allowed.contains(SymmetryOp::Transpose));
        assert_eq!(allowed.len(), 6);

        allowed.enable(SymmetryOp::Transpose);
        assert_eq!(allowed, AllowedOps::all());
    }

    #[test]
    fn test_metadata_keys() {
        let keys: Vec<_> = SymmetryOp::ALL
            .iter()
            .filter_map(|op| op.metadata_key())
            .collect();
        assert_eq!(
            keys,
            vec!["x_flip", "y_flip", "transpose", "clockwise", "anti-clockwise", "anti-transpose"]
        );
    }

    #[test]
    fn test_map_position_corners() {
        let n = 4;
        assert_eq!(SymmetryOp::RotateCw.map_position(n, 0, 0), Some((0, 3)));
        assert_eq!(SymmetryOp::RotateCw.map_position(n, 0, 3), Some((3, 3)));
        assert_eq!(SymmetryOp::RotateCw.map_position(n, 3, 3), Some((3, 0)));
        assert_eq!(SymmetryOp::RotateCw.map_position(n, 3, 0), Some((0, 0)));
        assert_eq!(SymmetryOp::AntiTranspose.map_position(n, 0, 0), Some((3, 3)));
        assert_eq!(SymmetryOp::AntiTranspose.map_position(n, 0, 3), Some((0, 3)));
    }

    #[test]
    fn test_map_position_out_of_bounds() {
        for op in SymmetryOp::ALL {
            assert_eq!(op.map_position(0, 0, 0), None, "{op}");
            assert_eq!(op.map_position(3, 3, 0), None, "{op}");
            assert_eq!(op.map_position(3, 0, 7), None, "{op}");
            assert_eq!(op.map_position(1, 0, 0), Some((0, 0)), "{op}");
        }
    }

    #[test]
    fn test_inverse_maps_back() {
        let n = 5;
        for op in SymmetryOp::ALL {
            for row in 0..n {
                for col in 0..n {
                    let (r, c) = op.map_position(n, row, col).unwrap();
                    assert_eq!(op.inverse().map_position(n, r, c), Some((row, col)), "{op}");
                }
            }
        }
    }
}
