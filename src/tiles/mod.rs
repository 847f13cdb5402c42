//! # Tiles Module
//!
//! Decoding of raw template cells.
//!
//! Tiled-style formats pack per-cell mirroring into the three highest bits of
//! each 32-bit tile identifier. Decoding splits a raw value into the terrain
//! identifier the rest of the pipeline reasons about and an [`Orientation`]
//! tag that only a renderer cares about.

use crate::config::{
    FLIPPED_DIAGONALLY, FLIPPED_HORIZONTALLY, FLIPPED_VERTICALLY, ORIENTATION_MASK,
};
use serde::{Deserialize, Serialize};

/// How a renderer should mirror a cell's sprite.
///
/// Orientation is cosmetic. Grid symmetry operations move cells around but
/// never rewrite the tag a cell carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    None,
    X,
    Y,
    XY,
    Diag,
    DiagX,
    DiagY,
    DiagXY,
}

/// Orientation lookup keyed by `horizontal << 2 | vertical << 1 | diagonal`.
const ORIENTATION_TABLE: [Orientation; 8] = [
    Orientation::None,   // ---
    Orientation::Diag,   // --d
    Orientation::Y,      // -v-
    Orientation::DiagY,  // -vd
    Orientation::X,      // h--
    Orientation::DiagX,  // h-d
    Orientation::XY,     // hv-
    Orientation::DiagXY, // hvd
];

impl Orientation {
    /// Maps the three mirror flags to an orientation.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::Orientation;
    ///
    /// assert_eq!(Orientation::from_flags(true, false, true), Orientation::DiagX);
    /// assert_eq!(Orientation::from_flags(false, false, false), Orientation::None);
    /// ```
    pub fn from_flags(horizontal: bool, vertical: bool, diagonal: bool) -> Self {
        let index = (usize::from(horizontal) << 2)
            | (usize::from(vertical) << 1)
            | usize::from(diagonal);
        ORIENTATION_TABLE[index]
    }

    /// Returns the `(horizontal, vertical, diagonal)` flags for this orientation.
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            Orientation::None => (false, false, false),
            Orientation::X => (true, false, false),
            Orientation::Y => (false, true, false),
            Orientation::XY => (true, true, false),
            Orientation::Diag => (false, false, true),
            Orientation::DiagX => (true, false, true),
            Orientation::DiagY => (false, true, true),
            Orientation::DiagXY => (true, true, true),
        }
    }
}

/// One decoded grid cell.
///
/// Fields are private so the terrain identifier can never carry the reserved
/// orientation bits. Serializes as its raw 32-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct TileCell {
    terrain_id: u32,
    orientation: Orientation,
}

impl TileCell {
    /// Creates a cell with the given identifier and orientation.
    ///
    /// The reserved high bits are stripped from `terrain_id`.
    pub fn new(terrain_id: u32, orientation: Orientation) -> Self {
        Self {
            terrain_id: terrain_id & !ORIENTATION_MASK,
            orientation,
        }
    }

    /// Template-defined tile identifier, orientation bits cleared.
    pub fn terrain_id(self) -> u32 {
        self.terrain_id
    }

    /// Cosmetic mirroring tag.
    pub fn orientation(self) -> Orientation {
        self.orientation
    }

    /// Creates an unmirrored cell.
    pub fn plain(terrain_id: u32) -> Self {
        Self::new(terrain_id, Orientation::None)
    }

    /// Re-packs the cell into its raw 32-bit form.
    pub fn raw(self) -> u32 {
        let (horizontal, vertical, diagonal) = self.orientation.flags();
        let mut raw = self.terrain_id;
        if horizontal {
            raw |= FLIPPED_HORIZONTALLY;
        }
        if vertical {
            raw |= FLIPPED_VERTICALLY;
        }
        if diagonal {
            raw |= FLIPPED_DIAGONALLY;
        }
        raw
    }
}

impl From<u32> for TileCell {
    fn from(raw: u32) -> Self {
        decode(raw)
    }
}

impl From<TileCell> for u32 {
    fn from(cell: TileCell) -> Self {
        cell.raw()
    }
}

/// Decodes one raw tile value.
///
/// Every 32-bit input is valid.
///
/// # Examples
///
/// ```
/// use pagegen::{decode, Orientation};
///
/// let cell = decode(0x8000_0007);
/// assert_eq!(cell.terrain_id(), 7);
/// assert_eq!(cell.orientation(), Orientation::X);
/// ```
pub fn decode(raw: u32) -> TileCell {
    TileCell {
        terrain_id: raw & !ORIENTATION_MASK,
        orientation: Orientation::from_flags(
            raw & FLIPPED_HORIZONTALLY != 0,
            raw & FLIPPED_VERTICALLY != 0,
            raw & FLIPPED_DIAGONALLY != 0,
        ),
    }
}

/// Decodes a textual tile value, falling back to the default cell.
///
/// Missing or unparsable input yields `terrain_id = 0` with no orientation.
pub fn decode_str(token: &str) -> TileCell {
    token
        .trim()
        .parse::<u32>()
        .map(decode)
        .unwrap_or_default()
}
