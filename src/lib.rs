//! # Pagegen
//!
//! Randomized level pages for a tile-based action game.
//!
//! ## Architecture Overview
//!
//! A page starts life as an author-built, fixed-size tile template. Loading it
//! runs a short pipeline:
//!
//! - **Tiles**: each raw 32-bit cell is decoded into a terrain identifier and a
//!   cosmetic orientation tag
//! - **Symmetry**: the square grid of decoded cells is permuted by one randomly
//!   chosen symmetry of the square, restricted to the operations the template allows
//! - **Resolution**: terrain identifiers are resolved into a solid/open
//!   passability grid using deterministic rules and correlated coin flips
//! - **Doors**: exit markers inside one edge band are carved open on demand
//!
//! The [`page`] module ties these together behind [`PageLoader::load_page`] and
//! [`carve_door`], the two entry points the surrounding world system needs.

pub mod page;
pub mod resolve;
pub mod symmetry;
pub mod template;
pub mod tiles;

pub use page::*;
pub use resolve::*;
pub use symmetry::*;
pub use template::*;
pub use tiles::*;

use std::path::PathBuf;

/// Errors raised while turning a template into a page.
///
/// Only loading can fail. Transform application, resolution and door carving
/// operate on an already validated grid and are total.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Declared dimensions are not square, or the cell count does not match them
    #[error("Malformed template: {reason}")]
    MalformedTemplate { reason: String },

    /// The backing document could not be found or parsed
    #[error("Missing template document '{}': {reason}", path.display())]
    MissingDocument { path: PathBuf, reason: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The template document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// Configuration or rule table could not be deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl LoadError {
    /// Whether the caller should substitute the default empty page.
    ///
    /// Template and document failures degrade gracefully; a broken configuration
    /// is a programming error and should surface.
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(self, LoadError::Config(_))
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        LoadError::MalformedTemplate {
            reason: reason.into(),
        }
    }
}

/// Result type used throughout the page pipeline.
pub type PageResult<T> = Result<T, LoadError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page pipeline constants.
pub mod config {
    /// Side length of the fallback page when no template could be loaded
    pub const DEFAULT_PAGE_SIZE: usize = 16;

    /// Door bands cover `1 / DOOR_BAND_DIVISOR` of the grid along one edge
    pub const DOOR_BAND_DIVISOR: usize = 4;

    /// Horizontal-mirror flag (bit 31)
    pub const FLIPPED_HORIZONTALLY: u32 = 0x8000_0000;

    /// Vertical-mirror flag (bit 30)
    pub const FLIPPED_VERTICALLY: u32 = 0x4000_0000;

    /// Anti-diagonal-mirror flag (bit 29)
    pub const FLIPPED_DIAGONALLY: u32 = 0x2000_0000;

    /// All three orientation flags
    pub const ORIENTATION_MASK: u32 =
        FLIPPED_HORIZONTALLY | FLIPPED_VERTICALLY | FLIPPED_DIAGONALLY;
}
