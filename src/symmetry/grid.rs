//! # Symmetry Grid
//!
//! The decoded, re-oriented tile grid of one page instance.

use super::{AllowedOps, SymmetryOp};
use crate::template::RawTemplate;
use crate::tiles::{decode, TileCell};
use crate::{LoadError, PageResult};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// A square grid of decoded tiles with one symmetry operation applied.
///
/// The operation is drawn once when the grid is loaded and never changes;
/// reloading a page builds a fresh grid with a fresh draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryGrid {
    size: usize,
    cells: Vec<TileCell>,
    allowed_ops: AllowedOps,
    chosen_op: SymmetryOp,
}

impl SymmetryGrid {
    /// Decodes a template, draws an allowed operation and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MalformedTemplate`] if the template is empty, not
    /// square, or does not hold exactly `width × height` cells.
    pub fn load<R: Rng + ?Sized>(template: &RawTemplate, rng: &mut R) -> PageResult<Self> {
        let allowed_ops = template.metadata.allowed_ops();
        let op = allowed_ops
            .ops()
            .choose(rng)
            .copied()
            .unwrap_or(SymmetryOp::Identity);
        Self::build(template, allowed_ops, op)
    }

    /// Like [`load`](Self::load) but with a caller-chosen operation.
    ///
    /// The template's allow-list is recorded but not enforced, so tools can
    /// preview any orientation.
    ///
    /// # Errors
    ///
    /// Same validation as [`load`](Self::load).
    pub fn load_with_op(template: &RawTemplate, op: SymmetryOp) -> PageResult<Self> {
        Self::build(template, template.metadata.allowed_ops(), op)
    }

    fn build(template: &RawTemplate, allowed_ops: AllowedOps, op: SymmetryOp) -> PageResult<Self> {
        let (width, height) = (template.width, template.height);
        if width == 0 || height == 0 {
            return Err(LoadError::malformed(format!(
                "template has no cells ({}x{})",
                width, height
            )));
        }
        if width != height {
            return Err(LoadError::malformed(format!(
                "template must be square, got {}x{}",
                width, height
            )));
        }
        if template.cells.len() != width * height {
            return Err(LoadError::malformed(format!(
                "expected {} cells for {}x{}, found {}",
                width * height,
                width,
                height,
                template.cells.len()
            )));
        }

        let mut cells: Vec<TileCell> = template.cells.iter().map(|&raw| decode(raw)).collect();
        op.apply_to(&mut cells, width);
        debug!(
            "Loaded {}x{} template with '{}' ({} of 7 operations allowed)",
            width,
            height,
            op,
            allowed_ops.len()
        );

        Ok(Self {
            size: width,
            cells,
            allowed_ops,
            chosen_op: op,
        })
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The operation applied at load time.
    pub fn chosen_op(&self) -> SymmetryOp {
        self.chosen_op
    }

    /// The operations the template allowed.
    pub fn allowed_ops(&self) -> AllowedOps {
        self.allowed_ops
    }

    /// Cell at `(row, col)`, if in bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&TileCell> {
        if row < self.size && col < self.size {
            self.cells.get(row * self.size + col)
        } else {
            None
        }
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[TileCell] {
        &self.cells
    }

    /// Iterates over rows of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[TileCell]> {
        self.cells.chunks(self.size.max(1))
    }
}
