//! # Grid Transforms
//!
//! Application of [`SymmetryOp`]s to square, row-major cell buffers.
//!
//! Reflections are done in place with pairwise swaps. Rotations build a new
//! buffer by rotating each 4-cycle of positions as a tuple and then copy it
//! back, so no cell is ever read after it has been overwritten.

use super::SymmetryOp;

#[inline]
fn idx(n: usize, row: usize, col: usize) -> usize {
    row * n + col
}

impl SymmetryOp {
    /// Applies this operation to an `n`×`n` row-major buffer.
    ///
    /// The buffer is permuted; no value is altered.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != n * n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagegen::SymmetryOp;
    ///
    /// let mut cells = vec![1, 2, 3, 4];
    /// SymmetryOp::FlipX.apply_to(&mut cells, 2);
    /// assert_eq!(cells, vec![2, 1, 4, 3]);
    /// ```
    pub fn apply_to<T: Copy>(self, cells: &mut [T], n: usize) {
        assert_eq!(cells.len(), n * n, "grid buffer must be square");

        match self {
            SymmetryOp::Identity => {}
            SymmetryOp::FlipX => flip_x(cells, n),
            SymmetryOp::FlipY => flip_y(cells, n),
            SymmetryOp::Transpose => transpose(cells, n),
            SymmetryOp::RotateCw => {
                let rotated = rotated(cells, n, true);
                cells.copy_from_slice(&rotated);
            }
            SymmetryOp::RotateCcw => {
                let rotated = rotated(cells, n, false);
                cells.copy_from_slice(&rotated);
            }
            SymmetryOp::AntiTranspose => anti_transpose(cells, n),
        }
    }
}

fn flip_x<T>(cells: &mut [T], n: usize) {
    for row in 0..n {
        for i in 0..n / 2 {
            cells.swap(idx(n, row, i), idx(n, row, n - 1 - i));
        }
    }
}

fn flip_y<T>(cells: &mut [T], n: usize) {
    for i in 0..n / 2 {
        for col in 0..n {
            cells.swap(idx(n, i, col), idx(n, n - 1 - i, col));
        }
    }
}

fn transpose<T>(cells: &mut [T], n: usize) {
    for i in 0..n {
        for j in 0..i {
            cells.swap(idx(n, i, j), idx(n, j, i));
        }
    }
}

fn anti_transpose<T>(cells: &mut [T], n: usize) {
    // Only cells strictly above the anti-diagonal, so each pair swaps once.
    for i in 0..n {
        for j in 0..(n - 1 - i) {
            cells.swap(idx(n, i, j), idx(n, n - 1 - j, n - 1 - i));
        }
    }
}

/// Rotates every 4-cycle `(i,j) (n-1-j,i) (n-1-i,n-1-j) (j,n-1-i)` by one step.
fn rotated<T: Copy>(cells: &[T], n: usize, clockwise: bool) -> Vec<T> {
    let mut out = cells.to_vec();

    for i in 0..n / 2 {
        for j in 0..(n + 1) / 2 {
            let ring = [
                idx(n, i, j),
                idx(n, n - 1 - j, i),
                idx(n, n - 1 - i, n - 1 - j),
                idx(n, j, n - 1 - i),
            ];
            let values = (cells[ring[0]], cells[ring[1]], cells[ring[2]], cells[ring[3]]);
            let (a, b, c, d) = if clockwise {
                (values.1, values.2, values.3, values.0)
            } else {
                (values.3, values.0, values.1, values.2)
            };
            out[ring[0]] = a;
            out[ring[1]] = b;
            out[ring[2]] = c;
            out[ring[3]] = d;
        }
    }

    out
}
