// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dense linear system solver: Gaussian elimination with partial pivoting.

use richtwerk_core::error::{Result, RichtwerkError};
use tracing::trace;

/// Solve `a · x = b` for a square `N`x`N` system.
///
/// At each column the row with the largest absolute value in that column
/// (among the rows not yet eliminated) is swapped into the pivot position.
/// A pivot smaller than `epsilon` times the largest magnitude in `a` means
/// the system is singular and yields `DegenerateInput`.
pub fn solve_linear_system<const N: usize>(
    mut a: [[f64; N]; N],
    mut b: [f64; N],
    epsilon: f64,
) -> Result<[f64; N]> {
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(RichtwerkError::DegenerateInput(
            "linear system has no finite non-zero coefficients".into(),
        ));
    }
    let threshold = epsilon * scale;

    for col in 0..N {
        let mut pivot_row = col;
        let mut pivot_mag = a[col][col].abs();
        for row in (col + 1)..N {
            let mag = a[row][col].abs();
            if mag > pivot_mag {
                pivot_mag = mag;
                pivot_row = row;
            }
        }

        if pivot_mag.is_nan() || pivot_mag <= threshold {
            return Err(RichtwerkError::DegenerateInput(format!(
                "singular system: pivot {pivot_mag:e} in column {col} below {threshold:e}"
            )));
        }

        if pivot_row != col {
            a.swap(col, pivot_row);
            b.swap(col, pivot_row);
            trace!(col, pivot_row, "Swapped pivot row");
        }

        let pivot = a[col][col];
        for row in (col + 1)..N {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0_f64; N];
    for row in (0..N).rev() {
        let mut sum = b[row];
        for k in (row + 1)..N {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    Ok(x)
}
