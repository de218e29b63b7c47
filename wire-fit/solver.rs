use crate::error::{FitError, FitOutcome};

/// Pivots smaller than this fraction of the largest matrix entry are singular
pub const PIVOT_EPSILON: f64 = 1e-12;

/// Solve a 3x3 linear system `m * x = r` by Gaussian elimination with partial pivoting.
///
/// At each step the remaining row with the largest magnitude in the pivot column
/// is swapped into place. A pivot below `PIVOT_EPSILON` relative to the largest
/// entry of `m`, or a non-finite solution, is reported as `SingularSystem`.
/// The tolerance is only meaningful for well-scaled systems; least-squares
/// callers normalize their abscissas first.
pub fn solve_3x3(m: [[f64; 3]; 3], r: [f64; 3]) -> FitOutcome<[f64; 3]> {
    let scale = m
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(FitError::SingularSystem { step: 0, pivot: 0.0 });
    }
    let tolerance = scale * PIVOT_EPSILON;

    // Augmented matrix [m | r]
    let mut aug = [
        [m[0][0], m[0][1], m[0][2], r[0]],
        [m[1][0], m[1][1], m[1][2], r[1]],
        [m[2][0], m[2][1], m[2][2], r[2]],
    ];

    for col in 0..3 {
        let mut max_row = col;
        let mut max_val = aug[col][col].abs();
        for row in (col + 1)..3 {
            if aug[row][col].abs() > max_val {
                max_val = aug[row][col].abs();
                max_row = row;
            }
        }

        if max_val <= tolerance {
            return Err(FitError::SingularSystem { step: col, pivot: max_val });
        }

        if max_row != col {
            aug.swap(col, max_row);
        }

        for row in (col + 1)..3 {
            let factor = aug[row][col] / aug[col][col];
            aug[row][col] = 0.0;
            for j in (col + 1)..4 {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    let mut x = [0.0f64; 3];
    for i in (0..3).rev() {
        let tail: f64 = ((i + 1)..3).map(|j| aug[i][j] * x[j]).sum();
        x[i] = (aug[i][3] - tail) / aug[i][i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(FitError::SingularSystem { step: 3, pivot: f64::NAN })
    }
}
