//! Closed-form ridge regression readout.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

use super::ModelError;

const PIVOT_EPS: f64 = 1e-12;

/// Linear readout `y = w · x` fitted by `(XᵀX + λI) w = Xᵀy`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidgeReadout {
    weights: Array1<f64>,
}

impl RidgeReadout {
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, lambda: f64) -> Result<Self, ModelError> {
        let d = x.ncols();
        let mut gram = x.t().dot(&x);
        for i in 0..d {
            gram[[i, i]] += lambda;
        }
        let rhs = x.t().dot(&y).insert_axis(Axis(1));
        let w = solve(&gram, &rhs)?;
        Ok(Self {
            weights: w.column(0).to_owned(),
        })
    }

    pub fn predict(&self, features: ArrayView1<f64>) -> f64 {
        self.weights.dot(&features)
    }

    pub fn width(&self) -> usize {
        self.weights.len()
    }
}

/// Gauss-Jordan elimination with partial pivoting; solves `a · x = b`.
pub(crate) fn solve(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
    let n = a.nrows();
    let m = b.ncols();

    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(a);
    aug.slice_mut(s![.., n..]).assign(b);

    for i in 0..n {
        let pivot = (i..n)
            .max_by(|&p, &q| aug[[p, i]].abs().total_cmp(&aug[[q, i]].abs()))
            .unwrap_or(i);
        if pivot != i {
            for j in 0..n + m {
                aug.swap([i, j], [pivot, j]);
            }
        }

        if aug[[i, i]].abs() < PIVOT_EPS {
            return Err(ModelError::Singular);
        }

        for k in i + 1..n {
            let factor = aug[[k, i]] / aug[[i, i]];
            for j in i..n + m {
                aug[[k, j]] -= factor * aug[[i, j]];
            }
        }
    }

    let mut x = Array2::zeros((n, m));
    for i in (0..n).rev() {
        for j in 0..m {
            let mut sum = aug[[i, n + j]];
            for k in i + 1..n {
                sum -= aug[[i, k]] * x[[k, j]];
            }
            x[[i, j]] = sum / aug[[i, i]];
        }
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn solves_small_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![[3.0], [5.0]];
        let x = solve(&a, &b).unwrap();
        assert_relative_eq!(x[[0, 0]], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[[1, 0]], 1.4, epsilon = 1e-12);
    }

    #[test]
    fn pivots_around_zero_diagonal() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![[2.0], [3.0]];
        let x = solve(&a, &b).unwrap();
        assert_relative_eq!(x[[0, 0]], 3.0);
        assert_relative_eq!(x[[1, 0]], 2.0);
    }

    #[test]
    fn singular_without_penalty() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![[1.0], [2.0]];
        assert!(matches!(solve(&a, &b), Err(ModelError::Singular)));
    }

    #[test]
    fn recovers_linear_map() {
        // y = 0.5 + 2 x1 - x2 with an intercept column.
        let x = array![
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 0.5, 0.2]
        ];
        let y = x.rows().into_iter().map(|r| 0.5 + 2.0 * r[1] - r[2]).collect::<Array1<f64>>();
        let readout = RidgeReadout::fit(x.view(), y.view(), 1e-10).unwrap();
        assert_relative_eq!(readout.predict(array![1.0, 0.3, 0.6].view()), 0.5, epsilon = 1e-6);
    }
}
