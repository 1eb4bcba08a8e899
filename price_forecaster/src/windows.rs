//! Sliding windows over a scaled feature matrix.

use ndarray::{Array1, Array3, ArrayView2, s};

/// Overlapping `(window, label)` pairs, one per row after the first `lookback`.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSet {
    /// `(samples, lookback, columns)`.
    pub windows: Array3<f64>,
    pub labels: Array1<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn lookback(&self) -> usize {
        self.windows.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.windows.shape()[2]
    }
}

/// Window `i - lookback..i` is labelled with `scaled[i, target]`.
pub fn training_set(scaled: ArrayView2<f64>, lookback: usize, target: usize) -> TrainingSet {
    let (rows, width) = scaled.dim();
    let samples = rows.saturating_sub(lookback);

    let mut windows = Array3::zeros((samples, lookback, width));
    let mut labels = Array1::zeros(samples);
    for k in 0..samples {
        windows
            .slice_mut(s![k, .., ..])
            .assign(&scaled.slice(s![k..k + lookback, ..]));
        labels[k] = scaled[[k + lookback, target]];
    }
    TrainingSet { windows, labels }
}

/// The most recent `lookback` rows, or `None` when there are fewer.
pub fn last_window(scaled: ArrayView2<f64>, lookback: usize) -> Option<ArrayView2<f64>> {
    let rows = scaled.nrows();
    (rows >= lookback).then(|| scaled.slice_move(s![rows - lookback.., ..]))
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::*;

    #[test]
    fn labels_follow_their_window() {
        let m = Array2::from_shape_fn((6, 2), |(i, j)| (i * 10 + j) as f64);
        let set = training_set(m.view(), 3, 0);

        assert_eq!(set.len(), 3);
        assert_eq!((set.lookback(), set.width()), (3, 2));
        assert_eq!(set.windows.slice(s![0, .., 0]).to_vec(), vec![0.0, 10.0, 20.0]);
        assert_eq!(set.labels.to_vec(), vec![30.0, 40.0, 50.0]);
        assert_eq!(set.windows.slice(s![2, 2, ..]).to_vec(), vec![40.0, 41.0]);
    }

    #[test]
    fn exactly_lookback_rows_has_no_samples() {
        let m = Array2::<f64>::ones((3, 2));
        assert!(training_set(m.view(), 3, 0).is_empty());
    }

    #[test]
    fn last_window_takes_the_tail() {
        let m = array![[1.0], [2.0], [3.0], [4.0]];
        let w = last_window(m.view(), 2).unwrap();
        assert_eq!(w.column(0).to_vec(), vec![3.0, 4.0]);
        assert!(last_window(m.view(), 5).is_none());
    }
}
