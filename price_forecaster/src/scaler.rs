//! Per-column min-max scaling into `[0, 1]`.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::Column;

#[derive(Debug, Error, PartialEq)]
pub enum ScalingError {
    #[error("cannot fit a scaler on zero rows")]
    Empty,
    #[error("expected {expected} columns, got {found}")]
    Width { expected: usize, found: usize },
    #[error("{0} is not a scaled column")]
    UnknownColumn(Column),
    #[error("column ordering {found:?} does not match fitted ordering {expected:?}")]
    Ordering {
        expected: Vec<Column>,
        found: Vec<Column>,
    },
}

/// Fitted min-max transform.
///
/// Remembers the column ordering it was fitted with; inverse transforms
/// against any other ordering are refused, since a reordered Close slot
/// would silently produce a wrong price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    columns: Vec<Column>,
    min: Array1<f64>,
    range: Array1<f64>,
}

impl MinMaxScaler {
    pub fn fit(columns: &[Column], data: ArrayView2<f64>) -> Result<Self, ScalingError> {
        if data.nrows() == 0 {
            return Err(ScalingError::Empty);
        }
        check_width(columns.len(), data.ncols())?;

        let min = data.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
        // A constant column maps to 0 and inverts back to its value.
        let range = (&max - &min).mapv(|r| if r == 0.0 { 1.0 } else { r });

        Ok(Self {
            columns: columns.to_vec(),
            min,
            range,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn transform(&self, data: ArrayView2<f64>) -> Result<Array2<f64>, ScalingError> {
        check_width(self.columns.len(), data.ncols())?;
        Ok((&data - &self.min) / &self.range)
    }

    /// Maps scaled rows back to prices, provided `columns` is the fitted ordering.
    pub fn inverse_transform(
        &self,
        columns: &[Column],
        data: ArrayView2<f64>,
    ) -> Result<Array2<f64>, ScalingError> {
        if columns != self.columns.as_slice() {
            return Err(ScalingError::Ordering {
                expected: self.columns.clone(),
                found: columns.to_vec(),
            });
        }
        check_width(self.columns.len(), data.ncols())?;
        Ok(&data * &self.range + &self.min)
    }

    /// Inverse of a single scaled value placed in `column`'s slot, zeros elsewhere.
    pub fn inverse_value(&self, columns: &[Column], column: Column, scaled: f64) -> Result<f64, ScalingError> {
        let slot = columns
            .iter()
            .position(|c| *c == column)
            .ok_or(ScalingError::UnknownColumn(column))?;
        let mut row = Array2::zeros((1, columns.len()));
        row[[0, slot]] = scaled;
        let restored = self.inverse_transform(columns, row.view())?;
        Ok(restored[[0, slot]])
    }
}

fn check_width(expected: usize, found: usize) -> Result<(), ScalingError> {
    if expected == found {
        Ok(())
    } else {
        Err(ScalingError::Width { expected, found })
    }
}
