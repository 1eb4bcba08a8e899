//! Stacked LSTM encoder with a ridge readout.
//!
//! Recurrent weights are drawn once from a seeded generator and frozen; only
//! the linear readout is fitted. The readout sees `[1, last input row, final
//! hidden state]`, so a fit is a single linear solve and is reproducible for
//! a given seed.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModelError, ModelSpec, SequenceModel, ridge::RidgeReadout};
use crate::windows::TrainingSet;

fn sigmoid(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(f64::tanh)
}

fn uniform(rng: &mut StdRng, shape: (usize, usize), limit: f64) -> Array2<f64> {
    Array2::from_shape_simple_fn(shape, || rng.random_range(-limit..limit))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct LstmCell {
    // Gate order: input, forget, candidate, output.
    w_x: [Array2<f64>; 4],
    w_h: [Array2<f64>; 4],
    b: [Array1<f64>; 4],
}

impl LstmCell {
    fn new(rng: &mut StdRng, input_size: usize, hidden_size: usize) -> Self {
        let limit = (1.0 / hidden_size as f64).sqrt();
        let mut w = || uniform(&mut *rng, (hidden_size, input_size), limit);
        let w_x = [w(), w(), w(), w()];
        let mut w = || uniform(&mut *rng, (hidden_size, hidden_size), limit);
        let w_h = [w(), w(), w(), w()];
        let b = [
            Array1::zeros(hidden_size),
            // Forget bias starts open.
            Array1::ones(hidden_size),
            Array1::zeros(hidden_size),
            Array1::zeros(hidden_size),
        ];
        Self { w_x, w_h, b }
    }

    fn hidden_size(&self) -> usize {
        self.b[0].len()
    }

    fn gate(&self, k: usize, x: &ArrayView1<f64>, h: &Array1<f64>) -> Array1<f64> {
        self.w_x[k].dot(x) + self.w_h[k].dot(h) + &self.b[k]
    }

    /// One time step: returns `(h_next, c_next)`.
    fn forward(&self, x: ArrayView1<f64>, h: &Array1<f64>, c: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
        let i = sigmoid(&self.gate(0, &x, h));
        let f = sigmoid(&self.gate(1, &x, h));
        let g = tanh(&self.gate(2, &x, h));
        let o = sigmoid(&self.gate(3, &x, h));

        let c_next = &f * c + &i * &g;
        let h_next = &o * &tanh(&c_next);
        (h_next, c_next)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct LstmEncoder {
    cells: Vec<LstmCell>,
}

impl LstmEncoder {
    fn new(spec: &ModelSpec, input_size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(spec.seed);
        let layers = spec.layers.max(1);
        let cells = (0..layers)
            .map(|l| {
                let input = if l == 0 { input_size } else { spec.hidden_size };
                LstmCell::new(&mut rng, input, spec.hidden_size)
            })
            .collect();
        Self { cells }
    }

    /// Final hidden state of the top layer after running the whole window.
    fn encode(&self, window: ArrayView2<f64>) -> Array1<f64> {
        let mut state: Vec<(Array1<f64>, Array1<f64>)> = self
            .cells
            .iter()
            .map(|c| (Array1::zeros(c.hidden_size()), Array1::zeros(c.hidden_size())))
            .collect();

        for x in window.rows() {
            let mut input = x.to_owned();
            for (cell, (h, c)) in self.cells.iter().zip(state.iter_mut()) {
                let (h_next, c_next) = cell.forward(input.view(), h, c);
                *h = h_next;
                *c = c_next;
                input = h.clone();
            }
        }
        state.pop().map(|(h, _)| h).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LstmRegressor {
    lookback: usize,
    width: usize,
    encoder: LstmEncoder,
    readout: RidgeReadout,
}

impl LstmRegressor {
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn features(&self, window: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        extended_state(&self.encoder, window)
    }
}

fn extended_state(encoder: &LstmEncoder, window: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
    let Some(last_index) = window.nrows().checked_sub(1) else {
        return Err(ModelError::Shape {
            expected: (1, window.ncols()),
            found: window.dim(),
        });
    };
    let last = window.row(last_index);
    let hidden = encoder.encode(window);
    let bias = Array1::ones(1);
    // Views of equal dimension always concatenate along axis 0.
    Ok(concatenate(Axis(0), &[bias.view(), last, hidden.view()]).unwrap_or_default())
}

impl SequenceModel for LstmRegressor {
    fn fit(spec: &ModelSpec, data: &TrainingSet) -> Result<Self, ModelError> {
        if data.is_empty() {
            return Err(ModelError::NoTrainingData);
        }
        let (lookback, width) = (data.lookback(), data.width());
        let encoder = LstmEncoder::new(spec, width);

        let dim = 1 + width + spec.hidden_size;
        let mut design = Array2::zeros((data.len(), dim));
        for (k, window) in data.windows.outer_iter().enumerate() {
            design.row_mut(k).assign(&extended_state(&encoder, window)?);
        }
        let readout = RidgeReadout::fit(design.view(), data.labels.view(), spec.ridge)?;
        debug!(samples = data.len(), lookback, width, "fitted sequence model");

        Ok(Self {
            lookback,
            width,
            encoder,
            readout,
        })
    }

    fn predict(&self, window: ArrayView2<f64>) -> Result<f64, ModelError> {
        let found = window.dim();
        if found != (self.lookback, self.width) {
            return Err(ModelError::Shape {
                expected: (self.lookback, self.width),
                found,
            });
        }
        Ok(self.readout.predict(self.features(window)?.view()))
    }
}
