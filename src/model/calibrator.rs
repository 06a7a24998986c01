use ndarray::{Array, ArrayBase, Data, DataMut, Dimension};
use serde::Serialize;

use crate::error::{CalError, Result};

/// Affine map `y = a * x + b` from raw scores onto a log-likelihood-ratio scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffineCalibrator {
    pub a: f64,
    pub b: f64,
}

impl AffineCalibrator {
    pub fn new(a: f64, b: f64) -> Result<Self> {
        if !a.is_finite() {
            return Err(CalError::MalformedModel(format!(
                "scale parameter a is not finite ({a})"
            )));
        }
        if !b.is_finite() {
            return Err(CalError::MalformedModel(format!(
                "shift parameter b is not finite ({b})"
            )));
        }
        Ok(Self { a, b })
    }

    #[inline]
    pub fn apply_scalar(&self, x: f64) -> f64 {
        self.a * x + self.b
    }

    /// Elementwise transform; the output has the input's dimension and shape.
    pub fn apply<S, D>(&self, x: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        x.mapv(|v| self.apply_scalar(v))
    }

    pub fn apply_into<S, T, D>(&self, x: &ArrayBase<S, D>, out: &mut ArrayBase<T, D>) -> Result<()>
    where
        S: Data<Elem = f64>,
        T: DataMut<Elem = f64>,
        D: Dimension,
    {
        if x.shape() != out.shape() {
            return Err(CalError::shape(x.shape(), out.shape()));
        }
        out.zip_mut_with(x, |o, &v| *o = self.apply_scalar(v));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/calibrator.rs"]
mod tests;
