use crate::error::{CalError, Result};
use crate::model::dcf::reject_nan;

/// `ln(1 + e^x)` without overflow for large `x`.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Log-likelihood-ratio cost in bits, treating scores as natural-log LLRs.
pub fn cllr(pos: &[f64], neg: &[f64]) -> Result<f64> {
    if pos.is_empty() || neg.is_empty() {
        return Err(CalError::InsufficientData(
            "cllr needs both positive and negative trials".to_string(),
        ));
    }
    reject_nan(pos, "positive")?;
    reject_nan(neg, "negative")?;
    let miss = pos.iter().map(|&s| softplus(-s)).sum::<f64>() / pos.len() as f64;
    let fa = neg.iter().map(|&s| softplus(s)).sum::<f64>() / neg.len() as f64;
    Ok(0.5 * (miss + fa) / std::f64::consts::LN_2)
}
