use crate::error::Result;
use crate::input::ScoreInput;
use crate::model::calibrator::AffineCalibrator;
use crate::model::scores::AlignMode;

#[derive(Debug, Clone, PartialEq)]
pub struct TrialSplit {
    pub pos: Vec<f64>,
    pub neg: Vec<f64>,
}

#[derive(Debug)]
pub struct Stage2Output {
    pub calibrated: ScoreInput,
    /// Present only when positives and negatives can be told apart.
    pub trials: Option<TrialPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialPair {
    pub raw: TrialSplit,
    pub calibrated: TrialSplit,
}

pub fn run_stage2(
    input: &ScoreInput,
    calibrator: &AffineCalibrator,
    alignment: AlignMode,
) -> Result<Stage2Output> {
    let out = match input {
        ScoreInput::Unsplit(all) => Stage2Output {
            calibrated: ScoreInput::Unsplit(calibrator.apply(all)),
            trials: None,
        },
        ScoreInput::PreSplit { pos, neg } => {
            let cal_pos = calibrator.apply(pos);
            let cal_neg = calibrator.apply(neg);
            let trials = TrialPair {
                raw: TrialSplit {
                    pos: pos.to_vec(),
                    neg: neg.to_vec(),
                },
                calibrated: TrialSplit {
                    pos: cal_pos.to_vec(),
                    neg: cal_neg.to_vec(),
                },
            };
            Stage2Output {
                calibrated: ScoreInput::PreSplit {
                    pos: cal_pos,
                    neg: cal_neg,
                },
                trials: Some(trials),
            }
        }
        ScoreInput::Matrix(scores) => Stage2Output {
            calibrated: ScoreInput::Matrix(scores.calibrated(calibrator)?),
            trials: None,
        },
        ScoreInput::MatrixWithKey { scores, key } => {
            let (raw_pos, raw_neg) = scores.align(key, alignment)?.split();
            let cal_scores = scores.calibrated(calibrator)?;
            let (cal_pos, cal_neg) = cal_scores.align(key, alignment)?.split();
            tracing::info!(
                n_pos = raw_pos.len(),
                n_neg = raw_neg.len(),
                n_key_trials = key.n_evaluated(),
                alignment = alignment.as_str(),
                "aligned scores to key"
            );
            Stage2Output {
                calibrated: ScoreInput::MatrixWithKey {
                    scores: cal_scores,
                    key: key.clone(),
                },
                trials: Some(TrialPair {
                    raw: TrialSplit {
                        pos: raw_pos,
                        neg: raw_neg,
                    },
                    calibrated: TrialSplit {
                        pos: cal_pos,
                        neg: cal_neg,
                    },
                }),
            }
        }
    };

    if out.trials.is_none() {
        tracing::info!(
            kind = input.kind(),
            "scores carry no class labels; performance will not be computed"
        );
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_calibrate.rs"]
mod tests;
