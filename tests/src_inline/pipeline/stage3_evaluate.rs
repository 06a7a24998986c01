use super::*;
use crate::error::CalError;
use crate::pipeline::stage2_calibrate::TrialSplit;

fn pair(raw: (&[f64], &[f64]), cal: (&[f64], &[f64])) -> TrialPair {
    TrialPair {
        raw: TrialSplit {
            pos: raw.0.to_vec(),
            neg: raw.1.to_vec(),
        },
        calibrated: TrialSplit {
            pos: cal.0.to_vec(),
            neg: cal.1.to_vec(),
        },
    }
}

#[test]
fn test_before_and_after_runs() {
    // Raw scores separate the classes but sit far above zero; the shift fixes it.
    let trials = pair(
        (&[11.0, 12.0, 13.0], &[7.0, 8.0, 9.0]),
        (&[1.0, 2.0, 3.0], &[-3.0, -2.0, -1.0]),
    );
    let runs = run_stage3(&trials, &[0.5]).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].label, BEFORE_LABEL);
    assert_eq!(runs[1].label, AFTER_LABEL);
    assert_eq!(runs[0].reports[0].min_dcf, 0.0);
    assert_eq!(runs[0].reports[0].act_dcf, 1.0);
    assert_eq!(runs[1].reports[0].min_dcf, 0.0);
    assert_eq!(runs[1].reports[0].act_dcf, 0.0);
    assert!(runs[1].cllr < runs[0].cllr);
}

#[test]
fn test_empty_class_propagates() {
    let trials = pair((&[], &[1.0]), (&[], &[1.0]));
    assert!(matches!(
        run_stage3(&trials, &[0.5]),
        Err(CalError::InsufficientData(_))
    ));
}
