use super::*;
use ndarray::array;

use crate::model::key::TrialLabel::{NonTarget as N, Target as T, Unused as U};

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_key() -> TrialKey {
    TrialKey::new(
        ids(&["spk_a", "spk_b"]),
        ids(&["seg_1", "seg_2", "seg_3"]),
        array![[T, N, U], [N, T, N]],
    )
    .unwrap()
}

// Rows and columns in a different order than the key, plus an extra column.
fn sample_scores() -> ScoreMatrix {
    ScoreMatrix::new(
        ids(&["spk_b", "spk_a"]),
        ids(&["seg_3", "seg_x", "seg_1", "seg_2"]),
        array![[-2.0, 9.0, -1.0, 4.0], [0.5, 9.0, 3.0, -3.0]],
    )
    .unwrap()
}

#[test]
fn test_align_follows_key_order() {
    let key = sample_key();
    let aligned = sample_scores().align(&key, AlignMode::Strict).unwrap();
    assert_eq!(aligned.scores.enroll_ids(), key.enroll_ids());
    assert_eq!(aligned.scores.test_ids(), key.test_ids());
    assert_eq!(aligned.scores.values(), &array![[3.0, -3.0, 0.5], [-1.0, 4.0, -2.0]]);
    assert_eq!(aligned.key, key);
}

#[test]
fn test_extract_by_label_row_major() {
    let key = sample_key();
    let aligned = sample_scores().align(&key, AlignMode::Strict).unwrap();
    assert_eq!(aligned.extract_by_label(TrialLabel::Target), vec![3.0, 4.0]);
    assert_eq!(
        aligned.extract_by_label(TrialLabel::NonTarget),
        vec![-3.0, -1.0, -2.0]
    );
    let (pos, neg) = aligned.split();
    assert!(pos.len() + neg.len() <= key.n_evaluated());
}

#[test]
fn test_realign_is_idempotent() {
    let key = sample_key();
    let once = sample_scores().align(&key, AlignMode::Strict).unwrap();
    let twice = once.scores.align(&key, AlignMode::Strict).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_strict_alignment_reports_missing_trial() {
    let key = sample_key();
    let partial = ScoreMatrix::new(
        ids(&["spk_a"]),
        ids(&["seg_1", "seg_2", "seg_3"]),
        array![[1.0, 2.0, 3.0]],
    )
    .unwrap();
    let err = partial.align(&key, AlignMode::Strict).unwrap_err();
    match err {
        CalError::MissingEntry { enroll, test } => {
            assert_eq!(enroll, "spk_b");
            assert_eq!(test, "seg_1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_strict_alignment_ignores_missing_unused_trials() {
    let key = sample_key();
    // seg_3 has no scores, but every trial against it is Unused.
    let key = TrialKey::new(
        key.enroll_ids().to_vec(),
        key.test_ids().to_vec(),
        array![[T, N, U], [N, T, U]],
    )
    .unwrap();
    let scores = ScoreMatrix::new(
        ids(&["spk_a", "spk_b"]),
        ids(&["seg_1", "seg_2"]),
        array![[1.0, 2.0], [3.0, 4.0]],
    )
    .unwrap();
    let aligned = scores.align(&key, AlignMode::Strict).unwrap();
    assert_eq!(aligned.scores.shape(), (2, 2));
    assert_eq!(aligned.split(), (vec![1.0, 4.0], vec![2.0, 3.0]));
}

#[test]
fn test_lenient_alignment_uses_intersection() {
    let key = sample_key();
    let partial = ScoreMatrix::new(
        ids(&["spk_a"]),
        ids(&["seg_2", "seg_1"]),
        array![[2.0, 1.0]],
    )
    .unwrap();
    let aligned = partial.align(&key, AlignMode::Lenient).unwrap();
    assert_eq!(aligned.scores.shape(), (1, 2));
    assert_eq!(aligned.scores.test_ids(), &ids(&["seg_1", "seg_2"])[..]);
    assert_eq!(aligned.split(), (vec![1.0], vec![2.0]));
}

#[test]
fn test_calibrated_keeps_ids_and_shape() {
    let scores = sample_scores();
    let cal = AffineCalibrator::new(2.0, -1.0).unwrap();
    let out = scores.calibrated(&cal).unwrap();
    assert_eq!(out.enroll_ids(), scores.enroll_ids());
    assert_eq!(out.test_ids(), scores.test_ids());
    assert_eq!(out.shape(), scores.shape());
    assert_eq!(out.values()[[1, 2]], 5.0);
}

#[test]
fn test_new_rejects_bad_shape() {
    let err = ScoreMatrix::new(ids(&["a"]), ids(&["x", "y"]), array![[1.0]]).unwrap_err();
    assert!(matches!(err, CalError::ShapeMismatch { .. }));
}

#[test]
fn test_new_rejects_duplicate_ids() {
    let err = ScoreMatrix::new(ids(&["a", "a"]), ids(&["x"]), array![[1.0], [2.0]]).unwrap_err();
    assert!(matches!(err, CalError::MalformedInput(_)));
}
