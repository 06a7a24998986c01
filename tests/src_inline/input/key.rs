use super::*;
use std::io::Cursor;

fn parse(text: &str) -> Result<TrialKey> {
    parse_key(Cursor::new(text.as_bytes().to_vec()))
}

#[test]
fn test_parse_key_grid() {
    let key = parse(
        "# enroll test label\n\
         spk1\tseg1\ttarget\n\
         spk1\tseg2\tnontarget\n\
         \n\
         spk2\tseg2\ttgt\n\
         spk2 seg3 imp\n",
    )
    .unwrap();
    assert_eq!(key.enroll_ids(), &["spk1".to_string(), "spk2".to_string()][..]);
    assert_eq!(key.test_ids().len(), 3);
    assert_eq!(key.label(0, 0), TrialLabel::Target);
    assert_eq!(key.label(0, 1), TrialLabel::NonTarget);
    assert_eq!(key.label(0, 2), TrialLabel::Unused);
    assert_eq!(key.label(1, 0), TrialLabel::Unused);
    assert_eq!(key.label(1, 1), TrialLabel::Target);
    assert_eq!(key.label(1, 2), TrialLabel::NonTarget);
    assert_eq!(key.n_evaluated(), 4);
}

#[test]
fn test_duplicate_trial_kept_once() {
    let key = parse("a\tx\t1\na\tx\ttarget\n").unwrap();
    assert_eq!(key.count(TrialLabel::Target), 1);
}

#[test]
fn test_conflicting_trial_rejected() {
    let err = parse("a\tx\ttarget\na\tx\tnontarget\n").unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_unknown_label_rejected() {
    assert!(matches!(
        parse("a\tx\tperhaps\n"),
        Err(CalError::MalformedInput(_))
    ));
}

#[test]
fn test_wrong_field_count_rejected() {
    let err = parse("a\tx\n").unwrap_err();
    assert!(err.to_string().contains("expected 3 fields"));
}

#[test]
fn test_empty_key() {
    let key = parse("").unwrap();
    assert_eq!(key.shape(), (0, 0));
}
