use super::*;
use ndarray::array;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::CalError;
use crate::input::matrix::write_score_matrix;
use crate::input::{ScoreInput, load_scores};
use crate::model::scores::ScoreMatrix;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!(
        "score_calibrate_main_test_{}_{}",
        std::process::id(),
        id
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn parse_run(extra: &[&str]) -> RunArgs {
    let mut argv = vec!["score-calibrate", "run", "scores.json", "model.json", "out"];
    argv.extend_from_slice(extra);
    let Command::Run(args) = Cli::try_parse_from(argv).unwrap().command;
    args
}

#[test]
fn test_parse_args_defaults() {
    let config = resolve_config(parse_run(&[])).unwrap();
    assert_eq!(config.format, ScoreFormat::Arrays);
    assert_eq!(config.eval.priors, vec![0.01, 0.5]);
    assert_eq!(config.eval.alignment, AlignMode::Strict);
    assert!(config.key_path.is_none());
    assert_eq!(config.out_stem, PathBuf::from("out"));
}

#[test]
fn test_parse_args_ptar_and_lenient() {
    let config = resolve_config(parse_run(&["--ptar", "0.05", "--lenient", "--fmt", "matrix"])).unwrap();
    assert_eq!(config.eval.priors, vec![0.05, 0.5]);
    assert_eq!(config.eval.alignment, AlignMode::Lenient);
    assert_eq!(config.format, ScoreFormat::Matrix);
}

#[test]
fn test_parse_args_explicit_priors_win() {
    let config = resolve_config(parse_run(&[
        "--ptar", "0.05", "--prior", "0.2", "--prior", "0.001", "--prior", "0.2",
    ]))
    .unwrap();
    assert_eq!(config.eval.priors, vec![0.2, 0.001]);
}

#[test]
fn test_parse_args_rejects_bad_prior() {
    let err = resolve_config(parse_run(&["--ptar", "1.0"])).unwrap_err();
    assert!(matches!(err, CalError::InvalidPrior(_)));
}

#[test]
fn test_parse_args_unknown_format() {
    assert!(
        Cli::try_parse_from(["score-calibrate", "run", "s", "m", "o", "--fmt", "h5"]).is_err()
    );
}

#[test]
fn test_config_file_then_flags() {
    let dir = make_temp_dir();
    let cfg = dir.join("eval.json");
    fs::write(&cfg, r#"{"priors":[0.1,0.3],"alignment":"lenient"}"#).unwrap();
    let cfg_arg = cfg.display().to_string();
    let config = resolve_config(parse_run(&["--config", &cfg_arg])).unwrap();
    assert_eq!(config.eval.priors, vec![0.1, 0.3]);
    assert_eq!(config.eval.alignment, AlignMode::Lenient);

    let config = resolve_config(parse_run(&["--config", &cfg_arg, "--ptar", "0.02"])).unwrap();
    assert_eq!(config.eval.priors, vec![0.02, 0.5]);
}

#[test]
fn test_execute_presplit_end_to_end() {
    let dir = make_temp_dir();
    let scores = dir.join("scores.json");
    let model = dir.join("model.json");
    fs::write(&scores, r#"{"pos":[11.0,12.0,13.0],"neg":[7.0,8.0,9.0]}"#).unwrap();
    fs::write(&model, r#"{"a":1.0,"b":-10.0}"#).unwrap();

    let config = RunConfig {
        scores_path: scores,
        model_path: model,
        out_stem: dir.join("calibrated"),
        key_path: None,
        format: ScoreFormat::Arrays,
        eval: EvalConfig::with_ptar(0.5),
        report_json: Some(dir.join("summary.json")),
    };
    let table = execute(&config).unwrap().unwrap();
    assert!(table.contains("3 positive and 3 negative"));
    assert!(table.contains("before calibration"));
    assert!(table.contains("after calibration"));

    let out = load_scores(&dir.join("calibrated.json"), ScoreFormat::Arrays, None).unwrap();
    assert_eq!(
        out,
        ScoreInput::PreSplit {
            pos: array![1.0, 2.0, 3.0],
            neg: array![-3.0, -2.0, -1.0],
        }
    );
    assert!(dir.join("summary.json").exists());
}

#[test]
fn test_execute_matrix_with_key_end_to_end() {
    let dir = make_temp_dir();
    let scores = dir.join("scores.scm");
    let key = dir.join("key.tsv");
    let model = dir.join("model.json");
    let ids = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let matrix = ScoreMatrix::new(
        ids(&["e1", "e2"]),
        ids(&["t1", "t2"]),
        array![[4.0, 0.0], [-1.0, 3.0]],
    )
    .unwrap();
    write_score_matrix(&scores, &matrix).unwrap();
    fs::write(&key, "e1\tt1\ttarget\ne1\tt2\tnontarget\ne2\tt1\tnontarget\ne2\tt2\ttarget\n").unwrap();
    fs::write(&model, r#"{"a":0.5,"b":-1.0}"#).unwrap();

    let config = RunConfig {
        scores_path: scores,
        model_path: model,
        out_stem: dir.join("cal"),
        key_path: Some(key),
        format: ScoreFormat::Matrix,
        eval: EvalConfig::default_v1(),
        report_json: None,
    };
    let table = execute(&config).unwrap().unwrap();
    assert!(table.contains("2 positive and 2 negative"));

    match load_scores(&dir.join("cal.scm"), ScoreFormat::Matrix, None).unwrap() {
        ScoreInput::Matrix(out) => {
            assert_eq!(out.values(), &array![[1.0, -1.0], [-1.5, 0.5]]);
        }
        other => panic!("unexpected kind {}", other.kind()),
    }
}

#[test]
fn test_execute_unsplit_has_no_table() {
    let dir = make_temp_dir();
    let scores = dir.join("all.json");
    let model = dir.join("model.json");
    fs::write(&scores, r#"{"all":[0.0,1.0,2.0]}"#).unwrap();
    fs::write(&model, r#"{"a":2.0,"b":-1.0}"#).unwrap();
    let config = RunConfig {
        scores_path: scores,
        model_path: model,
        out_stem: dir.join("out"),
        key_path: None,
        format: ScoreFormat::Arrays,
        eval: EvalConfig::default_v1(),
        report_json: None,
    };
    assert!(execute(&config).unwrap().is_none());
    assert_eq!(
        load_scores(&dir.join("out.json"), ScoreFormat::Arrays, None).unwrap(),
        ScoreInput::Unsplit(array![-1.0, 1.0, 3.0])
    );
}
