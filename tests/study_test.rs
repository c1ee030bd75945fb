//! Integration tests for the full study pipeline
//!
//! These tests run a complete study over a synthetic project to verify:
//! - Derivation persists one artifact per cohort and is idempotent
//! - Descriptive reports carry every block at every age plus the average row
//! - Every inferential cell fits on a vocabulary built to support it
//! - Reported R-squared values and interval bounds stay inside [0, 1]
//! - Bootstrap overrides flow from the config into the reports
//!
//! Each test uses its own temp directory as the project root.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use phonpact::config::StudyConfig;
use phonpact::models::{CohortId, WordEntry};
use phonpact::pipeline::Pipeline;

/// A vocabulary built so every study cell has enough usable rows:
/// a CVC family sharing rimes and onsets, a multisyllabic family sharing
/// stressed syllables, and enough five-phoneme bisyllables with phonemic
/// neighbors to carry the bisyllabic frequency cell.
fn study_words() -> Vec<(&'static str, &'static str, f64, f64)> {
    vec![
        ("b1@t", "bat", 12.0, 40.0),
        ("k1@t", "cat", 10.0, 35.0),
        ("h1@t", "hat", 8.0, 30.0),
        ("m1@t", "mat", 7.0, 22.0),
        ("s1@t", "sat", 6.0, 18.0),
        ("k1@b", "cab", 5.0, 12.0),
        ("k1@p", "cap", 4.0, 11.0),
        ("t1@p", "tap", 3.0, 9.0),
        ("m1@p", "map", 2.0, 6.0),
        ("b1e_bi", "baby", 9.0, 28.0),
        ("b1e_kR", "baker", 2.0, 4.0),
        ("b1e_sIk", "basic", 3.0, 7.0),
        ("t1e_bL", "table", 6.0, 20.0),
        ("t1e_kIN", "taking", 4.0, 10.0),
        ("m1e_bi", "maybe", 5.0, 15.0),
        ("p1e_sIk", "pacer", 1.0, 2.0),
        ("b1e_sIt", "beset", 2.0, 5.0),
        ("b1e_sI", "bessy", 3.0, 6.0),
        ("r1o_bot", "robot", 4.0, 9.0),
        ("s1I_stR", "sister", 8.0, 25.0),
    ]
}

fn seed_study(root: &Path) {
    let lexicon_dir = root.join("lexicons");
    fs::create_dir_all(&lexicon_dir).unwrap();
    let lexicon: BTreeMap<String, WordEntry> = study_words()
        .into_iter()
        .map(|(phon, orth, numchild, token)| {
            (
                phon.to_string(),
                WordEntry {
                    orth: orth.to_string(),
                    numchild,
                    token,
                },
            )
        })
        .collect();
    let body = serde_json::to_string_pretty(&lexicon).unwrap();
    for cohort in CohortId::all() {
        fs::write(lexicon_dir.join(format!("{}.json", cohort.stem())), &body).unwrap();
    }
}

/// Pull the point R-squared out of a fitted report line.
fn r_squared_of(line: &str) -> f64 {
    let field = line.split(',').nth(6).unwrap();
    field.split(' ').next().unwrap().parse().unwrap()
}

#[test]
fn test_full_study_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    seed_study(dir.path());
    let pipeline = Pipeline::new(dir.path(), StudyConfig::default());

    let summary = pipeline.derive_all().unwrap();
    assert!(summary.is_complete(), "failed: {:?}", summary.failed);
    for (_, rows) in &summary.derived {
        assert_eq!(*rows, 20);
    }

    let descriptive = pipeline.descriptive().unwrap();
    assert_eq!(descriptive.len(), 3);
    let positive = fs::read_to_string(&descriptive[1]).unwrap();
    assert!(positive.contains("cvc words: child transcript count (raw)"));
    assert!(positive.contains("cvc words: adult token count (raw)"));
    assert!(positive.contains("cvc words: phonemic density"));
    assert!(positive.contains("bisyllabic five-phoneme words: neighbor frequency"));
    for label in ["three", "four", "six", "average"] {
        assert!(positive.contains(&format!("\n{label},")), "missing {label}");
    }
    let multi = fs::read_to_string(&descriptive[2]).unwrap();
    assert!(multi.contains("multisyllabic words: adult transcript count (raw)"));
    assert!(multi.contains("multisyllabic words: phonemic density"));
    assert!(multi.contains("multisyllabic words: onset-nucleus-coda density"));

    let inferential = pipeline.inferential().unwrap();
    assert_eq!(inferential.len(), 2);
    let positive = fs::read_to_string(&inferential[0]).unwrap();
    let multi = fs::read_to_string(&inferential[1]).unwrap();
    assert_eq!(positive.lines().count(), 10);
    assert_eq!(multi.lines().count(), 7);

    // The vocabulary is built so no cell degenerates.
    assert!(!positive.contains("error:"), "{positive}");
    assert!(!multi.contains("error:"), "{multi}");

    for line in positive.lines().skip(1).chain(multi.lines().skip(1)) {
        let r2 = r_squared_of(line);
        assert!((0.0..=1.0).contains(&r2), "out of range: {line}");
    }
}

#[test]
fn test_derivation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    seed_study(dir.path());
    let pipeline = Pipeline::new(dir.path(), StudyConfig::default());

    pipeline.derive_all().unwrap();
    let first = fs::read_to_string(dir.path().join("derived/three_child.json")).unwrap();
    pipeline.derive_all().unwrap();
    let second = fs::read_to_string(dir.path().join("derived/three_child.json")).unwrap();

    // Identical input and the same store layout, apart from the timestamp.
    let strip = |text: &str| -> String {
        text.lines()
            .filter(|l| !l.contains("generated_at"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&first), strip(&second));
}

#[test]
fn test_bootstrap_overrides_flow_into_reports() {
    let dir = tempfile::tempdir().unwrap();
    seed_study(dir.path());

    let mut config = StudyConfig::default();
    config.bootstrap.iterations = 80;
    config.bootstrap.seed = 9;
    let pipeline = Pipeline::new(dir.path(), config);
    pipeline.derive_all().unwrap();
    let fast = pipeline.inferential().unwrap();
    let fast_report = fs::read_to_string(&fast[0]).unwrap();

    let mut other = StudyConfig::default();
    other.bootstrap.iterations = 80;
    other.bootstrap.seed = 10;
    let pipeline = Pipeline::new(dir.path(), other);
    let shifted = pipeline.inferential().unwrap();
    let shifted_report = fs::read_to_string(&shifted[0]).unwrap();

    // A different seed resamples differently, so at least one interval moves;
    // the point estimates are fit without resampling and stay put.
    assert_ne!(fast_report, shifted_report);
    let points = |text: &str| -> Vec<f64> {
        text.lines().skip(1).map(r_squared_of).collect()
    };
    assert_eq!(points(&fast_report), points(&shifted_report));
}
