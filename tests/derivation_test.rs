//! Integration tests for the derivation layer
//!
//! These tests exercise the public library API end to end to verify:
//! - Partial adult coverage produces absent-sentinel columns, not dropped rows
//! - Absent (NaN) and log-of-zero (-inf) values survive an artifact round trip
//! - Adult cohorts referenced against themselves mirror their own usage columns
//!
//! Each test uses its own temp directory.

use std::collections::BTreeMap;

use phonpact::derive::{self, KlatteseShapes, KlatteseSimilarity};
use phonpact::models::{AgeGroup, CohortId, Lexicon, SpeakerRole, WordEntry};
use phonpact::store::ArtifactStore;

fn lexicon(words: &[(&str, &str, f64, f64)]) -> Lexicon {
    words
        .iter()
        .map(|&(phon, orth, numchild, token)| {
            (
                phon.to_string(),
                WordEntry {
                    orth: orth.to_string(),
                    numchild,
                    token,
                },
            )
        })
        .collect::<BTreeMap<_, _>>()
}

#[test]
fn test_partial_adult_coverage_round_trips_through_the_store() {
    let child = lexicon(&[("k1@t", "cat", 10.0, 35.0), ("d1Og", "dog", 5.0, 12.0)]);
    let adult = lexicon(&[("k1@t", "cat", 8.0, 40.0)]);
    let cohort = CohortId::new(AgeGroup::Three, SpeakerRole::Child);

    let table = derive::derive(
        cohort,
        &child,
        &adult,
        &KlatteseShapes,
        &KlatteseSimilarity::default(),
    )
    .unwrap();
    assert_eq!(table.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write_table(&table).unwrap();
    let read = store.read_table(cohort).unwrap();
    assert_eq!(read.len(), 2);

    let cat = read.get("k1@t").unwrap();
    assert!((cat.pct_child - 10.0f64.ln()).abs() < 1e-12);
    assert!((cat.pct_adult - 8.0f64.ln()).abs() < 1e-12);
    assert!((cat.token_adult - 41.0f64.ln()).abs() < 1e-12);

    // The dog row survives with absent sentinels, not as a dropped row.
    let dog = read.get("d1Og").unwrap();
    assert_eq!(dog.orth, "dog");
    assert!(dog.pct_adult.is_nan());
    assert!(dog.token_adult.is_nan());

    // One finite reference point cannot support a polynomial fit, so every
    // adjusted-use column stays absent for the whole table.
    for row in read.rows() {
        assert!(row.pact_pct_token_p1.is_nan(), "{}", row.phon);
        assert!(row.pact_pct_pct_p2.is_nan(), "{}", row.phon);
    }

    // No phonemic overlap between the two transcriptions.
    assert_eq!(cat.phonemic_density, 0);
    assert_eq!(cat.neighbor_frequency, 0.0);
}

#[test]
fn test_log_of_zero_stays_distinct_from_absent() {
    let child = lexicon(&[("k1@t", "cat", 0.0, 3.0), ("b1@t", "bat", 4.0, 9.0)]);
    let adult = lexicon(&[("b1@t", "bat", 2.0, 5.0)]);
    let cohort = CohortId::new(AgeGroup::Four, SpeakerRole::Child);

    let table = derive::derive(
        cohort,
        &child,
        &adult,
        &KlatteseShapes,
        &KlatteseSimilarity::default(),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write_table(&table).unwrap();
    let read = store.read_table(cohort).unwrap();

    let cat = read.get("k1@t").unwrap();
    // A word the children never said in this sample logs to -inf; a word the
    // adults never said at all is NaN. The two must never collapse into one.
    assert_eq!(cat.pct_child, f64::NEG_INFINITY);
    assert!(cat.pct_adult.is_nan());
}

#[test]
fn test_adult_cohort_mirrors_its_own_usage_columns() {
    let adults = lexicon(&[
        ("k1@t", "cat", 8.0, 40.0),
        ("d1Og", "dog", 6.0, 21.0),
        ("b1^s_k1It", "biscuit", 3.0, 8.0),
    ]);
    let cohort = CohortId::new(AgeGroup::Six, SpeakerRole::Adult);
    assert_eq!(cohort.reference(), cohort);

    let table = derive::derive(
        cohort,
        &adults,
        &adults,
        &KlatteseShapes,
        &KlatteseSimilarity::default(),
    )
    .unwrap();

    for row in table.rows() {
        assert_eq!(row.pct_child, row.pct_adult, "{}", row.phon);
        assert_eq!(row.token_child, row.token_adult, "{}", row.phon);
    }
}
