use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use archive_listing::{ArchiveLocation, InMemoryRunLister};
use manifest_backfill::{Backfill, BackfillConfig, BackfillError, Clock, TOOL_VERSION};
use manifest_store::{InMemoryManifestStore, ManifestRecord};
use run_classifier::{CutoffDate, RunIdentifier};
use serde::Deserialize;

const NOW: i64 = 1_717_200_000;

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    cutoff: String,
    archive: Vec<RunIdentifier>,
    existing: Vec<RunIdentifier>,
    expect: Expectation,
}

#[derive(Debug, Deserialize)]
struct Expectation {
    inserted: Vec<RunIdentifier>,
    added: usize,
    skipped: usize,
    already_present: usize,
}

struct FixedClock;

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> i64 {
        NOW
    }
}

fn load_scenarios() -> Vec<Scenario> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scenarios.json");
    let content = fs::read_to_string(path).expect("missing scenarios fixture");
    serde_json::from_str(&content).expect("invalid scenarios fixture")
}

fn archive() -> ArchiveLocation {
    "s3://snowplow-archive/enriched/archive".parse().unwrap()
}

fn seeded_store(existing: &[RunIdentifier]) -> InMemoryManifestStore {
    InMemoryManifestStore::with_records(existing.iter().map(|run_id| ManifestRecord {
        run_id: run_id.clone(),
        added_by: "pipeline".into(),
        added_at: 1,
        to_skip: false,
    }))
}

#[tokio::test]
async fn fixture_scenarios_match_expected_reports() {
    for scenario in load_scenarios() {
        let store = seeded_store(&scenario.existing);
        let lister = InMemoryRunLister::new(scenario.archive.clone()).with_page_size(1);
        let cutoff = CutoffDate::parse(&scenario.cutoff).expect("fixture cutoff");
        let backfill = Backfill::new(
            Arc::new(lister),
            Arc::new(store.clone()),
            BackfillConfig::new(cutoff),
        )
        .with_clock(Arc::new(FixedClock));

        let report = backfill
            .run(&archive())
            .await
            .unwrap_or_else(|err| panic!("{}: {err}", scenario.name));

        assert_eq!(report.added, scenario.expect.added, "{}", scenario.name);
        assert_eq!(report.skipped, scenario.expect.skipped, "{}", scenario.name);
        assert_eq!(
            report.already_present, scenario.expect.already_present,
            "{}",
            scenario.name
        );
        let expected_puts: Vec<ManifestRecord> = scenario
            .expect
            .inserted
            .iter()
            .map(|run_id| ManifestRecord::skip(run_id.clone(), TOOL_VERSION, NOW))
            .collect();
        assert_eq!(store.puts(), expected_puts, "{}", scenario.name);
    }
}

#[tokio::test]
async fn existing_record_is_not_overwritten() {
    let january = RunIdentifier::new("2024-01-01-00-00-00/");
    let store = seeded_store(std::slice::from_ref(&january));
    let lister = InMemoryRunLister::new(["2024-01-01-00-00-00/", "2024-02-01-00-00-00/"]);
    let backfill = Backfill::new(
        Arc::new(lister),
        Arc::new(store.clone()),
        BackfillConfig::new(CutoffDate::parse("2024-01-15-00-00-00").unwrap()),
    );

    backfill.run(&archive()).await.unwrap();

    let record = store.record(&january).unwrap();
    assert_eq!(record.added_by, "pipeline");
    assert!(!record.to_skip);
}

#[tokio::test]
async fn malformed_run_id_aborts_without_report() {
    let store = InMemoryManifestStore::new();
    let lister = InMemoryRunLister::new(["2024-01-01-00-00-00/", "not-a-run-id"]);
    let backfill = Backfill::new(
        Arc::new(lister),
        Arc::new(store.clone()),
        BackfillConfig::new(CutoffDate::parse("2024-01-15-00-00-00").unwrap()),
    )
    .with_clock(Arc::new(FixedClock));

    let err = backfill.run(&archive()).await.unwrap_err();

    assert!(matches!(err, BackfillError::Format(ref format) if format.identifier == "not-a-run-id"));
    assert_eq!(store.puts().len(), 1);
}
