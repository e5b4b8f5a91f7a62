#[allow(deprecated)]
fn cargo_bin() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("backfill_manifest").expect("binary not built")
}

fn with_required_args(startdate: &str, archive: &str) -> assert_cmd::Command {
    let mut cmd = cargo_bin();
    cmd.args([
        "--access-key-id",
        "AKIDEXAMPLE",
        "--secret-access-key",
        "secret",
        "--region",
        "eu-west-1",
        "--manifest-table-name",
        "run-manifest",
        "--startdate",
        startdate,
        "--enriched-archive",
        archive,
    ]);
    cmd
}

#[test]
fn malformed_startdate_prints_format_reminder_and_exits_one() {
    let assert = with_required_args("2024-01-01", "s3://archive/enriched/")
        .assert()
        .code(1);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(
        stdout,
        "--startdate must conform to %Y-%m-%d-%H-%M-%S format\n"
    );
}

#[test]
fn padded_or_leap_second_startdate_is_rejected() {
    for startdate in [" 2024-01-15-00-00-00", "2024-01-15-00-00-60"] {
        let assert = with_required_args(startdate, "s3://archive/enriched/")
            .assert()
            .code(1);
        let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
        assert!(stdout.starts_with("--startdate must conform to"));
    }
}

#[test]
fn missing_flag_is_a_usage_error() {
    let assert = cargo_bin()
        .args(["--access-key-id", "AKIDEXAMPLE", "--startdate", "2024-01-01-00-00-00"])
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("--manifest-table-name"));
    assert!(stderr.contains("Usage"));
}

#[test]
fn archive_without_s3_scheme_is_rejected_by_parser() {
    let assert = with_required_args("2024-01-01-00-00-00", "/local/archive")
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("invalid archive location"));
}

#[test]
fn aws_prefixed_credential_flags_are_accepted() {
    // Reaches the startdate check, so every flag parsed.
    cargo_bin()
        .args([
            "--aws-access-key-id",
            "AKIDEXAMPLE",
            "--aws-secret-access-key",
            "secret",
            "--region",
            "eu-west-1",
            "--manifest-table-name",
            "run-manifest",
            "--startdate",
            "yesterday",
            "--enriched-archive",
            "s3://archive/enriched/",
        ])
        .assert()
        .code(1);
}
