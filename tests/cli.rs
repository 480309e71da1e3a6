use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn scorecard(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scorecard").unwrap();
    cmd.env("HOME", home).env("RUST_LOG", "off");
    cmd
}

fn setup(home: &Path) -> std::path::PathBuf {
    let data = home.join("data");
    scorecard(home)
        .args(["init", "--data-dir"])
        .arg(&data)
        .args(["--ro-code", "4000", "--ro-name", "RO Madurai"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized scorecard"));

    std::fs::write(
        data.join("branches.csv"),
        "Branch Code,Branch Name,Region Code\n0174,Theni,R1\n0201,Madurai,R2\n4000,RO Madurai,R1\n",
    )
    .unwrap();
    let ds = data.join("datasets");
    std::fs::write(
        ds.join("key_params.csv"),
        "SOL,Savings Bank,Current Deposits,Term Deposits,Advances\n0174,1,0.5,2,3\n4000,100,100,100,100\n",
    )
    .unwrap();
    std::fs::write(
        ds.join("sanctions.json"),
        r#"[
            {"SOL": "174", "Scheme Code": "HL1", "Sector": "RETAIL", "Sanction Amount": "2,00,000"},
            {"SOL": "999", "Scheme Code": "HL1", "Sector": "RETAIL", "Sanction Amount": 100000}
        ]"#,
    )
    .unwrap();
    data
}

fn report_json(home: &Path, extra: &[&str]) -> Vec<Value> {
    let out = scorecard(home)
        .args(["report", "--date", "31-03-2025", "--json"])
        .args(extra)
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn test_report_consolidates_datasets() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    scorecard(home.path())
        .args(["schemes", "add", "housing", "HL1"])
        .assert()
        .success();

    let rows = report_json(home.path(), &[]);
    // totals + 174, 201, 999, 4000
    assert_eq!(rows.len(), 5);

    let totals = &rows[0];
    assert_eq!(totals["sNo"], 0);
    assert_eq!(totals["branchName"], "RO Madurai");
    assert_eq!(totals["isTotal"], true);
    // RO's own figures stay out of the totals: only Theni's 1 crore SB.
    assert_eq!(totals["metrics"]["sb"], 1.0);

    let codes: Vec<&str> = rows[1..].iter().map(|r| r["branchCode"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["174", "201", "999", "4000"]);

    let theni = &rows[1];
    assert_eq!(theni["reportDate"], "31-03-2025");
    assert_eq!(theni["metrics"]["casa"], 150.0);
    assert_eq!(theni["metrics"]["business"], 650.0);
    assert_eq!(theni["metrics"]["schemes"]["housing"], 2.0);
    assert_eq!(theni["metrics"]["coreRetail"], 2.0);

    let synthetic = &rows[3];
    assert_eq!(synthetic["branchName"], "Branch 999");
    assert_eq!(synthetic["metrics"]["schemes"]["housing"], 1.0);
}

#[test]
fn test_report_region_scope() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    let rows = report_json(home.path(), &["--region", "R2"]);
    let codes: Vec<&str> = rows[1..].iter().map(|r| r["branchCode"].as_str().unwrap()).collect();
    // 201 is seeded; 174, 999 and 4000 arrive through data rows.
    assert_eq!(codes, vec!["174", "201", "999", "4000"]);

    let data = home.path().join("data");
    std::fs::remove_file(data.join("datasets").join("key_params.csv")).unwrap();
    std::fs::remove_file(data.join("datasets").join("sanctions.json")).unwrap();
    let rows = report_json(home.path(), &["--region", "R2"]);
    let codes: Vec<&str> = rows[1..].iter().map(|r| r["branchCode"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["201"]);
}

#[test]
fn test_report_table_and_export() {
    let home = tempfile::tempdir().unwrap();
    let data = setup(home.path());
    let out = data.join("out.csv");
    scorecard(home.path())
        .args(["report", "--date", "31-03-2025", "--export"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Branch Scorecard as on 31-03-2025"))
        .stdout(predicate::str::contains("Theni"));
    let csv = std::fs::read_to_string(&out).unwrap();
    assert_eq!(csv.lines().count(), 6);
    assert!(csv.lines().nth(1).unwrap().contains("RO Madurai"));
}

#[test]
fn test_report_default_export_path() {
    let home = tempfile::tempdir().unwrap();
    let data = setup(home.path());
    scorecard(home.path())
        .args(["report", "--date", "31-03-2025", "--export"])
        .assert()
        .success();
    assert!(data.join("exports").join("scorecard-31-03-2025.csv").exists());
}

#[test]
fn test_schemes_unknown_category_fails() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    scorecard(home.path())
        .args(["schemes", "add", "lottery", "X1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown scheme category: lottery"));
}

#[test]
fn test_schemes_add_list_remove() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    scorecard(home.path())
        .args(["schemes", "add", "agriJl", "JL1", "JL2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 code(s) to agriJl."));
    scorecard(home.path())
        .args(["schemes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JL1, JL2"));
    scorecard(home.path())
        .args(["schemes", "remove", "agriJl", "JL1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 code(s) from agriJl."));
}

#[test]
fn test_branches_and_status() {
    let home = tempfile::tempdir().unwrap();
    setup(home.path());
    scorecard(home.path())
        .args(["branches", "--region", "R1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theni"))
        .stdout(predicate::str::contains("Madurai").and(predicate::str::contains("2 branch(es)")));
    scorecard(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("RO code:    4000"))
        .stdout(predicate::str::contains("key_params.csv"))
        .stdout(predicate::str::contains("\u{2014}").not());
}

#[test]
fn test_float_branch_codes_merge_with_integer_codes() {
    let home = tempfile::tempdir().unwrap();
    let data = setup(home.path());
    std::fs::write(
        data.join("datasets").join("cash.json"),
        r#"[{"SOL": 174.0, "Total Cash": 5}, {"SOL": 174, "Total Cash": 1}]"#,
    )
    .unwrap();
    let rows = report_json(home.path(), &[]);
    let theni: Vec<&Value> = rows.iter().filter(|r| r["branchCode"] == "174").collect();
    assert_eq!(theni.len(), 1);
    assert_eq!(theni[0]["metrics"]["totalCash"], 6.0);
}

#[test]
fn test_report_ignores_junk_explicit_totals() {
    let home = tempfile::tempdir().unwrap();
    let data = setup(home.path());
    std::fs::write(
        data.join("datasets").join("key_params.csv"),
        "SOL,Savings Bank,Term Deposits,Advances,Deposits,Business\n174,1,2,3,n/a,-\n",
    )
    .unwrap();
    let rows = report_json(home.path(), &[]);
    assert_eq!(rows[0]["metrics"]["totalDeposits"], 3.0);
    assert_eq!(rows[0]["metrics"]["business"], 6.0);
    assert_eq!(rows[1]["metrics"]["totalDeposits"], 300.0);
    assert_eq!(rows[1]["metrics"]["business"], 600.0);
}

#[test]
fn test_malformed_dataset_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let data = setup(home.path());
    std::fs::write(data.join("datasets").join("cash.json"), "{not json").unwrap();
    scorecard(home.path())
        .args(["report", "--date", "31-03-2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Could not read"));
}
