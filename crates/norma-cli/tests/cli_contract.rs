use serde_json::Value;
use std::process::{Command, Output};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn norma(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_norma"))
        .args(args)
        .output()
        .expect("failed to execute norma")
}

fn json_stdout(output: &Output) -> Value {
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be JSON (stderr={}): {e}",
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

#[test]
fn predicates_lists_catalog_in_id_order() {
    let results = fixture("results.json");
    let out = json_stdout(&norma(&["predicates", "--results", &results, "--format", "json"]));
    let ids: Vec<u64> = out
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["id"].as_u64())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(out[0]["kind"], "obligation");
}

#[test]
fn count_reports_cascade_partitions() {
    let cascade = fixture("cascade/combined.json");
    let out = json_stdout(&norma(&["count", "--cascade", &cascade, "--format", "json"]));
    assert_eq!(out["models"], 3);
    assert_eq!(out["partitions"][0]["name"], "core_lease");
    assert_eq!(out["partitions"][1]["domain"], "range_1_5");
    assert_eq!(out["predicates"], 5);
}

// ---------------------------------------------------------------------------
// Consequences
// ---------------------------------------------------------------------------

#[test]
fn consequences_by_name_matches_worked_example() {
    let results = fixture("results.json");
    let out = json_stdout(&norma(&[
        "consequences",
        "give_keys",
        "--kind",
        "violation",
        "--results",
        &results,
        "--format",
        "json",
    ]));
    let report = &out["violation"];
    assert_eq!(report["total_fulfillment_scenarios"], 4);
    assert_eq!(report["total_violation_scenarios"], 1);
    let present: Vec<u64> = report["consequences"]
        .as_array()
        .expect("array")
        .iter()
        .filter(|c| c["classification"] == "always_present")
        .filter_map(|c| c["predicate_id"].as_u64())
        .collect();
    assert_eq!(present, vec![1, 3]);
    assert!(out.get("fulfillment").is_none());
}

#[test]
fn consequences_with_samples_lists_first_scenarios() {
    let results = fixture("results.json");
    let out = json_stdout(&norma(&[
        "consequences",
        "give_keys",
        "--kind",
        "violation",
        "--samples",
        "--sample-size",
        "2",
        "--results",
        &results,
        "--format",
        "json",
    ]));
    let samples = &out["samples"];
    assert_eq!(samples["target"], 2);
    let fulfillment = samples["fulfillment"].as_array().expect("array");
    assert_eq!(fulfillment.len(), 2);
    assert_eq!(fulfillment[0]["index"], 0);
    assert_eq!(fulfillment[1]["index"], 2);
    assert_eq!(samples["violation"][0]["model"], serde_json::json!([1, 3]));
    assert_eq!(samples["violation"].as_array().map(Vec::len), Some(1));
}

#[test]
fn consequences_without_samples_omits_them() {
    let results = fixture("results.json");
    let out = json_stdout(&norma(&[
        "consequences",
        "2",
        "--results",
        &results,
        "--format",
        "json",
    ]));
    assert!(out.get("samples").is_none());
    assert!(out.get("fulfillment").is_some());
}

#[test]
fn unknown_predicate_exits_with_error() {
    let results = fixture("results.json");
    let output = norma(&["consequences", "42", "--results", &results]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("predicate 42"), "stderr={stderr}");
}

#[test]
fn missing_input_is_rejected() {
    let output = norma(&["count"]);
    assert_eq!(output.status.code(), Some(1));
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[test]
fn partitioned_query_marks_addendum_not_applicable() {
    let vectors = fixture("vectors.txt");
    let out = json_stdout(&norma(&[
        "query",
        "[2]",
        "--by-partition",
        "--vectors",
        &vectors,
        "--format",
        "json",
    ]));
    assert_eq!(out["results"][0]["status"], "FULFILLED");
    assert_eq!(out["results"][0]["magic"], 7);
    assert_eq!(out["results"][1]["status"], "NOT_APPLICABLE");
    assert_eq!(out["aggregated_necessary_ids"], serde_json::json!([2]));
}

#[test]
fn responsibility_flags_void_partition() {
    let cascade = fixture("cascade/combined.json");
    let out = json_stdout(&norma(&[
        "responsibility",
        "install_panels",
        "--mode",
        "violates",
        "--cascade",
        &cascade,
        "--format",
        "json",
    ]));
    assert_eq!(out["target"], 4);
    assert_eq!(out["violates"]["critical_partitions"], serde_json::json!(["solar_addendum"]));
    assert!(out["fulfills"].is_null());
}

#[test]
fn query_subject_keeps_models_mentioning_the_party() {
    let cascade = fixture("cascade/combined.json");
    let out = json_stdout(&norma(&[
        "query-subject",
        "utility",
        "--cascade",
        &cascade,
        "--format",
        "json",
    ]));
    assert_eq!(out["matches"], serde_json::json!([[1, 4, 5]]));
}

// ---------------------------------------------------------------------------
// Team semantics
// ---------------------------------------------------------------------------

#[test]
fn split_failure_names_the_offending_model() {
    let results = fixture("results.json");
    let output = norma(&["split", "1", "3", "--results", &results]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[2]"), "stderr={stderr}");
}

#[test]
fn analyze_team_reports_worked_metrics() {
    let results = fixture("results.json");
    let out = json_stdout(&norma(&[
        "analyze-team",
        "[]",
        "--results",
        &results,
        "--format",
        "json",
    ]));
    assert_eq!(out["team_size"], 5);
    let two = out["variables"]
        .as_array()
        .expect("array")
        .iter()
        .find(|v| v["id"] == 2)
        .expect("id 2 is observed")
        .clone();
    assert_eq!(two["dependency"], 1);
    assert_eq!(two["fragility"], 1);
}

#[test]
fn compare_teams_and_simulate_attack() {
    let vectors = fixture("vectors.txt");
    let out = json_stdout(&norma(&[
        "compare-teams",
        "[1]",
        "[4]",
        "--vectors",
        &vectors,
        "--format",
        "json",
    ]));
    assert_eq!(out["advantage"], "CLAIMANT");
    assert_eq!(out["must_establish"], serde_json::json!([1]));
    assert_eq!(out["contested_models"], 2);

    let out = json_stdout(&norma(&[
        "simulate-attack",
        "[4]",
        "1",
        "--vectors",
        &vectors,
        "--format",
        "json",
    ]));
    assert_eq!(out["eliminated"], 2);
    assert_eq!(out["total_collapse"], false);
}

#[test]
fn text_output_is_default() {
    let results = fixture("results.json");
    let output = norma(&["vulnerability-scan", "[2]", "--results", &results]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Top vulnerabilities"), "stdout={stdout}");
}
