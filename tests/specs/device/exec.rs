//! Running operations through the gate

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn exec_prints_result() {
    let temp = Project::empty();

    temp.dg()
        .args(&["exec", "add", "1", "s:2"])
        .passes()
        .stdout_has("add = 3")
        .stdout_has("shape:     [1, 1, 32, 32]")
        .stdout_has("dtype:     bfloat16");
}

#[test]
fn exec_json_output() {
    let temp = Project::empty();

    let run = temp
        .dg()
        .args(&["-o", "json", "exec", "multiply", "1.5", "-2", "--shape", "2,8"])
        .passes();
    let json = run.json();

    assert_eq!(json["operation"], json!("multiply"));
    assert_eq!(json["value"], json!(-3.0));
    assert_eq!(json["shape"], json!([2, 8]));
    assert_eq!(json["sample_values"].as_array().unwrap().len(), 10);
    assert!(json["request_id"].as_str().is_some());
}

#[test]
fn exec_unknown_operation_fails() {
    let temp = Project::empty();

    temp.dg()
        .args(&["exec", "frobnicate", "1"])
        .fails()
        .stderr_has("Operation \"frobnicate\" not found");
}

#[test]
fn exec_wrong_arity_fails() {
    let temp = Project::empty();

    temp.dg()
        .args(&["exec", "add", "1"])
        .fails()
        .stderr_has("add takes 2 input(s), got 1");
}

#[test]
fn failed_request_still_counts_and_closes() {
    let temp = Project::empty();
    temp.dg().args(&["exec", "add", "1"]).fails();
    temp.dg().args(&["exec", "add", "1", "2"]).passes();

    let stats = temp.dg().args(&["-o", "json", "stats"]).passes().json();
    assert_eq!(stats["total_requests"], json!(2));
    assert_eq!(stats["currently_waiting"], json!(0));
    assert_eq!(stats["close_failures"], json!(0));

    let device = temp
        .dg()
        .args(&["-o", "json", "device", "status"])
        .passes()
        .json();
    assert_eq!(device["opens"], json!(2));
    assert_eq!(device["closes"], json!(2));
    assert_eq!(device["open"], json!(false));
}

#[test]
fn concurrent_clients_are_all_served() {
    let temp = Project::with_config("[device]\nopen_latency = \"100ms\"\n");
    temp.dg().args(&["daemon", "start"]).passes();

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let builder = temp.dg().args(&["exec", "add", &i.to_string(), "1"]);
            std::thread::spawn(move || builder.passes().stdout())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().contains("add = "));
    }

    let stats = temp.dg().args(&["-o", "json", "stats"]).passes().json();
    assert_eq!(stats["total_requests"], json!(3));
    assert_eq!(stats["currently_waiting"], json!(0));

    let device = temp
        .dg()
        .args(&["-o", "json", "device", "status"])
        .passes()
        .json();
    assert_eq!(device["opens"], json!(3));
    assert_eq!(device["closes"], json!(3));
}

#[test]
fn stats_text_output() {
    let temp = Project::empty();
    temp.dg().args(&["exec", "relu", "-1"]).passes();

    temp.dg()
        .args(&["stats"])
        .passes()
        .stdout_has("total_requests:    1")
        .stdout_has("currently_waiting: 0")
        .stdout_has("max_wait_time:")
        .stdout_has("close_failures:    0");
}

#[test]
fn stats_json_output() {
    let temp = Project::empty();
    temp.dg().args(&["exec", "relu", "-1"]).passes();
    temp.dg().args(&["exec", "unknown_op", "1"]).fails();

    let stats = temp.dg().args(&["-o", "json", "stats"]).passes().json();
    assert_eq!(stats["total_requests"], json!(2));
    assert_eq!(stats["currently_waiting"], json!(0));
    assert_eq!(stats["close_failures"], json!(0));
    assert!(
        stats["max_wait_time_seconds"].is_f64(),
        "max_wait_time_seconds missing: {stats}"
    );
    assert!(stats.get("max_wait_time").is_none());
}
