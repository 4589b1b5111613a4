//! Device status, reset and catalog

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn device_status_shows_idle_device() {
    let temp = Project::empty();

    temp.dg()
        .args(&["device", "status"])
        .passes()
        .stdout_has("Device 0 (simulated, simulated)")
        .stdout_has("held by:  -")
        .stdout_has("open:     false");
}

#[test]
fn device_reset_goes_through_the_gate() {
    let temp = Project::empty();

    temp.dg()
        .args(&["device", "reset"])
        .passes()
        .stdout_has("Device reset")
        .stdout_has("device 0 reset");

    let stats = temp.dg().args(&["-o", "json", "stats"]).passes().json();
    assert_eq!(stats["total_requests"], json!(1));
}

#[test]
fn device_info_shows_machine() {
    let temp = Project::empty();

    temp.dg()
        .args(&["device", "info"])
        .passes()
        .stdout_has("simulated-n150 (device 0)");
}

#[test]
fn device_software_needs_a_checkout() {
    let temp = Project::empty();

    temp.dg()
        .args(&["device", "software"])
        .fails()
        .stderr_has("no software_dir configured");
}

#[test]
fn ops_lists_catalog_and_params() {
    let temp = Project::empty();

    temp.dg()
        .args(&["ops"])
        .passes()
        .stdout_has("Pointwise Unary")
        .stdout_has("Pointwise Binary")
        .stdout_has("Pointwise Ternary")
        .stdout_has("addalpha")
        .stdout_has("--param2 value=0");
}

#[test]
fn ops_json_is_structured() {
    let temp = Project::empty();

    let json = temp.dg().args(&["-o", "json", "ops"]).passes().json();
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0]["category"], json!("Pointwise Unary"));
    assert!(json["params"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["operation"] == "prelu" && p["default"] == 0.25));
}
