use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::tempdir;

fn formpilot() -> Command {
    let mut cmd = Command::cargo_bin("formpilot").expect("formpilot binary is built");
    cmd.env_remove("RUST_LOG")
        .env_remove("FORMPILOT_CHROME")
        .env_remove("FORMPILOT_HEADLESS");
    cmd
}

#[test]
fn demo_prints_wire_report() -> Result<()> {
    let output = formpilot()
        .args(["--output", "json", "demo"])
        .output()?;
    assert!(
        output.status.success(),
        "demo failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["success"], Value::Bool(true));
    assert_eq!(report["failCount"], 0);
    assert_eq!(report["skipCount"], 2);
    let results = report["results"].as_array().expect("results array");
    assert_eq!(
        report["successCount"].as_u64().unwrap() + 2,
        results.len() as u64
    );
    Ok(())
}

#[test]
fn inspect_normalizes_synonyms() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("actions.json");
    fs::write(
        &path,
        r##"{ "actions": [
            { "action_type": "select_checkbox", "cssSelector": "#terms", "answer": true },
            { "actionType": "selectRadio", "target": "#plan-pro" }
        ] }"##,
    )?;

    let output = formpilot()
        .args(["--output", "json", "inspect", "--actions"])
        .arg(&path)
        .output()?;
    assert!(output.status.success());

    let entries: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        entries[0]["action"],
        serde_json::json!({ "type": "selectCheckbox", "selector": "#terms", "value": "true" })
    );
    assert_eq!(
        entries[1]["action"],
        serde_json::json!({ "type": "selectRadio", "selector": "#plan-pro" })
    );
    Ok(())
}

#[test]
fn inspect_fails_on_malformed_entries() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("actions.json");
    fs::write(
        &path,
        r##"[ { "type": "click", "selector": "#ok" }, { "selector": "#no-type" } ]"##,
    )?;

    let output = formpilot().arg("inspect").arg("--actions").arg(&path).output()?;
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#1   error: malformed action: action has no type"), "{stdout}");
    Ok(())
}

#[test]
fn missing_config_file_is_reported() {
    formpilot()
        .args(["--config", "/definitely/not/here.yaml", "demo"])
        .assert()
        .failure();
}
