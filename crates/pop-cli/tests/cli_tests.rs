//! Integration tests for the pop CLI
//!
//! These tests invoke the actual pop-cli binary and verify:
//! - Exit codes (0 = success, 1 = conversion failure, 2 = I/O error)
//! - stdout/stderr output
//! - JSON output format

use std::path::PathBuf;
use std::process::Command;

// ── Helpers ───────────────────────────────────────────────

fn pop_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pop-cli"))
}

fn fixture_valid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(format!("../../tests/fixtures/valid/{}", name))
}

fn fixture_invalid(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(format!("../../tests/fixtures/invalid/{}", name))
}

fn run_pop(args: &[&str]) -> std::process::Output {
    Command::new(pop_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to execute pop-cli")
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_pop(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pop"), "should contain 'pop'");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "should contain version"
    );
}

#[test]
fn test_version_flag() {
    let output = run_pop(&["--version"]);
    assert!(output.status.success(), "--version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "should contain version"
    );
}

// ── Convert ───────────────────────────────────────────────

#[test]
fn test_convert_valid_file() {
    let output = run_pop(&[
        "convert",
        fixture_valid("mg-ni-tie-lines.pop").to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "valid file should exit 0: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    // Global symbol table first, then one record per equilibrium
    assert_eq!(json["records"].as_array().unwrap().len(), 3);
}

#[test]
fn test_convert_reports_skipped_on_stderr() {
    // The fixture carries a SET_CONDITION, which converts to nothing
    let output = run_pop(&[
        "convert",
        fixture_valid("mg-ni-tie-lines.pop").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipped"), "should report skipped commands");
    assert!(stderr.contains("SET_CONDITION"));
}

#[test]
fn test_convert_compact_is_one_line() {
    let output = run_pop(&[
        "convert",
        "--compact",
        fixture_valid("mg-ni-tie-lines.pop").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim().lines().count(), 1, "compact output is one line");
}

#[test]
fn test_convert_output_flag_writes_file() {
    let temp = std::env::temp_dir().join("pop_test_convert_output.json");
    let output = run_pop(&[
        "convert",
        fixture_valid("enthalpy-table.pop").to_str().unwrap(),
        "--output",
        temp.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "convert --output should exit 0");

    let written = std::fs::read_to_string(&temp).expect("read output file");
    let json: serde_json::Value = serde_json::from_str(&written).expect("should be valid JSON");
    let record = &json["records"][1];
    assert_eq!(record["table_values"].as_array().unwrap().len(), 3);
    assert!(record["symbols"].get("DGLIQ").is_some());

    let _ = std::fs::remove_file(&temp);
}

#[test]
fn test_convert_abbreviations_match_canonical_spellings() {
    let output = run_pop(&[
        "convert",
        "--compact",
        fixture_valid("abbreviated.pop").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    let record = &json["records"][1];
    assert_eq!(record["phases"]["FCC_A1"], 1.0);
    assert_eq!(record["label"][0], "AH1");
}

#[test]
fn test_convert_garbled_line_exits_one() {
    let output = run_pop(&[
        "convert",
        fixture_invalid("garbled-line.pop").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1), "garbled file should exit 1");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "should mention error");
    assert!(
        stderr.contains("THIS LINE IS NOT A POP COMMAND"),
        "should echo the offending line"
    );
}

#[test]
fn test_convert_unterminated_table_exits_one() {
    let output = run_pop(&[
        "convert",
        fixture_invalid("unterminated-table.pop").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TABLE_END"), "should name the missing terminator");
}

#[test]
fn test_convert_ambiguous_keyword_exits_one() {
    let output = run_pop(&[
        "convert",
        fixture_invalid("ambiguous-keyword.pop").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ambiguous"), "should mention ambiguity");
}

#[test]
fn test_convert_nonexistent_file_exits_two() {
    let output = run_pop(&["convert", "nonexistent.pop"]);
    assert_eq!(output.status.code(), Some(2), "missing file should exit 2");
}

// ── Check ─────────────────────────────────────────────────

#[test]
fn test_check_valid_file() {
    let output = run_pop(&[
        "check",
        fixture_valid("mg-ni-tie-lines.pop").to_str().unwrap(),
    ]);
    assert!(output.status.success(), "check of valid file should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 records"), "should count records");
}

#[test]
fn test_check_json_valid() {
    let output = run_pop(&[
        "check",
        "--json",
        fixture_valid("mg-ni-tie-lines.pop").to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["valid"], true);
    assert_eq!(json["records"], 3);
    assert_eq!(json["skipped"], 1);
}

#[test]
fn test_check_json_invalid() {
    let output = run_pop(&[
        "check",
        "--json",
        fixture_invalid("garbled-line.pop").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["valid"], false);
}

#[test]
fn test_check_nonexistent_file_exits_two() {
    let output = run_pop(&["check", "missing.pop"]);
    assert_eq!(output.status.code(), Some(2));
}

// ── All fixtures ──────────────────────────────────────────

#[test]
fn test_all_valid_fixtures_convert() {
    let valid_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/valid");
    for entry in std::fs::read_dir(&valid_dir).expect("read dir") {
        let path = entry.expect("entry").path();
        if path.extension().is_some_and(|e| e == "pop") {
            let output = run_pop(&["convert", path.to_str().unwrap()]);
            assert!(
                output.status.success(),
                "fixture {:?} should convert: stderr={}",
                path.file_name(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}

#[test]
fn test_all_invalid_fixtures_fail() {
    let invalid_dir =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/invalid");
    for entry in std::fs::read_dir(&invalid_dir).expect("read dir") {
        let path = entry.expect("entry").path();
        if path.extension().is_some_and(|e| e == "pop") {
            let output = run_pop(&["convert", path.to_str().unwrap()]);
            assert_eq!(
                output.status.code(),
                Some(1),
                "fixture {:?} should fail conversion",
                path.file_name()
            );
        }
    }
}

// ── Determinism: CLI output ───────────────────────────────

#[test]
fn test_convert_determinism_20_iterations() {
    let path = fixture_valid("enthalpy-table.pop")
        .to_str()
        .unwrap()
        .to_string();

    let first = run_pop(&["convert", "--compact", &path]);
    let first_stdout = String::from_utf8_lossy(&first.stdout).to_string();

    for i in 0..20 {
        let output = run_pop(&["convert", "--compact", &path]);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        assert_eq!(first_stdout, stdout, "determinism failure at iteration {}", i);
    }
}
