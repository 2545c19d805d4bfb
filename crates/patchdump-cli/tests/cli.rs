use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

use patchdump_core::FieldValue;
use patchdump_core::devices::{jp8080, ms2000};

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("patchdump"))
}

fn ms2000_dump() -> Vec<u8> {
    let mut patch = ms2000::blank_patch().expect("blank patch");
    assert!(patch.set(
        "identity",
        "name",
        FieldValue::Text("Cli Lead".to_string())
    ));
    ms2000::encode_program(&patch, 0).expect("encode program")
}

fn jp8080_dump() -> Vec<u8> {
    let mut patch = jp8080::blank_patch().expect("blank patch");
    assert!(patch.set(
        "identity",
        "name",
        FieldValue::Text("Cli Saw".to_string())
    ));
    jp8080::encode_patch(
        &patch,
        jp8080::DEFAULT_DEVICE_ID,
        jp8080::USER_PATCH_BASE,
    )
    .expect("encode patch")
}

#[test]
fn help_lists_subcommands() {
    let assert = cmd().arg("--help").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    assert!(stdout.contains("decode"));
    assert!(stdout.contains("encode"));
    assert!(stdout.contains("list"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.syx");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("--device")
        .arg("ms2000")
        .arg("--stdout")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn decode_stdout_outputs_json() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    let assert = cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["device"], "ms2000");
    assert_eq!(value["patches"].as_array().expect("patches").len(), 1);
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure();
}

#[test]
fn quiet_suppresses_the_summary_line() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    let output = temp.path().join("bank.json");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .arg("-o")
        .arg(&output)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
    assert!(output.exists());
}

#[test]
fn decode_then_encode_roundtrips_jp8080() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    let bank = temp.path().join("bank.json");
    let rebuilt = temp.path().join("rebuilt.syx");
    std::fs::write(&input, jp8080_dump()).expect("write dump");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("jp8080")
        .arg("-o")
        .arg(&bank)
        .assert()
        .success()
        .stderr(contains("OK: 1 patches decoded"));

    cmd()
        .arg("encode")
        .arg(&bank)
        .arg("--device")
        .arg("jp8080")
        .arg("-o")
        .arg(&rebuilt)
        .assert()
        .success();

    let stream = std::fs::read(&rebuilt).expect("read rebuilt");
    let decoded = jp8080::decode_sysex(&stream).expect("decode rebuilt");
    assert_eq!(decoded.patches.len(), 1);
    assert_eq!(decoded.patches[0].name(), Some("Cli Saw"));
}

#[test]
fn encode_rejects_mismatched_device() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    let bank = temp.path().join("bank.json");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .arg("-o")
        .arg(&bank)
        .assert()
        .success();

    cmd()
        .arg("encode")
        .arg(&bank)
        .arg("--device")
        .arg("jp8080")
        .arg("-o")
        .arg(temp.path().join("out.syx"))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("bank is for device 'ms2000'"));
}

#[test]
fn wrong_extension_is_rejected_with_hint() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.bin");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    cmd()
        .arg("decode")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format").and(contains(".syx")));
}

#[test]
fn list_prints_slot_and_name() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("dump.syx");
    std::fs::write(&input, ms2000_dump()).expect("write dump");

    cmd()
        .arg("list")
        .arg(&input)
        .arg("--device")
        .arg("ms2000")
        .assert()
        .success()
        .stdout(contains("A01").and(contains("Cli Lead")));
}
