#![cfg(all(unix, feature = "cli"))]

use std::process::{Command, Output};

const SETTINGS_ENV: [&str; 6] = [
    "ASTRONODE_VARIANT",
    "ASTRONODE_PORT",
    "ASTRONODE_BAUD",
    "ASTRONODE_TIMEOUT",
    "ASTRONODE_INTER_BYTE_TIMEOUT",
    "ASTRONODE_MAX_BYTES",
];

fn astroframe(args: &[&str]) -> Output {
    astroframe_with_env(args, &[])
}

fn astroframe_with_env(args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_astroframe"));
    cmd.args(["--log-level", "error"]).args(args);
    for name in SETTINGS_ENV {
        cmd.env_remove(name);
    }
    cmd.envs(vars.iter().copied());
    cmd.output().expect("astroframe should run")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be one JSON document")
}

#[test]
fn frame_config_write_prints_raw_frame() {
    let output = astroframe(&[
        "--format",
        "json",
        "frame",
        "config-write",
        "--payload",
        "00",
    ]);

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["variant"], "raw");
    assert_eq!(doc["operation"], "CFG_WR");
    assert_eq!(doc["frame"], "7f05010000b50f");
    assert_eq!(doc["frame_size"], 7);
}

#[test]
fn frame_legacy_fake_alarm_is_ascii_between_delimiters() {
    let output = astroframe(&[
        "--variant",
        "legacy",
        "--format",
        "raw",
        "frame",
        "fake-alarm",
    ]);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"\x0201035d1e\x03");
}

#[test]
fn variant_can_come_from_environment() {
    let output = astroframe_with_env(
        &["--format", "json", "frame", "config-read"],
        &[("ASTRONODE_VARIANT", "legacy")],
    );

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["variant"], "legacy");
}

#[test]
fn frame_geolocation_uses_longitude_first_in_raw() {
    let output = astroframe(&[
        "--format",
        "json",
        "frame",
        "geo",
        "--lat",
        "46.534363896181624",
        "--lon",
        "6.578710272772917",
    ]);

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output)["frame"],
        "7f350800ded4eb039694bc1bdcdb"
    );
}

#[test]
fn frame_enqueue_with_explicit_id() {
    let output = astroframe(&[
        "--format",
        "json",
        "frame",
        "enqueue",
        "--id",
        "0x1234",
        "--data",
        "Hello world",
    ]);

    assert!(output.status.success());
    assert_eq!(
        json_stdout(&output)["frame"],
        "7f250d00341248656c6c6f20776f726c64b688"
    );
}

#[test]
fn frame_set_rtc_at_fixed_time() {
    let output = astroframe(&[
        "--format",
        "json",
        "frame",
        "set-rtc",
        "--at",
        "2024-03-05T12:30:45Z",
    ]);

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["operation"], "DBG set-rtc");
    assert_eq!(doc["frame"], "7f0107001803050c1e2dcad1");
}

#[test]
fn unsupported_opcode_exits_with_usage() {
    let output = astroframe(&["frame", "raw", "--opcode", "0x99"]);

    assert_eq!(output.status.code(), Some(64));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("0x99"), "stderr: {stderr}");
}

#[test]
fn wrong_payload_size_exits_with_data_invalid() {
    let output = astroframe(&["frame", "raw", "--opcode", "CFG_RR", "--payload", "00"]);

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn out_of_range_latitude_exits_with_data_invalid() {
    let output = astroframe(&["frame", "geo", "--lat", "91", "--lon", "0"]);

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_splits_raw_response() {
    let output = astroframe(&["--format", "json", "decode", "7fa502003412750e"]);

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["opcode"], "a5");
    assert_eq!(doc["param"], "0200");
    assert_eq!(doc["payload"], "3412");
}

#[test]
fn decode_legacy_response_accepts_spaced_hex() {
    let output = astroframe(&[
        "--variant",
        "legacy",
        "--format",
        "json",
        "decode",
        "02 61 35 33 34 31 32 64 32 36 31 03",
    ]);

    assert!(output.status.success());
    let doc = json_stdout(&output);
    assert_eq!(doc["opcode"], "a5");
    assert!(doc["param"].is_null());
    assert_eq!(doc["payload"], "3412");
}

#[test]
fn decode_reports_crc_mismatch() {
    let output = astroframe(&["decode", "7fa502003412750f"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("crc"), "stderr: {stderr}");
}

#[test]
fn send_to_missing_port_fails_before_writing() {
    let output = astroframe(&[
        "send",
        "--port",
        "/dev/astroframe-missing-port",
        "--timeout",
        "100ms",
        "config-read",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn send_rejects_bad_request_without_opening_port() {
    let output = astroframe(&[
        "send",
        "--port",
        "/dev/astroframe-missing-port",
        "raw",
        "--opcode",
        "0x99",
    ]);

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn max_bytes_can_come_from_environment() {
    let args = [
        "send",
        "--port",
        "/dev/astroframe-missing-port",
        "config-read",
    ];

    let output = astroframe_with_env(&args, &[("ASTRONODE_MAX_BYTES", "0")]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--max-bytes"), "stderr: {stderr}");

    let output = astroframe_with_env(&args, &[("ASTRONODE_MAX_BYTES", "32")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn inter_byte_timeout_can_come_from_environment() {
    let args = [
        "send",
        "--port",
        "/dev/astroframe-missing-port",
        "config-read",
    ];

    let output = astroframe_with_env(&args, &[("ASTRONODE_INTER_BYTE_TIMEOUT", "soon")]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid duration value: soon"),
        "stderr: {stderr}"
    );

    let output = astroframe_with_env(&args, &[("ASTRONODE_INTER_BYTE_TIMEOUT", "5ms")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn command_line_overrides_environment() {
    let output = astroframe_with_env(
        &[
            "send",
            "--port",
            "/dev/astroframe-missing-port",
            "--max-bytes",
            "16",
            "config-read",
        ],
        &[("ASTRONODE_MAX_BYTES", "0")],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_prints_package_version() {
    let output = astroframe(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("astroframe {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_reports_build_profile() {
    let output = astroframe(&["version", "--extended"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let profile = stdout
        .lines()
        .find_map(|line| line.strip_prefix("profile: "))
        .expect("profile line");
    assert!(["debug", "release"].contains(&profile), "stdout: {stdout}");
    assert!(stdout.contains("variants: legacy, raw"));
}
