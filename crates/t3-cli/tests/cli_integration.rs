//! Integration tests for the `t3dump` binary.
//!
//! Each test writes images with `t3_image::ImageWriter` into a scratch
//! directory and runs the built binary against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use t3_image::header::HEADER_PADDING;
use t3_image::writer::DEFAULT_TIMESTAMP;
use t3_image::{EntryPoint, ImageWriter, PayloadWriter, IMAGE_VERSION, SIGNATURE};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("t3dump-test-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write failed");
    path
}

fn t3dump(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_t3dump"))
        .args(args)
        .env_remove("T3_LOG")
        .output()
        .expect("failed to run t3dump")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn sample_image() -> Vec<u8> {
    let mut w = ImageWriter::with_header();
    w.entry_point(
        &EntryPoint {
            code_offset: 0x40,
            method_header_size: 10,
            exception_entry_size: 16,
            line_entry_size: 10,
            debug_header_size: 6,
            local_symbol_header_size: 4,
            debug_version: 2,
            debug_frame_size: 4,
        },
        true,
    );
    w.metaclasses(&[("tads-object/030005", vec![1, 2]), ("list", vec![])]);
    w.function_sets(&["t3vm/010006"]);
    w.objects(0, 0, &[(1, vec![0; 8]), (2, vec![0; 4])]);
    w.eof();
    w.into_bytes()
}

/// Header padding carries data and the OBJS block has three trailing bytes
fn sloppy_image() -> Vec<u8> {
    let mut objs = PayloadWriter::new();
    objs.emit_u16(1);
    objs.emit_u16(0);
    objs.emit_u16(0);
    objs.emit_u32(5);
    objs.emit_u16(2);
    objs.emit_bytes(&[0xAA, 0xBB]);
    objs.emit_bytes(&[0; 3]);

    let mut w = ImageWriter::new();
    w.emit_raw(&SIGNATURE)
        .emit_raw(&IMAGE_VERSION.to_le_bytes())
        .emit_raw(&[0x20; HEADER_PADDING])
        .emit_raw(DEFAULT_TIMESTAMP);
    w.block("OBJS", 0, &objs.into_bytes());
    w.eof();
    w.into_bytes()
}

// ────────────────────────────────────────────────────────────────────────────
// info
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_info_json() {
    let dir = scratch_dir("info-json");
    let path = write_file(&dir, "game.t3", &sample_image());

    let output = t3dump(&["info", path.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "info failed: {:?}", output);

    let summary: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("info --json printed invalid JSON");
    assert_eq!(summary["version"], 1);
    assert_eq!(summary["objects"], 2);
    assert_eq!(summary["transient_objects"], 0);
    assert_eq!(summary["blocks"], 5);
    assert_eq!(summary["entry_point"]["code_offset"], 0x40);
    assert_eq!(
        summary["metaclasses"],
        serde_json::json!(["tads-object/030005", "list"])
    );
    assert_eq!(summary["function_sets"], serde_json::json!(["t3vm/010006"]));

    let _ = std::fs::remove_dir_all(&dir);
}

// ────────────────────────────────────────────────────────────────────────────
// check
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_check_fails_on_bad_signature() {
    let dir = scratch_dir("check-signature");
    let good = write_file(&dir, "good.t3", &sample_image());
    let mut bytes = sample_image();
    bytes[0] = b'X';
    let bad = write_file(&dir, "bad.t3", &bytes);

    let output = t3dump(&["check", good.to_str().unwrap(), bad.to_str().unwrap()]);
    assert!(!output.status.success());

    let text = stdout(&output);
    assert!(text.contains(&format!("ok    {}", good.display())), "{}", text);
    assert!(text.contains(&format!("FAIL  {}", bad.display())), "{}", text);
    assert!(text.contains("Invalid signature"), "{}", text);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_check_missing_file() {
    let dir = scratch_dir("check-missing");
    let missing = dir.join("absent.t3");

    let output = t3dump(&["check", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("Failed to read"));

    let _ = std::fs::remove_dir_all(&dir);
}

// ────────────────────────────────────────────────────────────────────────────
// Loader options: --config file merged with flags
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_file_combined_with_strict_flag() {
    let dir = scratch_dir("config-strict");
    let image = write_file(&dir, "sloppy.t3", &sloppy_image());
    let config = write_file(&dir, "t3dump.toml", b"allow_header_noise = true\n");
    let image = image.to_str().unwrap();
    let config = config.to_str().unwrap();

    // Header noise is rejected by default
    let output = t3dump(&["check", image]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("null padding"));

    // The config file accepts the noise; trailing OBJS bytes only warn
    let output = t3dump(&["--config", config, "check", image]);
    assert!(output.status.success(), "{:?}", output);

    // --strict adds to the config file instead of replacing it
    let output = t3dump(&["--config", config, "--strict", "check", image]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("left 3 bytes unread"), "{}", text);
    assert!(!text.contains("null padding"), "{}", text);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_config_file_with_unknown_key() {
    let dir = scratch_dir("config-unknown");
    let image = write_file(&dir, "game.t3", &sample_image());
    let config = write_file(&dir, "t3dump.toml", b"strict = true\n");

    let output = t3dump(&[
        "--config",
        config.to_str().unwrap(),
        "check",
        image.to_str().unwrap(),
    ]);
    assert!(!output.status.success());

    let _ = std::fs::remove_dir_all(&dir);
}

// ────────────────────────────────────────────────────────────────────────────
// pools
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pools_lists_only_loaded_pages() {
    let dir = scratch_dir("pools-huge");
    let mut w = ImageWriter::with_header();
    w.pool_definition(0, u32::MAX, 16);
    w.pool_page(0, 3, 0, &[0; 16]);
    w.eof();
    let path = write_file(&dir, "pools.t3", &w.into_bytes());

    let output = t3dump(&["pools", path.to_str().unwrap()]);
    assert!(output.status.success(), "{:?}", output);

    let text = stdout(&output);
    assert_eq!(text.lines().count(), 2, "{}", text);
    assert!(text.contains("(1 loaded, 4294967294 missing)"), "{}", text);
    assert!(text.contains("page     3:     16 bytes"), "{}", text);

    let _ = std::fs::remove_dir_all(&dir);
}
