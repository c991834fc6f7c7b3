//! End-to-end runs of the `print-quote` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use mesh_io::save_stl;
use mesh_types::cube;

fn print_quote(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_print-quote"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn price_command_prints_quote() {
    let output = print_quote(&["price", "--volume-cm3", "100", "-m", "PLA", "-i", "40"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("68.75 g"), "{text}");
    assert!(text.contains("10.31 EUR"), "{text}");
}

#[test]
fn price_command_json() {
    let output = print_quote(&[
        "price",
        "--volume-cm3",
        "10",
        "-m",
        "PETG",
        "-i",
        "15",
        "--json",
    ]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["price_eur_rounded"], 5.0);
    assert_eq!(value["minimum_applied"], true);
}

#[test]
fn unknown_material_fails() {
    let output = print_quote(&["price", "--volume-cm3", "10", "-m", "ABS", "-i", "40"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown material"), "{stderr}");
}

#[test]
fn quote_command_reads_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.stl");
    save_stl(&cube(20.0), &path).unwrap();

    let output = print_quote(&["quote", path.to_str().unwrap(), "-m", "PC", "-i", "100"]);
    assert!(output.status.success());
    // 8 cm³ * 1.20 * 1.15 = 11.04 g
    assert!(stdout(&output).contains("11.04 g"));
}

#[test]
fn quote_command_reads_stdin() {
    let mut bytes = Vec::new();
    mesh_io::write_stl(&cube(10.0), &mut bytes).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_print-quote"))
        .args(["quote", "-", "-m", "PLA", "-i", "40", "--format", "stl", "--json"])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&bytes).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let volume = value["volume_cm3"].as_f64().unwrap();
    assert!((volume - 1.0).abs() < 1e-9, "{volume}");
}

#[test]
fn open_mesh_fails_with_geometry_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("open.stl");
    let mut mesh = cube(10.0);
    mesh.faces.pop();
    save_stl(&mesh, &path).unwrap();

    let output = print_quote(&["quote", path.to_str().unwrap(), "-m", "PLA", "-i", "40"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid geometry"), "{stderr}");
}

#[test]
fn config_replaces_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("quote.json");
    std::fs::write(
        &config,
        r#"{ "materials": { "TPU": { "price_per_gram": 0.35, "density_g_per_cm3": 1.21 } } }"#,
    )
    .unwrap();

    let output = print_quote(&["materials", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("TPU"));
    assert!(!text.contains("PLA"));
}
