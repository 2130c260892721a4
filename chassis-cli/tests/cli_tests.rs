//! Integration tests for the Chassis CLI.
//!
//! These tests invoke the `chassis` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn chassis() -> Command {
    Command::cargo_bin("chassis").unwrap()
}

/// Helper: assemble `text` into a temporary bytecode file.
fn assemble_to_temp(dir: &TempDir, text: &str) -> PathBuf {
    let input = dir.path().join("prog.asm");
    let output = dir.path().join("prog.bin");
    fs::write(&input, text).unwrap();
    chassis()
        .args([
            "assemble",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    output
}

fn write_temp(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ---- Usage ----

#[test]
fn no_args_is_a_usage_error() {
    chassis()
        .assert()
        .failure()
        .code(64)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_exits_0() {
    chassis()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("disassemble"));
}

#[test]
fn unknown_command_exits_64() {
    chassis().arg("frobnicate").assert().failure().code(64);
}

// ---- Run ----

#[test]
fn run_exits_with_r0() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "MOVI r0, 5\nMOVI r1, 3\nADD r0, r1\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(8);
}

#[test]
fn run_reports_fault_code() {
    let dir = TempDir::new().unwrap();
    let bin = write_temp(&dir, "bad.bin", &[0xFE, 0x60]);
    chassis()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("panic: Invalid opcode at pc 0x0001"));
}

#[test]
fn run_stack_underflow() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "POP r0\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Stack underflow"));
}

#[test]
fn run_seeds_data_from_file() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "LOADBI r0, 2\nHLT\n");
    let data = write_temp(&dir, "seed.dat", &[1, 2, 33]);
    chassis()
        .args([
            "run",
            bin.to_str().unwrap(),
            "--data",
            data.to_str().unwrap(),
        ])
        .assert()
        .code(33);
}

#[test]
fn run_honours_data_size() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "STORBI 0x08, 1\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap(), "--data-size", "8"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Data section exceeded bounds"));
}

#[test]
fn run_honours_declared_size() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "NOP\nNOP\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap(), "--size", "1"])
        .assert()
        .code(3);
}

#[test]
fn run_conout_prints_to_stdout() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "STORDI 0, 0x0a6b6f\nCONOUT 0\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn run_passthru_faults_unless_skipped() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "PASSTHRU 0x90 0x90\nMOVI r0, 7\nHLT\n");
    chassis()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(1);
    chassis()
        .args(["run", bin.to_str().unwrap(), "--skip-passthru"])
        .assert()
        .code(7);
}

#[test]
fn run_missing_file_exits_64() {
    chassis()
        .args(["run", "/nonexistent/prog.bin"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("cannot read"));
}

// ---- Assemble / disassemble ----

#[test]
fn assemble_defaults_to_bin_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("prog.asm");
    fs::write(&input, "HLT\n").unwrap();
    chassis()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("assembled 1 bytes"));
    assert_eq!(fs::read(dir.path().join("prog.bin")).unwrap(), vec![0x00]);
}

#[test]
fn assemble_error_exits_64_with_line() {
    let dir = TempDir::new().unwrap();
    let input = write_temp(&dir, "bad.asm", b"HLT\nFROB r0\n");
    chassis()
        .args(["assemble", input.to_str().unwrap()])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("line 2: unknown mnemonic 'FROB'"));
}

#[test]
fn disassemble_prints_canonical_text() {
    let dir = TempDir::new().unwrap();
    let bin = assemble_to_temp(&dir, "movi r0 42\nhlt\n");
    chassis()
        .args(["disassemble", bin.to_str().unwrap()])
        .assert()
        .success()
        .stdout("MOVI r0, 0x0000002a\nHLT\n");
}

// ---- Explain ----

#[test]
fn explain_single_code() {
    chassis()
        .args(["explain", "6"])
        .assert()
        .success()
        .stdout("6: Stack overflow\n");
}

#[test]
fn explain_lists_all_codes() {
    chassis()
        .arg("explain")
        .assert()
        .success()
        .stdout(predicate::str::contains("1: Unimplemented opcode"))
        .stdout(predicate::str::contains("4: Data section exceeded bounds"));
}

#[test]
fn explain_unknown_code_exits_64() {
    chassis()
        .args(["explain", "9"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("unknown fault code 9"));
}
