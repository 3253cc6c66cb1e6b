//! Runs the compiled `xml-mini` binary and checks exit codes and output.
//!
//! Disabled under Miri and on WASI, neither of which can spawn processes.
#![cfg(all(not(miri), not(target_os = "wasi")))]

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

/// Run the binary, returning (stdout, stderr, exit code).
fn run_binary(args: &[&str]) -> (String, String, i32) {
    let bin = env!("CARGO_BIN_EXE_xml-mini");
    let output = Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute binary");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code().unwrap_or(-1))
}

fn xml_file(content: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    write!(tmp, "{content}").unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn help_flag_prints_usage_and_exits_zero() {
    for flag in ["--help", "-h"] {
        let (stdout, _stderr, code) = run_binary(&[flag]);
        assert_eq!(code, 0);
        assert!(stdout.contains("Usage:"), "stdout: {stdout}");
    }
}

#[test]
fn no_args_prints_usage_to_stderr_and_exits_one() {
    let (_stdout, stderr, code) = run_binary(&[]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Usage:"), "stderr: {stderr}");
}

#[test]
fn unknown_option_exits_one() {
    let (_stdout, stderr, code) = run_binary(&["--bogus"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown option"), "stderr: {stderr}");
}

#[test]
fn extra_argument_exits_one() {
    let (_stdout, stderr, code) = run_binary(&["a.xml", "b.xml"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unexpected extra argument"), "stderr: {stderr}");
}

#[test]
fn missing_file_exits_two() {
    let (_stdout, stderr, code) = run_binary(&["nonexistent_file_12345.xml"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("Failed to read"), "stderr: {stderr}");
}

#[test]
fn valid_document_is_echoed() {
    let tmp = xml_file("<user><id type=\"integer\">1</id><full_name>Ada</full_name></user>");
    let (stdout, stderr, code) = run_binary(&[tmp.path().to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Budget report:"), "stdout: {stdout}");
    assert!(stdout.contains("<nodes type=\"integer\">3</nodes>"), "stdout: {stdout}");
    assert!(stdout.contains("<id type=\"integer\">1</id>"), "stdout: {stdout}");
    assert!(stdout.contains("<full-name>Ada</full-name>"), "stdout: {stdout}");
}

#[test]
fn malformed_document_exits_three() {
    let tmp = xml_file("<user><id>1</user>");
    let path = tmp.path().to_str().unwrap();
    let (_stdout, stderr, code) = run_binary(&[path]);
    assert_eq!(code, 3);
    assert!(stderr.contains("invalid"), "stderr: {stderr}");
}

#[test]
fn unsafe_types_need_the_trusted_flag() {
    let tmp = xml_file("<status type=\"symbol\">active</status>");
    let path = tmp.path().to_str().unwrap();

    let (_stdout, stderr, code) = run_binary(&[path]);
    assert_eq!(code, 3);
    assert!(stderr.contains("disallowed type attribute"), "stderr: {stderr}");

    let (stdout, stderr, code) = run_binary(&["--trusted", path]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("<status type=\"symbol\">active</status>"), "stdout: {stdout}");
}

#[test]
fn budget_breach_is_reported() {
    let mut xml = String::from("<!DOCTYPE b [\n<!ENTITY l7 \"lol\">\n");
    for level in (0..7).rev() {
        xml.push_str(&format!("<!ENTITY l{level} \"{}\">\n", format!("&l{};", level + 1).repeat(10)));
    }
    xml.push_str("]>\n<b>&l0;</b>\n");
    let tmp = xml_file(&xml);

    let (stdout, stderr, code) = run_binary(&[tmp.path().to_str().unwrap()]);
    assert_eq!(code, 3);
    assert!(stdout.contains("<breached>"), "stdout: {stdout}");
    assert!(stderr.contains("expansion limit exceeded"), "stderr: {stderr}");
}
