//! OVD 转换集成测试
//!
//! 通过库接口与 ovd2rip 可执行文件，验证输出目录中的分节文件

use std::fs;
use std::path::Path;
use std::process::Command;

use ovdrip::error::OvdError;
use ovdrip::types::BusNumber;
use ovdrip::{TranspileOptions, Transpiler};
use tempfile::TempDir;

const SENSOR_DUMP: &str = "@@ Sensor\n;; setup\n10 20 FF\n10 21 1234\n80 22 01\n";

fn transpiler_for(dir: &Path) -> Transpiler {
    Transpiler::new(TranspileOptions {
        output_dir: dir.to_path_buf(),
        ..TranspileOptions::default()
    })
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("missing {}: {}", name, e))
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_sensor_section_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("output");
    let summary = transpiler_for(&out).transpile(SENSOR_DUMP).unwrap();

    assert_eq!(summary.sections.len(), 1);
    assert_eq!(
        read(&out, "Sensor_0.txt"),
        "SET-BUS PUT_BUS_NUMBER_HERE\nSET-ID 0x10\nWB-16 0x20 0xFF\nWW-16 0x21 0x1234\n//80 22 01\n"
    );
}

#[test]
fn test_multiple_sections_and_delay() {
    let temp = TempDir::new().unwrap();
    let source = r#"garbage before any section 10 20 30
10 20 30
@@ Power Up
; Delay 5ms
36 00 01
@@ Empty
@@ Stream/On
// stream on
36 01 0100
"#;
    transpiler_for(temp.path()).transpile(source).unwrap();

    assert_eq!(
        file_names(temp.path()),
        vec!["Empty_1.txt", "Power_Up_0.txt", "Stream_On_2.txt"]
    );
    assert_eq!(
        read(temp.path(), "Power_Up_0.txt"),
        "SET-BUS PUT_BUS_NUMBER_HERE\nDELAY 5\nSET-ID 0x36\nWB-16 0x00 0x01\n"
    );
    assert_eq!(read(temp.path(), "Empty_1.txt"), "SET-BUS PUT_BUS_NUMBER_HERE\n");
    assert_eq!(
        read(temp.path(), "Stream_On_2.txt"),
        "SET-BUS PUT_BUS_NUMBER_HERE\nSET-ID 0x36\nWW-16 0x01 0x0100\n"
    );
}

#[test]
fn test_stale_output_removed() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Old_0.txt"), "SET-BUS 1\n").unwrap();

    let options = TranspileOptions {
        output_dir: temp.path().to_path_buf(),
        bus: BusNumber::Number(16),
        ..TranspileOptions::default()
    };
    Transpiler::new(options).transpile("@@ New\n10 20 30\n").unwrap();

    assert_eq!(file_names(temp.path()), vec!["New_0.txt"]);
    assert!(read(temp.path(), "New_0.txt").starts_with("SET-BUS 16\n"));
}

#[test]
fn test_unterminated_function_discards_rest() {
    let temp = TempDir::new().unwrap();
    let source = "@@ A\n10 20 30\nfunction never_opens()\n10 21 31\n@@ B\n";
    let summary = transpiler_for(temp.path()).transpile(source).unwrap();

    assert_eq!(summary.sections.len(), 1);
    assert_eq!(
        read(temp.path(), "A_0.txt"),
        "SET-BUS PUT_BUS_NUMBER_HERE\nSET-ID 0x10\nWB-16 0x20 0x30\n"
    );
}

#[test]
fn test_missing_input_is_reported() {
    let temp = TempDir::new().unwrap();
    let err = transpiler_for(temp.path())
        .transpile_file(temp.path().join("absent.ovd"))
        .unwrap_err();
    assert!(matches!(err, OvdError::Input { .. }));
}

#[test]
fn test_binary_writes_sections() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("dump.ovd");
    fs::write(&input, SENSOR_DUMP).unwrap();
    let out = temp.path().join("rip");

    let output = Command::new(env!("CARGO_BIN_EXE_ovd2rip"))
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--bus")
        .arg("2")
        .output()
        .expect("failed to run ovd2rip");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "ovd2rip failed: {}", stdout);
    assert!(stdout.contains("Sensor_0.txt"));
    assert!(stdout.contains("FINISHED"));
    assert!(read(&out, "Sensor_0.txt").starts_with("SET-BUS 2\nSET-ID 0x10\n"));
}

#[test]
fn test_binary_fails_when_output_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("dump.ovd");
    fs::write(&input, SENSOR_DUMP).unwrap();
    let blocker = temp.path().join("blocked");
    fs::write(&blocker, "not a directory").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_ovd2rip"))
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&blocker)
        .output()
        .expect("failed to run ovd2rip");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("Exiting..."));
}

#[test]
fn test_binary_stops_when_section_cannot_be_opened() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("dump.ovd");
    fs::write(&input, "@@ A\n10 20 30\n@@ B\n10 21 31\n@@ C\n10 22 32\n").unwrap();
    let out = temp.path().join("out");
    // 同名目录在清空输出目录时会被保留，打开 B_1.txt 必然失败
    fs::create_dir_all(out.join("B_1.txt")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_ovd2rip"))
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .output()
        .expect("failed to run ovd2rip");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "stdout: {}", stdout);
    assert!(stdout.contains("Failed to open file:"));
    assert!(stdout.contains("B_1.txt"));
    assert!(stdout.contains("Exiting..."));
    assert!(!stdout.contains("FINISHED"));
    assert_eq!(
        read(&out, "A_0.txt"),
        "SET-BUS PUT_BUS_NUMBER_HERE\nSET-ID 0x10\nWB-16 0x20 0x30\n"
    );
    assert!(!out.join("C_2.txt").exists());
}
