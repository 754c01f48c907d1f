use ds_access_tools::commands::{self, InputOptions};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_export_with_invalid_file() {
    let input = InputOptions::new(vec!["/nonexistent/access".to_string()]);
    let result = commands::export::run(&input, "json", None);
    assert!(result.is_err());
}

#[test]
fn test_export_with_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("access");
    File::create(&log_path).unwrap();

    let output_path = temp_dir.path().join("output.json");
    let input = InputOptions::new(vec![log_path.to_str().unwrap().to_string()]);

    // Should succeed even with empty file
    let result = commands::export::run(&input, "json", output_path.to_str());
    assert!(result.is_ok());
    assert_eq!(std::fs::read_to_string(&output_path).unwrap().trim(), "[]");
}

#[test]
fn test_export_invalid_format() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("access");
    File::create(&log_path).unwrap();

    let input = InputOptions::new(vec![log_path.to_str().unwrap().to_string()]);
    let result = commands::export::run(&input, "xml", None);
    assert!(result.is_err());
}

#[test]
fn test_export_to_unwritable_path() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("access");
    File::create(&log_path).unwrap();

    let input = InputOptions::new(vec![log_path.to_str().unwrap().to_string()]);
    let result = commands::export::run(&input, "csv", Some("/nonexistent/dir/out.csv"));
    assert!(result.is_err());
}

#[test]
fn test_garbage_only_log_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("access");
    let mut file = File::create(&log_path).unwrap();
    writeln!(file, "{{\"type\":\"response\"}}").unwrap();
    writeln!(file, "[not a timestamp] conn=1 op=0 BIND").unwrap();
    writeln!(file, "[31/Feb/2025:00:00:00Z] conn=1 op=0 BIND").unwrap();
    file.flush().unwrap();

    let input = InputOptions::new(vec![log_path.to_str().unwrap().to_string()]);
    let registry = commands::load_registry(&input).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn test_parse_missing_file() {
    let result = commands::parse::run(&["/nonexistent/access".to_string()], None);
    assert!(result.is_err());
}
