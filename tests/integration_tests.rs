/// Integration tests for ds-access commands
/// These tests verify end-to-end functionality with sample access logs
use ds_access_tools::commands::{self, InputOptions};
use ds_access_tools::utils::processor::LogProcessor;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sample log covering every report: two completed sessions, one open bound
/// session, one BIND without a RESULT, one unindexed search and some noise.
const SAMPLE_LOG: &[&str] = &[
    "[10/Jun/2025:21:18:00.000000Z] - 389-Directory/2.4.5 B2024.100.0000 starting up",
    "[10/Jun/2025:21:18:05.000000Z] conn=100 fd=64 slot=64 connection from 192.168.1.10 to 192.168.1.1",
    r#"[10/Jun/2025:21:18:06.100000Z] conn=100 op=0 BIND dn="uid=test,ou=people,dc=example,dc=com" method=128 version=3"#,
    "[10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=0 tag=97 nentries=1 etime=0.0",
    r#"[10/Jun/2025:21:18:06.300000Z] conn=100 op=1 SRCH base="ou=people,dc=example,dc=com" scope=2 filter="(description=*x*)" attrs=ALL"#,
    r#"[10/Jun/2025:21:18:06.900000Z] conn=100 op=1 RESULT err=0 tag=101 nentries=4 wtime=0.000063 optime=0.6 etime=0.600063 details="Partially Unindexed Filter""#,
    "[10/Jun/2025:21:18:07.000000Z] conn=100 op=2 UNBIND",
    "[10/Jun/2025:21:18:07.200000Z] conn=100 op=2 fd=64 closed - U1",
    "[10/Jun/2025:23:18:08.000000+0200] conn=101 fd=65 slot=65 connection from 192.168.1.11 to 192.168.1.1",
    r#"[10/Jun/2025:23:18:08.500000+0200] conn=101 op=0 BIND dn="cn=Directory Manager" method=128 version=3"#,
    "[10/Jun/2025:23:18:08.600000+0200] conn=101 op=0 RESULT err=0 tag=97 nentries=0 etime=0.0",
    "",
    "this line is not an access log record",
    "[10/Jun/2025:21:18:09.000000Z] conn=102 fd=66 slot=66 connection from 10.0.0.7 to 192.168.1.1",
    r#"[10/Jun/2025:21:18:09.100000Z] conn=102 op=0 BIND dn="uid=slow,ou=people,dc=example,dc=com" method=128 version=3"#,
    "[10/Jun/2025:21:18:10.000000Z] conn=103 fd=67 slot=67 connection from 192.168.1.10 to 192.168.1.1",
    r#"[10/Jun/2025:21:18:10.100000Z] conn=103 op=0 BIND dn="uid=test,ou=people,dc=example,dc=com" method=128 version=3"#,
    "[10/Jun/2025:21:18:10.200000Z] conn=103 op=0 RESULT err=0 tag=97 nentries=1 etime=0.0",
    "[10/Jun/2025:21:18:11.000000Z] conn=103 op=-1 fd=67 closed - B1",
];

/// Helper to write an access log into a temp dir
fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let file_path = dir.join(name);
    let mut file = fs::File::create(&file_path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file_path
}

fn create_sample_log() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "access", SAMPLE_LOG);
    (dir, path)
}

fn input_for(path: &Path) -> InputOptions {
    InputOptions::new(vec![path.to_str().unwrap().to_string()])
}

fn render(write: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut out = Vec::new();
    write(&mut out);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_report_commands_run() {
    let (_dir, log) = create_sample_log();
    let input = input_for(&log);

    assert!(commands::src_ip_table::run(&input).is_ok());
    assert!(commands::open_connections::run(&input).is_ok());
    assert!(commands::unique_clients::run(&input).is_ok());
    assert!(commands::unindexed_searches::run(&input).is_ok());
}

#[test]
fn test_report_commands_fail_on_missing_file() {
    let input = InputOptions::new(vec!["/nonexistent/access".to_string()]);

    assert!(commands::src_ip_table::run(&input).is_err());
    assert!(commands::open_connections::run(&input).is_err());
    assert!(commands::unique_clients::run(&input).is_err());
    assert!(commands::unindexed_searches::run(&input).is_err());
    assert!(commands::export::run(&input, "json", None).is_err());
}

#[test]
fn test_src_ip_table_end_to_end() {
    let (_dir, log) = create_sample_log();
    let registry = commands::load_registry(&input_for(&log)).unwrap();

    let text = render(|out| {
        commands::src_ip_table::write_report(&registry, |ip| ip.to_string(), out).unwrap()
    });
    let rows: Vec<&str> = text.lines().skip(2).collect();

    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("192.168.1.10"));
    assert!(rows[0].contains("2025-06-10T21:18:06.100000+00:00"));
    assert!(rows[0].contains("2025-06-10T21:18:07.200000+00:00"));
    assert!(rows[1].contains("2025-06-10T21:18:10.100000+00:00"));
}

#[test]
fn test_open_connections_end_to_end() {
    let (_dir, log) = create_sample_log();
    let registry = commands::load_registry(&input_for(&log)).unwrap();

    let text = render(|out| {
        commands::open_connections::write_report(&registry, |ip| ip.to_string(), out).unwrap()
    });
    let rows: Vec<&str> = text.lines().skip(2).filter(|l| !l.is_empty()).collect();

    // bound conn 101 first, then the unanswered BIND on conn 102
    assert!(rows[0].starts_with("192.168.1.11"));
    assert!(rows[0].contains("cn=Directory Manager"));
    assert!(rows[0].contains("2025-06-10T23:18:08.500000+02:00"));
    assert!(rows[1].starts_with("10.0.0.7"));
    assert!(text.contains("Open connections: 2"));
}

#[test]
fn test_unique_clients_end_to_end() {
    let (_dir, log) = create_sample_log();
    let registry = commands::load_registry(&input_for(&log)).unwrap();

    let text = render(|out| {
        commands::unique_clients::write_report(&registry, |ip| ip.to_string(), out).unwrap()
    });
    assert_eq!(
        text.lines().skip(2).collect::<Vec<_>>(),
        vec!["10.0.0.7", "192.168.1.10", "192.168.1.11"]
    );
}

#[test]
fn test_unindexed_searches_end_to_end() {
    let (_dir, log) = create_sample_log();
    let registry = commands::load_registry(&input_for(&log)).unwrap();

    let text = render(|out| commands::unindexed_searches::write_report(&registry, out).unwrap());
    let row = text.lines().nth(2).unwrap();

    assert!(row.contains("ou=people,dc=example,dc=com"));
    assert!(row.ends_with("(description=*x*)"));
    assert!(text.contains("Unindexed searches: 1"));
}

#[test]
fn test_filter_client_ip() {
    let (_dir, log) = create_sample_log();
    let mut input = input_for(&log);
    input.filter_client_ips = vec!["192.168.1.10".to_string()];

    let registry = commands::load_registry(&input).unwrap();
    let ids: Vec<u64> = registry.connections().map(|c| c.id).collect();
    assert_eq!(ids, vec![100, 103]);
}

#[test]
fn test_dropped_lines_are_counted() {
    let (_dir, log) = create_sample_log();
    let files = vec![log.to_str().unwrap().to_string()];

    let mut dropped = Vec::new();
    let (registry, stats) = LogProcessor::new(&files, "Testing")
        .show_progress(false)
        .build_registry(|failure| dropped.push(failure.text.to_string()))
        .unwrap();

    assert_eq!(stats.total_lines, SAMPLE_LOG.len());
    assert_eq!(stats.skipped_lines, 1);
    assert_eq!(stats.parsed_entries, SAMPLE_LOG.len() - 2);
    assert_eq!(dropped, vec!["this line is not an access log record"]);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_rotated_fragments_continue_each_other() {
    let dir = TempDir::new().unwrap();
    let older = write_log(dir.path(), "access.20250610-211800", &SAMPLE_LOG[..4]);
    let newer = write_log(dir.path(), "access", &SAMPLE_LOG[4..]);

    let split = commands::load_registry(&InputOptions::new(vec![
        older.to_str().unwrap().to_string(),
        newer.to_str().unwrap().to_string(),
    ]))
    .unwrap();
    let (_whole_dir, whole) = create_sample_log();
    let joined = commands::load_registry(&input_for(&whole)).unwrap();

    assert_eq!(split, joined);
}

#[test]
fn test_compressed_input() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let dir = TempDir::new().unwrap();
    let gz_path = dir.path().join("access.gz");
    {
        let file = fs::File::create(&gz_path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        for line in SAMPLE_LOG {
            writeln!(encoder, "{}", line).unwrap();
        }
        encoder.finish().unwrap();
    }

    let zst_path = dir.path().join("access.zst");
    {
        let file = fs::File::create(&zst_path).unwrap();
        let mut encoder = zstd::Encoder::new(file, 3).unwrap();
        for line in SAMPLE_LOG {
            writeln!(encoder, "{}", line).unwrap();
        }
        encoder.finish().unwrap();
    }

    let (_plain_dir, plain) = create_sample_log();
    let expected = commands::load_registry(&input_for(&plain)).unwrap();

    assert_eq!(commands::load_registry(&input_for(&gz_path)).unwrap(), expected);
    assert_eq!(commands::load_registry(&input_for(&zst_path)).unwrap(), expected);
}

#[test]
fn test_export_to_files() {
    let (dir, log) = create_sample_log();
    let input = input_for(&log);

    let json_path = dir.path().join("sessions.json");
    commands::export::run(&input, "json", json_path.to_str()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);
    assert_eq!(json[0]["operations"][1]["kind"], "SRCH");
    assert_eq!(
        json[0]["operations"][1]["result"]["details"],
        "Partially Unindexed Filter"
    );

    let csv_path = dir.path().join("sessions.csv");
    commands::export::run(&input, "csv", csv_path.to_str()).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    // conn 100 has three operations, the others one each
    assert_eq!(reader.records().count(), 6);
}

#[test]
fn test_parse_single_line() {
    let result = commands::parse::run(
        &[],
        Some("[10/Jun/2025:21:18:07.200000Z] conn=100 op=-1 fd=12 closed"),
    );
    assert!(result.is_ok());
}
