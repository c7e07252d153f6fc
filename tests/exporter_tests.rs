//! 统计导出集成测试

mod common;

use common::{MIXED_DUMP, create_dump};
use sqldump_splitter::Analyzer;
use sqldump_splitter::app::export_report;
use sqldump_splitter::config::{CsvConfig, ExportConfig, JsonConfig};
use std::fs;
use tempfile::TempDir;

fn export_config(dir: &TempDir, overwrite: bool) -> ExportConfig {
    let path = |name: &str| dir.path().join(name).to_string_lossy().into_owned();
    ExportConfig {
        csv: vec![CsvConfig { out_path: path("report/stats.csv"), overwrite }],
        json: vec![JsonConfig {
            out_path: path("report/stats.json"),
            overwrite,
            pretty: false,
        }],
    }
}

#[cfg(feature = "exporter-csv")]
#[test]
fn test_report_to_csv() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_dump(&temp_dir, "dump.sql", MIXED_DUMP);
    let report = Analyzer::new(&input).report().unwrap();

    let config = ExportConfig {
        csv: export_config(&temp_dir, true).csv,
        json: Vec::new(),
    };
    export_report(&report, &config).unwrap();

    let content =
        fs::read_to_string(temp_dir.path().join("report/stats.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "table_name,insert_count,create_count,statement_count,total_bytes"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("users,2,1,4,"));
    assert!(lines[2].starts_with("orders,1,1,4,"));
    assert!(lines[3].starts_with("products,1,0,1,"));
}

#[cfg(feature = "exporter-json")]
#[test]
fn test_report_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_dump(&temp_dir, "dump.sql", MIXED_DUMP);
    let report = Analyzer::new(&input).report().unwrap();

    let config = ExportConfig {
        csv: Vec::new(),
        json: export_config(&temp_dir, true).json,
    };
    export_report(&report, &config).unwrap();

    let content =
        fs::read_to_string(temp_dir.path().join("report/stats.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["table_name"], "users");
    assert_eq!(rows[0]["insert_count"], 2);
    assert_eq!(rows[2]["table_name"], "products");
}

#[cfg(all(feature = "exporter-csv", feature = "exporter-json"))]
#[test]
fn test_existing_file_without_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_dump(&temp_dir, "dump.sql", MIXED_DUMP);
    let report = Analyzer::new(&input).report().unwrap();

    export_report(&report, &export_config(&temp_dir, false)).unwrap();
    let err = export_report(&report, &export_config(&temp_dir, false))
        .unwrap_err();
    assert!(err.is_config_error());

    // 允许覆盖时重新导出成功
    export_report(&report, &export_config(&temp_dir, true)).unwrap();
}

#[test]
fn test_no_exporters_configured() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_dump(&temp_dir, "dump.sql", MIXED_DUMP);
    let report = Analyzer::new(&input).report().unwrap();
    export_report(&report, &ExportConfig::default()).unwrap();
    assert!(!temp_dir.path().join("report").exists());
}
