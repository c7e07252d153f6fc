//! CSV 导出器

use super::{StatsExporter, create_output_file};
use crate::analyzer::TableStats;
use crate::error::Result;
use crate::exporter::ExportStats;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV 表头
pub const CSV_HEADER: &str =
    "table_name,insert_count,create_count,statement_count,total_bytes\n";

/// 把表统计写成 CSV，每个表一行
pub struct CsvExporter {
    writer: BufWriter<File>,
    stats: ExportStats,
    header_written: bool,
}

impl CsvExporter {
    /// 创建导出器，覆盖已存在的文件
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_overwrite(path, true)
    }

    pub fn with_overwrite<P: AsRef<Path>>(
        path: P,
        overwrite: bool,
    ) -> Result<Self> {
        let file = create_output_file(path.as_ref(), overwrite)?;
        Ok(Self {
            writer: BufWriter::new(file),
            stats: ExportStats::new(),
            header_written: false,
        })
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer.write_all(CSV_HEADER.as_bytes())?;
        self.header_written = true;
        Ok(())
    }

    /// 转义 CSV 字段
    fn escape_csv_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(stats: &TableStats) -> String {
        format!(
            "{},{},{},{},{}\n",
            Self::escape_csv_field(&stats.table_name),
            stats.insert_count,
            stats.create_count,
            stats.statement_count,
            stats.total_bytes
        )
    }
}

impl StatsExporter for CsvExporter {
    fn name(&self) -> &str {
        "CSV"
    }

    fn export_table(&mut self, stats: &TableStats) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        self.writer.write_all(Self::format_row(stats).as_bytes())?;
        self.stats.exported_tables += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        // 没有任何表时也写出表头
        if !self.header_written {
            self.write_header()?;
        }
        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("CSV导出完成: {} 个表", self.stats.exported_tables);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample(name: &str, inserts: u64) -> TableStats {
        TableStats {
            table_name: name.to_string(),
            insert_count: inserts,
            create_count: 1,
            statement_count: inserts + 1,
            total_bytes: 100,
        }
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(CsvExporter::escape_csv_field("users"), "users");
        assert_eq!(CsvExporter::escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(CsvExporter::escape_csv_field("q\"t"), "\"q\"\"t\"");
    }

    #[test]
    fn test_export_rows_after_single_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        let mut exporter = CsvExporter::new(&path).unwrap();
        exporter
            .export_batch(&[sample("users", 2), sample("odd,name", 0)])
            .unwrap();
        exporter.finalize().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("{CSV_HEADER}users,2,1,3,100\n\"odd,name\",0,1,1,100\n")
        );
        assert_eq!(exporter.get_stats().exported_tables, 2);
        assert!(exporter.get_stats().is_finished());
    }

    #[test]
    fn test_finalize_without_rows_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        let mut exporter = CsvExporter::new(&path).unwrap();
        exporter.finalize().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), CSV_HEADER);
    }
}
