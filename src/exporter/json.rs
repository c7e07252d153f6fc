//! JSON 导出器

use super::{StatsExporter, create_output_file};
use crate::analyzer::TableStats;
use crate::error::Result;
use crate::exporter::ExportStats;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 把表统计写成 JSON 数组
///
/// 数组在创建时打开、在 `finalize` 时闭合，中间逐个写入对象。
pub struct JsonExporter {
    writer: BufWriter<File>,
    stats: ExportStats,
    first_record: bool,
    pretty: bool,
}

impl JsonExporter {
    /// 创建缩进格式的导出器，覆盖已存在的文件
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_options(path, true, true)
    }

    pub fn with_options<P: AsRef<Path>>(
        path: P,
        overwrite: bool,
        pretty: bool,
    ) -> Result<Self> {
        let file = create_output_file(path.as_ref(), overwrite)?;
        let mut writer = BufWriter::new(file);
        let opening: &[u8] = if pretty { b"[\n" } else { b"[" };
        writer.write_all(opening)?;
        Ok(Self { writer, stats: ExportStats::new(), first_record: true, pretty })
    }

    fn to_json(&self, stats: &TableStats) -> Result<String> {
        if !self.pretty {
            return Ok(serde_json::to_string(stats)?);
        }
        // 为每行添加缩进
        Ok(serde_json::to_string_pretty(stats)?
            .lines()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl StatsExporter for JsonExporter {
    fn name(&self) -> &str {
        "JSON"
    }

    fn export_table(&mut self, stats: &TableStats) -> Result<()> {
        let json = self.to_json(stats)?;
        if self.first_record {
            self.first_record = false;
        } else {
            let separator: &[u8] = if self.pretty { b",\n" } else { b"," };
            self.writer.write_all(separator)?;
        }
        self.writer.write_all(json.as_bytes())?;
        self.stats.exported_tables += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.pretty {
            let closing: &[u8] = if self.first_record { b"]\n" } else { b"\n]\n" };
            self.writer.write_all(closing)?;
        } else {
            self.writer.write_all(b"]\n")?;
        }
        self.writer.flush()?;
        self.stats.finish();

        #[cfg(feature = "logging")]
        tracing::info!("JSON导出完成: {} 个表", self.stats.exported_tables);

        Ok(())
    }

    fn get_stats(&self) -> ExportStats {
        self.stats.clone()
    }
}
