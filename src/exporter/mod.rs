//! 统计结果导出模块
//!
//! 把统计模式得到的 [`TableStats`] 写到 CSV、JSON 等文件中。

pub mod stats;
pub use stats::ExportStats;

#[cfg(feature = "exporter-csv")]
pub mod csv;
#[cfg(feature = "exporter-json")]
pub mod json;
pub mod multi_exporter;

#[cfg(feature = "exporter-csv")]
pub use csv::CsvExporter;
#[cfg(feature = "exporter-json")]
pub use json::JsonExporter;
pub use multi_exporter::MultiExporter;

use crate::analyzer::TableStats;
use crate::error::{Result, SplitterError};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// 表统计导出器的统一接口
pub trait StatsExporter: Send {
    /// 导出器名称
    fn name(&self) -> &str;

    /// 导出单个表的统计
    fn export_table(&mut self, stats: &TableStats) -> Result<()>;

    /// 批量导出
    fn export_batch(&mut self, tables: &[TableStats]) -> Result<()> {
        for stats in tables {
            self.export_table(stats)?;
        }
        Ok(())
    }

    /// 完成导出，刷新并释放资源
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// 获取导出统计信息
    fn get_stats(&self) -> ExportStats {
        ExportStats::default()
    }
}

/// 创建导出文件，必要时创建父目录
///
/// `overwrite` 为 false 且文件已存在时返回错误。
pub(crate) fn create_output_file(path: &Path, overwrite: bool) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    if overwrite {
        return Ok(File::create(path)?);
    }
    OpenOptions::new().write(true).create_new(true).open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            SplitterError::config(format!(
                "导出文件已存在且不允许覆盖: {}",
                path.display()
            ))
        } else {
            e.into()
        }
    })
}
