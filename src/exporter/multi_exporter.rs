//! 多导出器管理

use super::StatsExporter;
use crate::analyzer::TableStats;
use crate::error::Result;
use crate::exporter::ExportStats;

/// 把同一份统计分发给多个导出器
///
/// 单个导出器失败只计入它自己的统计，不影响其他导出器。
pub struct MultiExporter {
    exporters: Vec<Box<dyn StatsExporter>>,
    stats: Vec<ExportStats>,
}

impl MultiExporter {
    pub fn new() -> Self {
        Self { exporters: Vec::new(), stats: Vec::new() }
    }

    /// 添加导出器
    pub fn add_exporter<E>(&mut self, exporter: E)
    where
        E: StatsExporter + 'static,
    {
        self.add_boxed(Box::new(exporter));
    }

    pub fn add_boxed(&mut self, exporter: Box<dyn StatsExporter>) {
        self.exporters.push(exporter);
        self.stats.push(ExportStats::new());
    }

    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// 导出单个表到所有导出器
    pub fn export_table(&mut self, table: &TableStats) {
        for (exporter, stats) in self.exporters.iter_mut().zip(&mut self.stats)
        {
            match exporter.export_table(table) {
                Ok(()) => stats.exported_tables += 1,
                Err(_e) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!(
                        exporter = exporter.name(),
                        table = %table.table_name,
                        error = %_e,
                        "导出失败"
                    );
                    stats.failed_tables += 1;
                }
            }
        }
    }

    pub fn export_batch(&mut self, tables: &[TableStats]) {
        for table in tables {
            self.export_table(table);
        }
    }

    /// 完成所有导出器；全部都会被调用，返回第一个错误
    pub fn finalize_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for (exporter, stats) in self.exporters.iter_mut().zip(&mut self.stats)
        {
            match exporter.finalize() {
                Ok(()) => stats.finish(),
                Err(e) => {
                    #[cfg(feature = "logging")]
                    tracing::error!(
                        exporter = exporter.name(),
                        error = %e,
                        "导出器完成失败"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// 所有导出器的名称和统计
    pub fn get_all_stats(&self) -> Vec<(String, ExportStats)> {
        self.exporters
            .iter()
            .zip(&self.stats)
            .map(|(exporter, stats)| (exporter.name().to_string(), stats.clone()))
            .collect()
    }

    /// 输出统计报告到日志
    pub fn log_stats_report(&self) {
        for (_name, _stats) in self.get_all_stats() {
            #[cfg(feature = "logging")]
            tracing::info!("导出器 {}: {}", _name, _stats);
        }
    }
}

impl Default for MultiExporter {
    fn default() -> Self {
        Self::new()
    }
}
