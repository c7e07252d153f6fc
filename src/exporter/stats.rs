//! 导出统计信息模块

use std::time::{Duration, Instant};

/// 单个导出器的导出统计
#[derive(Debug, Default, Clone)]
pub struct ExportStats {
    /// 已导出的表数
    pub exported_tables: usize,
    /// 导出失败的表数
    pub failed_tables: usize,
    /// 导出开始时间
    pub start_time: Option<Instant>,
    /// 导出完成时间
    pub end_time: Option<Instant>,
}

impl ExportStats {
    /// 创建新的统计信息，记录开始时间
    pub fn new() -> Self {
        Self { start_time: Some(Instant::now()), ..Default::default() }
    }

    /// 标记导出完成
    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// 导出持续时间
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// 成功率（百分比），没有任何记录时为 0
    pub fn success_rate(&self) -> f64 {
        let total = self.total_tables();
        if total > 0 {
            self.exported_tables as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn total_tables(&self) -> usize {
        self.exported_tables + self.failed_tables
    }

    /// 合并其他统计，保留最早的开始时间和最晚的结束时间
    pub fn merge(&mut self, other: &ExportStats) {
        self.exported_tables += other.exported_tables;
        self.failed_tables += other.failed_tables;

        self.start_time = match (self.start_time, other.start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.end_time = match (self.end_time, other.end_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

impl std::fmt::Display for ExportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "成功: {} 个表, 失败: {} 个表",
            self.exported_tables, self.failed_tables
        )?;
        if let Some(duration) = self.duration() {
            write!(f, ", 耗时: {:.2}s", duration.as_secs_f64())?;
        }
        write!(f, ", 成功率: {:.1}%", self.success_rate())
    }
}
