//! 统计模式：按表汇总语句数量和字节数，不写任何输出文件

use crate::error::Result;
use crate::input::{Compression, open_input, wrap_input};
use crate::progress::ProgressCallback;
use crate::statement::{
    StatementKind, StatementReader, classify, determine_buffer_size,
};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 单个表的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub table_name: String,
    pub insert_count: u64,
    pub create_count: u64,
    pub statement_count: u64,
    pub total_bytes: u64,
}

impl TableStats {
    pub fn new<S: Into<String>>(table_name: S) -> Self {
        Self { table_name: table_name.into(), ..Default::default() }
    }

    /// 累计一条语句
    pub fn record(&mut self, kind: StatementKind, bytes: usize) {
        self.statement_count += 1;
        self.total_bytes += bytes as u64;
        match kind {
            StatementKind::CreateTable => self.create_count += 1,
            StatementKind::Insert => self.insert_count += 1,
            _ => {}
        }
    }
}

/// 按 insert_count 降序排序，相同时按表名升序
pub fn sort_stats(stats: &mut [TableStats]) {
    stats.sort_by(|a, b| {
        b.insert_count
            .cmp(&a.insert_count)
            .then_with(|| a.table_name.cmp(&b.table_name))
    });
}

/// 一次统计运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// 已排序的各表统计
    pub tables: Vec<TableStats>,
    /// 读取到的全部语句数（含无法识别的）
    pub statements_read: u64,
    /// 计入统计的语句数
    pub total_statements: u64,
    /// 计入统计的语句字节数
    pub total_bytes: u64,
    /// 耗时（毫秒）
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Local>,
}

impl AnalysisReport {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// 每秒处理的字节数，耗时为 0 时返回 `None`
    pub fn throughput(&self) -> Option<f64> {
        (self.elapsed_ms > 0)
            .then(|| self.total_bytes as f64 * 1000.0 / self.elapsed_ms as f64)
    }
}

/// SQL 导出文件统计器
pub struct Analyzer {
    input: PathBuf,
    table_filter: Option<HashSet<String>>,
    buffer_size: Option<usize>,
    progress: Option<ProgressCallback>,
}

impl Analyzer {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            table_filter: None,
            buffer_size: None,
            progress: None,
        }
    }

    /// 只统计指定的表；空列表表示不过滤
    pub fn with_table_filter<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = tables.into_iter().map(Into::into).collect();
        self.table_filter = (!set.is_empty()).then_some(set);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    /// 统计输入文件，返回排序后的各表统计
    pub fn analyze(&self) -> Result<Vec<TableStats>> {
        Ok(self.report()?.tables)
    }

    pub fn analyze_reader<R: Read>(
        &self,
        reader: R,
        size_hint: u64,
    ) -> Result<Vec<TableStats>> {
        Ok(self.report_reader(reader, size_hint)?.tables)
    }

    /// 统计输入文件并生成完整报告；压缩输入按扩展名解压
    pub fn report(&self) -> Result<AnalysisReport> {
        let (file, size) = open_input(&self.input)?;
        self.report_compressed(file, size, Compression::from_path(&self.input))
    }

    pub fn report_reader<R: Read>(
        &self,
        reader: R,
        size_hint: u64,
    ) -> Result<AnalysisReport> {
        self.report_compressed(reader, size_hint, Compression::None)
    }

    pub fn report_compressed<'a, R: Read + 'a>(
        &self,
        reader: R,
        size_hint: u64,
        compression: Compression,
    ) -> Result<AnalysisReport> {
        let started = Instant::now();
        let buffer_size = self
            .buffer_size
            .unwrap_or_else(|| determine_buffer_size(size_hint));

        #[cfg(feature = "logging")]
        tracing::info!(
            input = %self.input.display(),
            size = size_hint,
            buffer_size,
            %compression,
            "开始统计"
        );

        let source = wrap_input(reader, self.progress.as_ref(), compression)?;
        let (by_table, statements_read) = self.fold(source, buffer_size)?;

        let mut tables: Vec<TableStats> = by_table.into_values().collect();
        sort_stats(&mut tables);

        let report = AnalysisReport {
            statements_read,
            total_statements: tables.iter().map(|t| t.statement_count).sum(),
            total_bytes: tables.iter().map(|t| t.total_bytes).sum(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            generated_at: Local::now(),
            tables,
        };

        #[cfg(feature = "logging")]
        tracing::info!(
            tables = report.table_count(),
            statements = report.total_statements,
            bytes = report.total_bytes,
            elapsed_ms = report.elapsed_ms,
            "统计完成"
        );
        Ok(report)
    }

    fn fold<R: Read>(
        &self,
        reader: R,
        buffer_size: usize,
    ) -> Result<(HashMap<String, TableStats>, u64)> {
        let mut reader = StatementReader::new(reader, buffer_size);
        let mut by_table: HashMap<String, TableStats> = HashMap::new();

        while let Some(stmt) = reader.read_statement()? {
            let classified = classify(stmt.as_bytes());
            let bytes = classified.byte_length();
            let Some((kind, table)) = classified.into_parts() else {
                continue;
            };
            if let Some(filter) = &self.table_filter {
                if !filter.contains(&table) {
                    continue;
                }
            }
            by_table
                .entry(table)
                .or_insert_with_key(|name| TableStats::new(name.as_str()))
                .record(kind, bytes);
        }

        Ok((by_table, reader.statements_read()))
    }
}
