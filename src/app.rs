//! 命令行应用的执行流程：按配置运行拆分或统计，输出汇总并导出结果

use crate::analyzer::{AnalysisReport, Analyzer};
use crate::config::{Config, ExportConfig};
use crate::error::{Result, SplitterError};
use crate::exporter::MultiExporter;
use crate::input::resolve_input_path;
use crate::progress::{ProgressCallback, throttled};
use crate::splitter::{RunStats, Splitter};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// 进度日志的百分比步长
pub const PROGRESS_STEP_PERCENT: u64 = 5;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Split,
    Analyze,
}

impl FromStr for Mode {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "split" => Ok(Mode::Split),
            "analyze" => Ok(Mode::Analyze),
            other => Err(SplitterError::config(format!(
                "未知的运行模式: {other}（可选 split、analyze）"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Split => "split",
            Mode::Analyze => "analyze",
        })
    }
}

/// 一次运行的结果
#[derive(Debug)]
pub enum RunOutcome {
    Split(RunStats),
    Analyze(AnalysisReport),
}

/// 按模式执行一次运行
pub fn run(
    mode: Mode,
    input_override: Option<&Path>,
    config: &Config,
) -> Result<RunOutcome> {
    let input = resolve_input_path(input_override, config)?;
    let started = Instant::now();

    #[cfg(feature = "logging")]
    tracing::info!(mode = %mode, input = %input.display(), "开始处理");

    match mode {
        Mode::Split => {
            let mut splitter = Splitter::new(&input, &config.split.output_dir)
                .with_table_filter(config.split.tables.iter().cloned())
                .with_dry_run(config.split.dry_run)
                .with_content_filter(config.split.content);
            if let Some(size) = config.buffer_size_override() {
                splitter = splitter.with_buffer_size(size);
            }
            if config.split.progress {
                splitter = splitter.with_progress(progress_logger(&input));
            }

            let stats = splitter.split()?;
            log_split_summary(&stats, config.split.dry_run, started.elapsed());
            Ok(RunOutcome::Split(stats))
        }
        Mode::Analyze => {
            let mut analyzer = Analyzer::new(&input)
                .with_table_filter(config.analyze.tables.iter().cloned());
            if let Some(size) = config.buffer_size_override() {
                analyzer = analyzer.with_buffer_size(size);
            }
            if config.analyze.progress {
                analyzer = analyzer.with_progress(progress_logger(&input));
            }

            let report = analyzer.report()?;
            log_analysis_summary(&report);
            export_report(&report, &config.export)?;
            Ok(RunOutcome::Analyze(report))
        }
    }
}

/// 每跨过 5% 输出一次进度日志
fn progress_logger(input: &Path) -> ProgressCallback {
    let total = fs::metadata(input).map(|m| m.len()).unwrap_or(0);
    throttled(total, PROGRESS_STEP_PERCENT, move |_bytes, _percent| {
        #[cfg(feature = "logging")]
        tracing::info!("进度: {}% ({} / {} 字节)", _percent, _bytes, total);
    })
}

/// MB/s
fn throughput_mb(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        bytes as f64 / 1024.0 / 1024.0 / secs
    } else {
        0.0
    }
}

fn log_split_summary(stats: &RunStats, dry_run: bool, elapsed: Duration) {
    #[cfg(feature = "logging")]
    {
        if dry_run {
            tracing::info!(
                "试运行完成，将生成 {} 个表文件: {}",
                stats.tables_found,
                stats.table_names.join(", ")
            );
        }
        tracing::info!(
            "拆分完成，共 {} 个表，{} 条语句，{} 字节，耗时 {:.2?}，速度 {:.2} MB/s",
            stats.tables_found,
            stats.statements_processed,
            stats.bytes_processed,
            elapsed,
            throughput_mb(stats.bytes_processed, elapsed)
        );
    }
    #[cfg(not(feature = "logging"))]
    let _ = (stats, dry_run, elapsed);
}

fn log_analysis_summary(report: &AnalysisReport) {
    #[cfg(feature = "logging")]
    {
        for t in &report.tables {
            tracing::info!(
                "{}: insert={} create={} statements={} bytes={}",
                t.table_name,
                t.insert_count,
                t.create_count,
                t.statement_count,
                t.total_bytes
            );
        }
        tracing::info!(
            "统计完成，共 {} 个表，{} 条语句，{} 字节，耗时 {} ms，速度 {:.2} MB/s",
            report.table_count(),
            report.total_statements,
            report.total_bytes,
            report.elapsed_ms,
            throughput_mb(
                report.total_bytes,
                Duration::from_millis(report.elapsed_ms)
            )
        );
    }
    #[cfg(not(feature = "logging"))]
    let _ = report;
}

/// 根据配置构建导出器
pub fn build_exporters(config: &ExportConfig) -> Result<MultiExporter> {
    let mut multi = MultiExporter::new();

    #[cfg(feature = "exporter-csv")]
    for csv in &config.csv {
        multi.add_exporter(crate::exporter::CsvExporter::with_overwrite(
            &csv.out_path,
            csv.overwrite,
        )?);
    }
    #[cfg(not(feature = "exporter-csv"))]
    if !config.csv.is_empty() {
        #[cfg(feature = "logging")]
        tracing::warn!("未启用 exporter-csv 功能，忽略 CSV 导出配置");
    }

    #[cfg(feature = "exporter-json")]
    for json in &config.json {
        multi.add_exporter(crate::exporter::JsonExporter::with_options(
            &json.out_path,
            json.overwrite,
            json.pretty,
        )?);
    }
    #[cfg(not(feature = "exporter-json"))]
    if !config.json.is_empty() {
        #[cfg(feature = "logging")]
        tracing::warn!("未启用 exporter-json 功能，忽略 JSON 导出配置");
    }

    Ok(multi)
}

/// 把统计报告写到所有配置的导出目标
pub fn export_report(
    report: &AnalysisReport,
    config: &ExportConfig,
) -> Result<()> {
    let mut multi = build_exporters(config)?;
    if multi.is_empty() {
        return Ok(());
    }
    multi.export_batch(&report.tables);
    let result = multi.finalize_all();
    multi.log_stats_report();
    result
}
