//! # sqldump-splitter
//!
//! 大型 SQL 导出文件（mysqldump 等）的流式处理库：
//!
//! - 按分号切分语句，正确处理单双引号和反斜杠转义，块边界安全；
//! - 识别 CREATE TABLE / INSERT / CREATE INDEX / ALTER TABLE / DROP TABLE
//!   语句及其目标表；
//! - **拆分模式**：每个表写入一个独立的 `.sql` 文件；
//! - **统计模式**：按表汇总语句数和字节数，并可导出为 CSV / JSON；
//! - 按扩展名直接读取 `.gz`、`.bz2`、`.xz`、`.zst` 压缩的导出文件。
//!
//! 整个处理过程只保留一条语句在内存中，适合多 GB 的输入。
//!
//! ## 快速开始
//!
//! ```no_run
//! use sqldump_splitter::{Analyzer, Splitter};
//!
//! let stats = Splitter::new("dump.sql", "tables")
//!     .with_table_filter(["users", "orders"])
//!     .split()?;
//! println!("拆分出 {} 个表", stats.tables_found);
//!
//! for t in Analyzer::new("dump.sql").analyze()? {
//!     println!("{}: {} 条 INSERT", t.table_name, t.insert_count);
//! }
//! # Ok::<(), sqldump_splitter::SplitterError>(())
//! ```
//!
//! ## 功能特性
//!
//! - `logging`（默认）：基于 tracing 的日志
//! - `compression`（默认）：读取 gzip / bzip2 / xz / zstd 压缩的导出文件
//! - `exporter-csv`（默认）：CSV 统计导出
//! - `exporter-json`（默认）：JSON 统计导出

pub mod analyzer;
pub mod app;
pub mod config;
pub mod error;
pub mod exporter;
pub mod input;
#[cfg(feature = "logging")]
pub mod logging;
pub mod progress;
pub mod splitter;
pub mod statement;
pub mod writer;

pub use analyzer::{AnalysisReport, Analyzer, TableStats};
pub use config::Config;
pub use error::{Result, SplitterError};
pub use input::Compression;
pub use progress::{ProgressCallback, ProgressReader};
pub use splitter::{RunStats, SplitState, Splitter};
pub use statement::{
    ClassifiedStatement, ContentFilter, Statement, StatementKind,
    StatementReader, classify, determine_buffer_size,
};
pub use writer::{TableWriter, WriterPool};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
