//! 拆分模式：把 SQL 导出文件按表拆分为多个文件
//!
//! 主循环：读取语句 → 分类 → 表过滤 → 内容过滤 → 写入对应表的输出。
//! 输出目录中每个表一个 `<表名>.sql`，语句按出现顺序写入，每条后跟一个换行。
//!
//! ```text
//! Initializing → Streaming → Draining → Done
//!                    │            │
//!                    └──→ Failed ←┘
//! ```

use crate::error::Result;
use crate::input::{Compression, open_input, wrap_input};
use crate::progress::ProgressCallback;
use crate::statement::{
    ContentFilter, StatementReader, classify, determine_buffer_size,
};
use crate::writer::WriterPool;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// 拆分运行的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SplitState {
    #[default]
    Initializing,
    Streaming,
    Draining,
    Done,
    Failed,
}

/// 一次拆分运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// 路由到表的语句数（dry run 时为将要路由的语句数）
    pub statements_processed: u64,
    /// 出现过的不同表数量
    pub tables_found: usize,
    /// 路由语句的总字节数
    pub bytes_processed: u64,
    /// 表名，按首次出现顺序
    pub table_names: Vec<String>,
    /// 读取到的全部语句数，包括被跳过的
    pub statements_read: u64,
}

/// SQL 导出文件拆分器
pub struct Splitter {
    input: PathBuf,
    pool: WriterPool,
    table_filter: Option<HashSet<String>>,
    content_filter: ContentFilter,
    dry_run: bool,
    buffer_size: Option<usize>,
    progress: Option<ProgressCallback>,
    stats: Mutex<RunStats>,
    state: Mutex<SplitState>,
}

impl Splitter {
    pub fn new<I, O>(input: I, output_dir: O) -> Self
    where
        I: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Self {
            input: input.into(),
            pool: WriterPool::new(output_dir),
            table_filter: None,
            content_filter: ContentFilter::All,
            dry_run: false,
            buffer_size: None,
            progress: None,
            stats: Mutex::new(RunStats::default()),
            state: Mutex::new(SplitState::Initializing),
        }
    }

    /// 只拆分指定的表；空列表表示不过滤
    pub fn with_table_filter<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = tables.into_iter().map(Into::into).collect();
        self.table_filter = (!set.is_empty()).then_some(set);
        self
    }

    /// 只分析不写文件
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn with_content_filter(mut self, filter: ContentFilter) -> Self {
        self.content_filter = filter;
        self
    }

    /// 固定读取块大小，不再按输入大小选择
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        self.pool.output_dir()
    }

    /// 当前统计的快照
    pub fn stats(&self) -> RunStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn state(&self) -> SplitState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SplitState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// 拆分输入文件；`.gz`、`.bz2`、`.xz`、`.zst` 输入会先解压
    pub fn split(&self) -> Result<RunStats> {
        let (file, size) = open_input(&self.input)?;
        self.split_compressed(file, size, Compression::from_path(&self.input))
    }

    /// 拆分任意 Reader；`size_hint` 用于选择读取块大小
    pub fn split_reader<R: Read>(
        &self,
        reader: R,
        size_hint: u64,
    ) -> Result<RunStats> {
        self.split_compressed(reader, size_hint, Compression::None)
    }

    /// 拆分按 `compression` 压缩的 Reader
    pub fn split_compressed<'a, R: Read + 'a>(
        &self,
        reader: R,
        size_hint: u64,
        compression: Compression,
    ) -> Result<RunStats> {
        self.set_state(SplitState::Initializing);
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) =
            RunStats::default();

        if !self.dry_run {
            if let Err(e) = self.pool.ensure_output_dir() {
                self.set_state(SplitState::Failed);
                return Err(e);
            }
        }

        let buffer_size = self
            .buffer_size
            .unwrap_or_else(|| determine_buffer_size(size_hint));

        #[cfg(feature = "logging")]
        tracing::info!(
            input = %self.input.display(),
            output = %self.pool.output_dir().display(),
            size = size_hint,
            buffer_size,
            %compression,
            dry_run = self.dry_run,
            "开始拆分"
        );

        self.set_state(SplitState::Streaming);
        let streamed =
            wrap_input(reader, self.progress.as_ref(), compression)
                .and_then(|source| self.stream(source, buffer_size));

        if let Err(e) = streamed {
            // 尽量把已写入的内容落盘
            if let Err(_close_err) = self.pool.close_all() {
                #[cfg(feature = "logging")]
                tracing::warn!(error = %_close_err, "中止后关闭写入器失败");
            }
            self.set_state(SplitState::Failed);
            return Err(e);
        }

        self.set_state(SplitState::Draining);
        if let Err(e) = self.pool.close_all() {
            self.set_state(SplitState::Failed);
            return Err(e);
        }
        self.set_state(SplitState::Done);

        let stats = self.stats();
        #[cfg(feature = "logging")]
        tracing::info!(
            tables = stats.tables_found,
            statements = stats.statements_processed,
            bytes = stats.bytes_processed,
            "拆分完成"
        );
        Ok(stats)
    }

    fn stream<R: Read>(&self, reader: R, buffer_size: usize) -> Result<()> {
        let mut reader = StatementReader::new(reader, buffer_size);
        let mut seen: HashSet<String> = HashSet::new();

        while let Some(stmt) = reader.read_statement()? {
            self.stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .statements_read += 1;

            let Some((kind, table)) = classify(stmt.as_bytes()).into_parts()
            else {
                continue;
            };

            if let Some(filter) = &self.table_filter {
                if !filter.contains(&table) {
                    continue;
                }
            }
            if !self.content_filter.accepts(kind) {
                continue;
            }

            if !self.dry_run {
                let writer = self.pool.get_writer(&table)?;
                self.pool.write(&writer, stmt.as_bytes())?;
            }

            let mut stats =
                self.stats.lock().unwrap_or_else(PoisonError::into_inner);
            if !seen.contains(&table) {
                #[cfg(feature = "logging")]
                tracing::debug!(table = %table, "发现新表");
                seen.insert(table.clone());
                stats.tables_found += 1;
                stats.table_names.push(table);
            }
            stats.statements_processed += 1;
            stats.bytes_processed += stmt.len() as u64;
        }

        Ok(())
    }
}
