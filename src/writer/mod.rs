//! 按表输出的写入器池
//!
//! 每个表对应一个 [`TableWriter`]，首次遇到该表时才创建输出文件。
//! [`WriterPool`] 用读写锁保存 表名 → 写入器 的映射，查找走读锁，
//! 未命中时加写锁并再次检查，保证同一个表只会创建一个写入器。
//! 池同时记录已占用的输出路径，不同表名清洗后落到同一文件名时，
//! 后出现的表改用 `<名称>_2.sql` 这样的文件名。
//!
//! 写入器每写入 [`STMT_FLUSH_COUNT`] 条语句刷新一次缓冲区，
//! 运行中断时已刷新的内容会留在磁盘上，不同表之间没有原子性保证。

use crate::error::{Result, SplitterError};
use crate::statement::sanitize_file_stem;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// 单个表写入器的缓冲区大小
pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// 每写入多少条语句强制刷新一次
pub const STMT_FLUSH_COUNT: u64 = 100;

/// 输出文件扩展名
pub const OUTPUT_EXTENSION: &str = "sql";

/// 共享的写入器句柄
pub type TableWriterHandle = Arc<Mutex<TableWriter>>;

/// 单个表的缓冲写入器
#[derive(Debug)]
pub struct TableWriter {
    table: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    write_count: u64,
}

impl TableWriter {
    /// 创建（或截断）表的输出文件
    pub fn create<P: AsRef<Path>>(table: &str, path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| {
            #[cfg(feature = "logging")]
            tracing::error!(
                table = table,
                path = %path.display(),
                error = %source,
                "创建表输出文件失败"
            );
            SplitterError::WriterCreate {
                table: table.to_string(),
                path: path.clone(),
                source,
            }
        })?;

        #[cfg(feature = "logging")]
        tracing::debug!(table = table, path = %path.display(), "创建表输出文件");

        Ok(Self {
            table: table.to_string(),
            path,
            writer: Some(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file)),
            write_count: 0,
        })
    }

    /// 追加一条语句和换行符，每 [`STMT_FLUSH_COUNT`] 条刷新一次
    pub fn write_statement(&mut self, stmt: &[u8]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(SplitterError::write(
                self.table.as_str(),
                io::Error::other("写入器已关闭"),
            ));
        };

        writer
            .write_all(stmt)
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| SplitterError::write(self.table.as_str(), e))?;

        self.write_count += 1;
        if self.write_count % STMT_FLUSH_COUNT == 0 {
            writer
                .flush()
                .map_err(|e| SplitterError::write(self.table.as_str(), e))?;
        }
        Ok(())
    }

    /// 立即刷新缓冲区
    pub fn flush(&mut self) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| SplitterError::write(self.table.as_str(), e)),
            None => Ok(()),
        }
    }

    /// 刷新并关闭输出文件；重复调用不做任何事
    pub fn close(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        let file = writer.into_inner().map_err(|e| {
            SplitterError::close(self.table.as_str(), e.into_error())
        })?;
        drop(file);

        #[cfg(feature = "logging")]
        tracing::debug!(
            table = %self.table,
            writes = self.write_count,
            "表输出已关闭"
        );
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 已写入的语句数
    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

/// 表名到写入器的映射，负责输出目录和文件命名
#[derive(Debug)]
pub struct WriterPool {
    output_dir: PathBuf,
    state: RwLock<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    writers: HashMap<String, TableWriterHandle>,
    /// 已被占用的输出路径，不区分大小写
    claimed: HashSet<String>,
}

impl PoolState {
    fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains(&path_key(path))
    }
}

/// 路径占用表的键；统一小写，兼容大小写不敏感的文件系统
fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

impl WriterPool {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            state: RwLock::new(PoolState::default()),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 创建输出目录（含父目录）
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|source| {
            #[cfg(feature = "logging")]
            tracing::error!(
                path = %self.output_dir.display(),
                error = %source,
                "创建输出目录失败"
            );
            SplitterError::OutputDir { path: self.output_dir.clone(), source }
        })
    }

    /// 表对应的默认输出文件路径：`<output_dir>/<表名>.sql`
    ///
    /// 文件名中的不安全字符会被替换，表名本身不变。
    /// 清洗后与其他表冲突时，实际路径见 [`WriterPool::writer_path`]。
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{OUTPUT_EXTENSION}", sanitize_file_stem(table)))
    }

    /// 选择一个未被占用的路径：默认路径被占用时依次尝试 `<名称>_2.sql`、`<名称>_3.sql` ...
    fn unique_path(&self, state: &PoolState, table: &str) -> PathBuf {
        let base = self.path_for(table);
        if !state.is_claimed(&base) {
            return base;
        }

        let stem = sanitize_file_stem(table);
        let path = (2u64..)
            .map(|n| {
                self.output_dir.join(format!("{stem}_{n}.{OUTPUT_EXTENSION}"))
            })
            .find(|candidate| !state.is_claimed(candidate))
            .unwrap_or(base);

        #[cfg(feature = "logging")]
        tracing::warn!(
            table = table,
            path = %path.display(),
            "表的文件名与其他表冲突，改用新的文件名"
        );
        path
    }

    /// 获取表的写入器，不存在时在默认路径创建
    ///
    /// 两个表名清洗后得到相同文件名时，后出现的表使用带序号的文件名。
    pub fn get_writer(&self, table: &str) -> Result<TableWriterHandle> {
        self.get_or_create(table, |state| Ok(self.unique_path(state, table)))
    }

    /// 获取表的写入器，不存在时在 `path` 创建
    ///
    /// `path` 已被其他表占用时返回 [`SplitterError::WriterCreate`]。
    pub fn get_writer_at<P: AsRef<Path>>(
        &self,
        table: &str,
        path: P,
    ) -> Result<TableWriterHandle> {
        let path = path.as_ref();
        self.get_or_create(table, |state| {
            if state.is_claimed(path) {
                return Err(SplitterError::WriterCreate {
                    table: table.to_string(),
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "输出文件已被其他表占用",
                    ),
                });
            }
            Ok(path.to_path_buf())
        })
    }

    /// 读锁快速路径；未命中时加写锁并再次检查，并发调用只会创建一个写入器。
    /// 路径的选择和占用都在同一把写锁下完成。
    fn get_or_create<F>(
        &self,
        table: &str,
        choose_path: F,
    ) -> Result<TableWriterHandle>
    where
        F: FnOnce(&PoolState) -> Result<PathBuf>,
    {
        {
            let state =
                self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(writer) = state.writers.get(table) {
                return Ok(Arc::clone(writer));
            }
        }

        let mut state =
            self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(writer) = state.writers.get(table) {
            return Ok(Arc::clone(writer));
        }

        let path = choose_path(&*state)?;
        let writer = Arc::new(Mutex::new(TableWriter::create(table, &path)?));
        state.claimed.insert(path_key(&path));
        state.writers.insert(table.to_string(), Arc::clone(&writer));
        Ok(writer)
    }

    /// 表当前写入器的输出路径
    pub fn writer_path(&self, table: &str) -> Option<PathBuf> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.writers.get(table).map(|writer| {
            writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .path()
                .to_path_buf()
        })
    }

    /// 通过句柄写入一条语句
    pub fn write(&self, writer: &TableWriterHandle, stmt: &[u8]) -> Result<()> {
        writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_statement(stmt)
    }

    /// 按表名写入，必要时创建写入器
    pub fn write_table(&self, table: &str, stmt: &[u8]) -> Result<()> {
        let writer = self.get_writer(table)?;
        self.write(&writer, stmt)
    }

    /// 刷新并关闭所有写入器
    ///
    /// 每个写入器都会尝试关闭，即使前面的关闭失败；返回第一个错误，
    /// 其余错误只记录日志。关闭后池被清空。
    pub fn close_all(&self) -> Result<()> {
        let mut drained: Vec<(String, TableWriterHandle)> = {
            let mut state =
                self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.claimed.clear();
            state.writers.drain().collect()
        };
        drained.sort_by(|a, b| a.0.cmp(&b.0));

        let mut first_error = None;
        for (table, writer) in drained {
            let result =
                writer.lock().unwrap_or_else(PoisonError::into_inner).close();
            if let Err(e) = result {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    #[cfg(feature = "logging")]
                    tracing::warn!(table = %table, error = %e, "关闭写入器失败");
                }
            }
            #[cfg(not(feature = "logging"))]
            let _ = table;
        }

        first_error.map_or(Ok(()), Err)
    }

    /// 当前打开的写入器数量
    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已创建写入器的表名（按名称排序）
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .writers
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_write_appends_newline_in_order() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path());
        pool.write_table("users", b"INSERT INTO users VALUES (1);").unwrap();
        pool.write_table("users", b"\nINSERT INTO users VALUES (2);").unwrap();
        pool.close_all().unwrap();

        let content = fs::read_to_string(dir.path().join("users.sql")).unwrap();
        assert_eq!(
            content,
            "INSERT INTO users VALUES (1);\n\nINSERT INTO users VALUES (2);\n"
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn test_flush_every_hundred_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.sql");
        let mut writer = TableWriter::create("t", &path).unwrap();

        for _ in 0..STMT_FLUSH_COUNT - 1 {
            writer.write_statement(b"x;").unwrap();
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        writer.write_statement(b"x;").unwrap();
        assert_eq!(
            fs::metadata(&path).unwrap().len(),
            STMT_FLUSH_COUNT * 3
        );
        assert_eq!(writer.write_count(), STMT_FLUSH_COUNT);
        writer.close().unwrap();
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_writes() {
        let dir = tempdir().unwrap();
        let mut writer =
            TableWriter::create("t", dir.path().join("t.sql")).unwrap();
        writer.write_statement(b"a;").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());

        let err = writer.write_statement(b"b;").unwrap_err();
        assert_eq!(err.table(), Some("t"));
        assert_eq!(
            fs::read_to_string(dir.path().join("t.sql")).unwrap(),
            "a;\n"
        );
    }

    #[test]
    fn test_concurrent_get_writer_creates_one_instance() {
        let dir = tempdir().unwrap();
        let pool = Arc::new(WriterPool::new(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || pool.get_writer("users").unwrap())
            })
            .collect();
        let writers: Vec<TableWriterHandle> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(writers.iter().all(|w| Arc::ptr_eq(w, &writers[0])));
        assert_eq!(pool.len(), 1);
        pool.close_all().unwrap();
    }

    #[test]
    fn test_missing_output_dir_reports_table() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path().join("missing"));
        let err = pool.get_writer("orders").unwrap_err();
        assert!(matches!(err, SplitterError::WriterCreate { .. }));
        assert_eq!(err.table(), Some("orders"));

        pool.ensure_output_dir().unwrap();
        assert!(pool.get_writer("orders").is_ok());
        pool.close_all().unwrap();
    }

    #[test]
    fn test_path_for_sanitizes_file_name_only() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path());
        assert_eq!(pool.path_for("users"), dir.path().join("users.sql"));
        assert_eq!(pool.path_for("../etc"), dir.path().join("_._etc.sql"));

        pool.write_table("a/b", b"x;").unwrap();
        assert_eq!(pool.table_names(), vec!["a/b".to_string()]);
        pool.close_all().unwrap();
        assert!(dir.path().join("a_b.sql").exists());
    }

    #[test]
    fn test_colliding_file_names_get_distinct_files() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path());
        pool.write_table("a_b", b"INSERT INTO a_b VALUES (1);").unwrap();
        pool.write_table("a/b", b"INSERT INTO `a/b` VALUES (2);").unwrap();
        pool.write_table("A_B", b"INSERT INTO A_B VALUES (3);").unwrap();

        assert_eq!(pool.writer_path("a_b"), Some(dir.path().join("a_b.sql")));
        assert_eq!(pool.writer_path("a/b"), Some(dir.path().join("a_b_2.sql")));
        assert_eq!(pool.writer_path("A_B"), Some(dir.path().join("A_B_3.sql")));
        pool.close_all().unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("a_b.sql")).unwrap(),
            "INSERT INTO a_b VALUES (1);\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("a_b_2.sql")).unwrap(),
            "INSERT INTO `a/b` VALUES (2);\n"
        );
    }

    #[test]
    fn test_explicit_path_already_claimed() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path());
        let shared = dir.path().join("shared.sql");
        pool.get_writer_at("first", &shared).unwrap();

        let err = pool.get_writer_at("second", &shared).unwrap_err();
        assert!(matches!(err, SplitterError::WriterCreate { .. }));
        assert_eq!(err.table(), Some("second"));

        // 关闭后路径释放
        pool.close_all().unwrap();
        assert!(pool.get_writer_at("second", &shared).is_ok());
        pool.close_all().unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_close_all_closes_remaining_writers_after_failure() {
        let dir = tempdir().unwrap();
        let pool = WriterPool::new(dir.path());

        // /dev/full 上的刷新总是以 ENOSPC 失败
        let full = pool.get_writer_at("a_full", "/dev/full").unwrap();
        pool.write(&full, b"INSERT INTO a_full VALUES (1);").unwrap();
        pool.write_table("b_ok", b"INSERT INTO b_ok VALUES (1);").unwrap();
        pool.write_table("b_ok", b"INSERT INTO b_ok VALUES (2);").unwrap();

        let err = pool.close_all().unwrap_err();
        assert!(matches!(err, SplitterError::Close { .. }));
        assert_eq!(err.table(), Some("a_full"));
        assert!(pool.is_empty());

        assert_eq!(
            fs::read_to_string(dir.path().join("b_ok.sql")).unwrap(),
            "INSERT INTO b_ok VALUES (1);\nINSERT INTO b_ok VALUES (2);\n"
        );
        assert!(full.lock().unwrap().is_closed());
    }
}
