//! StatementReader - 从字节流中按分号切分出完整的 SQL 语句
//!
//! 读取器每次从底层 `BufReader` 中窥视一整块数据（`fill_buf`），在内存中扫描
//! 终止符，然后只消费（`consume`）实际用掉的字节。这样 I/O 调用次数与块数而不是
//! 字节数成正比，这是多 GB 输入上的主要开销。
//!
//! 引号和注释状态在块边界之间保持，字符串或 `--` 注释跨越两个块时不会被错误切断。

use crate::error::{Result, SplitterError};
use crate::statement::pool::BufferPool;
use crate::statement::types::Statement;
use crate::statement::utils::{SMALL_BUFFER_SIZE, trim_whitespace};
use std::{
    io::{self, BufRead, BufReader, Read},
    sync::Arc,
};

/// 语句终止符
pub const STATEMENT_TERMINATOR: u8 = b';';

/// 扫描器状态：单引号、双引号是否打开，下一个字节是否被转义，
/// 以及是否位于 `--` 行注释中
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuoteState {
    single_quote_open: bool,
    double_quote_open: bool,
    escape_pending: bool,
    /// 上一个字节是字符串外的 `-`
    dash_pending: bool,
    line_comment: bool,
}

impl QuoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前是否位于字符串字面量内部
    #[inline]
    pub fn in_string(&self) -> bool {
        self.single_quote_open || self.double_quote_open
    }

    #[inline]
    pub fn escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// 当前是否位于 `--` 行注释内部
    #[inline]
    pub fn in_line_comment(&self) -> bool {
        self.line_comment
    }

    /// 处理一个字节，返回该字节是否结束了当前语句
    ///
    /// - 双引号未打开时，`'` 翻转单引号状态；
    /// - 单引号未打开时，`"` 翻转双引号状态；
    /// - 未被转义的 `\` 使下一个字节不参与引号翻转；
    /// - 字符串外的 `--` 开始行注释，注释中的引号和分号都被忽略，直到换行；
    /// - 两种引号都未打开时，`;` 结束语句。
    #[inline]
    pub fn advance(&mut self, b: u8) -> bool {
        if self.line_comment {
            if b == b'\n' {
                self.line_comment = false;
            }
            return false;
        }

        let dash_before = std::mem::take(&mut self.dash_pending);
        if !self.escape_pending {
            match b {
                b'\'' if !self.double_quote_open => {
                    self.single_quote_open = !self.single_quote_open;
                }
                b'"' if !self.single_quote_open => {
                    self.double_quote_open = !self.double_quote_open;
                }
                b'-' if !self.in_string() => {
                    if dash_before {
                        self.line_comment = true;
                        return false;
                    }
                    self.dash_pending = true;
                }
                _ => {}
            }
        }
        self.escape_pending = b == b'\\' && !self.escape_pending;

        if b == STATEMENT_TERMINATOR && !self.in_string() {
            self.escape_pending = false;
            return true;
        }
        false
    }

    /// 扫描一块数据，找到终止符时返回终止符之后的偏移量
    pub fn scan(&mut self, chunk: &[u8]) -> Option<usize> {
        chunk.iter().position(|&b| self.advance(b)).map(|i| i + 1)
    }
}

/// 从 Reader 中逐条读取 SQL 语句
///
/// 实现了 `Iterator`，遇到 I/O 错误后迭代结束。
///
/// # 示例
///
/// ```
/// use sqldump_splitter::statement::StatementReader;
///
/// let input = b"INSERT INTO t VALUES (1, 'a;b');\nINSERT INTO t VALUES (2, 'c');";
/// let mut reader = StatementReader::new(&input[..], 4096);
///
/// let first = reader.read_statement().unwrap().unwrap();
/// assert_eq!(first.as_bytes(), b"INSERT INTO t VALUES (1, 'a;b');");
/// let second = reader.read_statement().unwrap().unwrap();
/// assert_eq!(second.as_bytes(), b"\nINSERT INTO t VALUES (2, 'c');");
/// assert!(reader.read_statement().unwrap().is_none());
/// ```
pub struct StatementReader<R: Read> {
    reader: BufReader<R>,
    pool: Arc<BufferPool>,
    statements_read: u64,
    bytes_consumed: u64,
    failed: bool,
}

impl<R: Read> StatementReader<R> {
    /// 使用指定的读取块大小创建读取器
    pub fn new(reader: R, buffer_size: usize) -> Self {
        Self::with_pool(reader, buffer_size, BufferPool::shared())
    }

    /// 使用默认块大小（64KB）创建读取器
    pub fn with_default_buffer(reader: R) -> Self {
        Self::new(reader, SMALL_BUFFER_SIZE)
    }

    /// 使用共享的缓冲区池创建读取器
    pub fn with_pool(
        reader: R,
        buffer_size: usize,
        pool: Arc<BufferPool>,
    ) -> Self {
        Self {
            reader: BufReader::with_capacity(buffer_size.max(1), reader),
            pool,
            statements_read: 0,
            bytes_consumed: 0,
            failed: false,
        }
    }

    /// 读取下一条语句
    ///
    /// # 返回
    ///
    /// * `Ok(Some(Statement))` - 一条完整语句（含分号）；输入末尾缺少分号的语句也会返回
    /// * `Ok(None)` - 输入结束（末尾只剩空白时同样视为结束）
    /// * `Err(SplitterError::Read)` - 底层 I/O 错误，已读取的部分语句被丢弃
    pub fn read_statement(&mut self) -> Result<Option<Statement>> {
        let mut buf = self.pool.checkout();
        let found = self.fill_statement(&mut buf);

        let stmt = match found {
            Ok(true) => Some(Statement::new(buf.to_vec())),
            Ok(false) => None,
            Err(e) => {
                self.pool.checkin(buf);
                #[cfg(feature = "logging")]
                tracing::error!(
                    offset = self.bytes_consumed,
                    error = %e,
                    "读取语句时发生 I/O 错误"
                );
                return Err(SplitterError::Read(e));
            }
        };
        self.pool.checkin(buf);

        if stmt.is_some() {
            self.statements_read += 1;
        }
        Ok(stmt)
    }

    /// 将下一条语句的字节追加到 `buf`，返回是否读到了语句
    fn fill_statement(&mut self, buf: &mut Vec<u8>) -> io::Result<bool> {
        let mut state = QuoteState::new();

        loop {
            let chunk = match self.reader.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if chunk.is_empty() {
                if trim_whitespace(buf).is_empty() {
                    return Ok(false);
                }
                #[cfg(feature = "logging")]
                tracing::debug!(
                    len = buf.len(),
                    in_string = state.in_string(),
                    "输入末尾的语句缺少终止符"
                );
                return Ok(true);
            }

            match state.scan(chunk) {
                Some(end) => {
                    buf.extend_from_slice(&chunk[..end]);
                    self.reader.consume(end);
                    self.bytes_consumed += end as u64;
                    return Ok(true);
                }
                None => {
                    let len = chunk.len();
                    buf.extend_from_slice(chunk);
                    self.reader.consume(len);
                    self.bytes_consumed += len as u64;
                }
            }
        }
    }

    /// 已返回的语句数
    pub fn statements_read(&self) -> u64 {
        self.statements_read
    }

    /// 已从缓冲区消费的字节数
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// 取回底层 Reader
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read> Iterator for StatementReader<R> {
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_statement() {
            Ok(Some(stmt)) => Some(Ok(stmt)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
