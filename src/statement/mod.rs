//! SQL 语句读取与分类
//!
//! - [`reader`]：按引号感知的规则从字节流中切分语句
//! - [`classifier`]：识别语句类型和目标表名
//! - [`pool`]：语句缓冲区复用
//! - [`utils`]：读取块大小策略等工具函数

pub mod classifier;
pub mod pool;
pub mod reader;
pub mod types;
pub mod utils;

pub use classifier::classify;
pub use pool::BufferPool;
pub use reader::{QuoteState, STATEMENT_TERMINATOR, StatementReader};
pub use types::{ClassifiedStatement, ContentFilter, Statement, StatementKind};
pub use utils::{
    MEDIUM_BUFFER_SIZE, SMALL_BUFFER_SIZE, determine_buffer_size,
    sanitize_file_stem,
};
