use serde::{Deserialize, Serialize};
use std::fmt;

/// 语句类型
///
/// `Unknown` 不携带表名，所有消费者都会直接丢弃它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum StatementKind {
    #[default]
    Unknown,
    CreateTable,
    Insert,
    CreateIndex,
    AlterTable,
    DropTable,
}

impl StatementKind {
    /// 是否为结构定义语句
    pub fn is_schema(self) -> bool {
        matches!(
            self,
            StatementKind::CreateTable
                | StatementKind::CreateIndex
                | StatementKind::AlterTable
                | StatementKind::DropTable
        )
    }

    /// 是否为数据语句
    pub fn is_data(self) -> bool {
        matches!(self, StatementKind::Insert)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatementKind::Unknown => "UNKNOWN",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::Insert => "INSERT",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::DropTable => "DROP TABLE",
        };
        f.write_str(s)
    }
}

/// 一条完整的 SQL 语句（包含结尾的分号）
///
/// 语句字节是从读取器的缓冲区中复制出来的，读取器可以立即复用自己的缓冲区。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statement {
    bytes: Vec<u8>,
}

impl Statement {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 语句是否以分号结尾（忽略末尾空白）
    pub fn is_terminated(&self) -> bool {
        self.bytes.trim_ascii_end().last() == Some(&b';')
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// 以 UTF-8 解释语句内容，无效字节会被替换
    pub fn to_string_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl AsRef<[u8]> for Statement {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Statement {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// 分类结果：语句类型、目标表名、语句字节长度
///
/// 不变式：当且仅当 `kind != Unknown` 时 `table_name` 存在，
/// 由构造函数保证。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedStatement {
    kind: StatementKind,
    table_name: Option<String>,
    byte_length: usize,
}

impl ClassifiedStatement {
    /// 已识别的语句
    pub fn known(
        kind: StatementKind,
        table_name: String,
        byte_length: usize,
    ) -> Self {
        if kind == StatementKind::Unknown {
            return Self::unknown(byte_length);
        }
        Self { kind, table_name: Some(table_name), byte_length }
    }

    /// 无法识别的语句
    pub fn unknown(byte_length: usize) -> Self {
        Self { kind: StatementKind::Unknown, table_name: None, byte_length }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == StatementKind::Unknown
    }

    /// 拆分为 (类型, 表名)，未知语句返回 `None`
    pub fn into_parts(self) -> Option<(StatementKind, String)> {
        let kind = self.kind;
        self.table_name.map(|name| (kind, name))
    }
}

/// 拆分时的内容过滤
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFilter {
    /// 所有已识别语句
    #[default]
    All,
    /// 只保留结构定义（CREATE TABLE / CREATE INDEX / ALTER / DROP）
    SchemaOnly,
    /// 只保留数据（INSERT）
    DataOnly,
}

impl ContentFilter {
    /// 判断该类型的语句是否通过过滤
    pub fn accepts(self, kind: StatementKind) -> bool {
        match self {
            ContentFilter::All => kind != StatementKind::Unknown,
            ContentFilter::SchemaOnly => kind.is_schema(),
            ContentFilter::DataOnly => kind.is_data(),
        }
    }
}
