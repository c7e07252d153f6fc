//! 语句分类：识别语句类型并提取目标表名
//!
//! 常见语句走手写扫描器，扫描失败时再回退到正则表达式。
//! 语句开头的 `--` 注释行（mysqldump、pg_dump 的表头注释）在匹配前被跳过。
//! 无法识别的语句归为 `Unknown`，由调用方直接丢弃。

use crate::statement::types::{ClassifiedStatement, StatementKind};
use crate::statement::utils::{
    is_whitespace, match_keyword, match_keyword_phrase, skip_whitespace,
    strip_leading_comments, trim_whitespace,
};
use lazy_static::lazy_static;
use regex::bytes::Regex;

/// 参与关键字匹配的前缀长度
const PREFIX_LEN: usize = 20;

/// 最短可识别语句长度
const MIN_STATEMENT_LEN: usize = 6;

/// 关键字表，较长的前缀排在前面
const KEYWORDS: &[(&[u8], StatementKind)] = &[
    (b"CREATE TABLE", StatementKind::CreateTable),
    (b"INSERT INTO", StatementKind::Insert),
    (b"CREATE UNIQUE INDEX", StatementKind::CreateIndex),
    (b"CREATE INDEX", StatementKind::CreateIndex),
    (b"ALTER TABLE", StatementKind::AlterTable),
    (b"DROP TABLE", StatementKind::DropTable),
];

lazy_static! {
    static ref CREATE_TABLE_RE: Regex = Regex::new(
        r#"(?i)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#
    ).unwrap();
    static ref INSERT_INTO_RE: Regex = Regex::new(
        r#"(?i)^\s*INSERT\s+INTO\s+(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#
    ).unwrap();
    static ref CREATE_INDEX_RE: Regex = Regex::new(
        r#"(?i)\bON\s+(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#
    ).unwrap();
    static ref ALTER_TABLE_RE: Regex = Regex::new(
        r#"(?i)^\s*ALTER\s+TABLE\s+(?:ONLY\s+)?(?:IF\s+EXISTS\s+)?(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#
    ).unwrap();
    static ref DROP_TABLE_RE: Regex = Regex::new(
        r#"(?i)^\s*DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:[`"]?\w+[`"]?\s*\.\s*)?[`"]?(\w+)[`"]?"#
    ).unwrap();
}

/// 对一条语句进行分类
///
/// `byte_length` 记录的是原始语句（含首尾空白）的长度。
///
/// # 示例
///
/// ```
/// use sqldump_splitter::statement::{StatementKind, classify};
///
/// let c = classify(b"CREATE TABLE `users` (id INT);");
/// assert_eq!(c.kind(), StatementKind::CreateTable);
/// assert_eq!(c.table_name(), Some("users"));
///
/// assert!(classify(b"SELECT * FROM users;").is_unknown());
/// ```
pub fn classify(stmt: &[u8]) -> ClassifiedStatement {
    let byte_length = stmt.len();
    let trimmed = trim_whitespace(strip_leading_comments(stmt));
    if trimmed.len() < MIN_STATEMENT_LEN {
        return ClassifiedStatement::unknown(byte_length);
    }

    let prefix = trimmed[..trimmed.len().min(PREFIX_LEN)].to_ascii_uppercase();
    let matched = KEYWORDS
        .iter()
        .find(|(kw, _)| prefix.starts_with(kw))
        .map(|&(kw, kind)| (kind, kw.len()))
        .or_else(|| match_spaced_keyword(trimmed, &prefix));
    let Some((kind, offset)) = matched else {
        return ClassifiedStatement::unknown(byte_length);
    };

    match extract_table_name(trimmed, kind, offset) {
        Some(name) => ClassifiedStatement::known(kind, name, byte_length),
        None => {
            #[cfg(feature = "logging")]
            tracing::trace!(%kind, "无法提取表名，语句归为 Unknown");
            ClassifiedStatement::unknown(byte_length)
        }
    }
}

/// 关键字单词之间不是单个空格时（`INSERT  INTO`、`CREATE\nTABLE`）的慢路径
///
/// 只有前缀以某个关键字的第一个单词开头时才逐词匹配。
fn match_spaced_keyword(
    stmt: &[u8],
    prefix: &[u8],
) -> Option<(StatementKind, usize)> {
    KEYWORDS
        .iter()
        .filter(|(kw, _)| {
            kw.split(|&b| b == b' ')
                .next()
                .is_some_and(|first| prefix.starts_with(first))
        })
        .find_map(|&(kw, kind)| {
            match_keyword_phrase(stmt, kw).map(|end| (kind, end))
        })
}

/// 从关键字之后提取表名：先手动扫描，失败时回退到正则
fn extract_table_name(
    stmt: &[u8],
    kind: StatementKind,
    offset: usize,
) -> Option<String> {
    let scanned = match kind {
        StatementKind::CreateIndex => scan_index_table(stmt, offset),
        _ => scan_table_name(stmt, offset),
    };
    if let Some(name) = scanned {
        return Some(String::from_utf8_lossy(name).into_owned());
    }

    let re: &Regex = match kind {
        StatementKind::CreateTable => &CREATE_TABLE_RE,
        StatementKind::Insert => &INSERT_INTO_RE,
        StatementKind::CreateIndex => &CREATE_INDEX_RE,
        StatementKind::AlterTable => &ALTER_TABLE_RE,
        StatementKind::DropTable => &DROP_TABLE_RE,
        StatementKind::Unknown => return None,
    };

    #[cfg(feature = "logging")]
    tracing::trace!(%kind, "手动扫描失败，回退到正则匹配");

    re.captures(stmt)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}

/// 关键字后紧跟表名的语句
fn scan_table_name(stmt: &[u8], offset: usize) -> Option<&[u8]> {
    let pos = skip_table_modifiers(stmt, skip_whitespace(stmt, offset));
    scan_qualified_name(stmt, pos).map(|(name, _)| name)
}

/// `CREATE [UNIQUE] INDEX [IF NOT EXISTS] <index> ON <table>`
fn scan_index_table(stmt: &[u8], offset: usize) -> Option<&[u8]> {
    let pos = skip_table_modifiers(stmt, skip_whitespace(stmt, offset));
    let (_, index_end) = scan_qualified_name(stmt, pos)?;
    let on_end = match_keyword(stmt, skip_whitespace(stmt, index_end), b"ON")?;
    scan_qualified_name(stmt, skip_whitespace(stmt, on_end))
        .map(|(name, _)| name)
}

/// 跳过 `ONLY`、`IF EXISTS`、`IF NOT EXISTS` 修饰
fn skip_table_modifiers(stmt: &[u8], pos: usize) -> usize {
    let pos = match match_keyword(stmt, pos, b"ONLY") {
        Some(end) => skip_whitespace(stmt, end),
        None => pos,
    };

    let Some(if_end) = match_keyword(stmt, pos, b"IF") else {
        return pos;
    };
    let mut cursor = skip_whitespace(stmt, if_end);
    if let Some(not_end) = match_keyword(stmt, cursor, b"NOT") {
        cursor = skip_whitespace(stmt, not_end);
    }
    match match_keyword(stmt, cursor, b"EXISTS") {
        Some(end) => skip_whitespace(stmt, end),
        // 表名恰好叫 if
        None => pos,
    }
}

/// 扫描可能带模式限定的名称，返回最后一段及其结束位置
fn scan_qualified_name(stmt: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    let (mut name, mut end) = scan_identifier(stmt, pos)?;
    while stmt.get(end) == Some(&b'.') {
        (name, end) = scan_identifier(stmt, end + 1)?;
    }
    Some((name, end))
}

/// 扫描单个标识符，返回去掉引号的名称和标识符之后的位置
///
/// 支持裸标识符、反引号和双引号三种形式；引号未闭合或名称为空时返回 `None`。
fn scan_identifier(stmt: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    match *stmt.get(pos)? {
        quote @ (b'`' | b'"') => {
            let start = pos + 1;
            let len = stmt[start..].iter().position(|&b| b == quote)?;
            (len > 0).then(|| (&stmt[start..start + len], start + len + 1))
        }
        _ => {
            let rest = &stmt[pos..];
            let len = rest
                .iter()
                .position(|&b| {
                    is_whitespace(b) || matches!(b, b'(' | b';' | b',' | b'.')
                })
                .unwrap_or(rest.len());
            (len > 0).then(|| (&rest[..len], pos + len))
        }
    }
}
