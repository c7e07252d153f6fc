//! 语句处理的工具函数与常量

/// 64KB，适合绝大多数文件（CPU 缓存友好）
pub const SMALL_BUFFER_SIZE: usize = 64 * 1024;

/// 256KB，仅用于超大文件
pub const MEDIUM_BUFFER_SIZE: usize = 256 * 1024;

/// 超过该大小的输入使用更大的读取块
pub const HUGE_INPUT_THRESHOLD: u64 = 1024 * 1024 * 1024;

/// 读取块大小分级表：(输入大小下限（不含）, 块大小)，按下限从大到小排列
const BUFFER_SIZE_TIERS: &[(u64, usize)] =
    &[(HUGE_INPUT_THRESHOLD, MEDIUM_BUFFER_SIZE), (0, SMALL_BUFFER_SIZE)];

/// 根据输入大小选择读取块大小
///
/// 实测较小的块在大部分输入上更快，只有超过 1GB 的输入才使用 256KB。
#[must_use]
pub fn determine_buffer_size(input_size: u64) -> usize {
    BUFFER_SIZE_TIERS
        .iter()
        .find(|&&(threshold, _)| input_size > threshold)
        .map_or(SMALL_BUFFER_SIZE, |&(_, size)| size)
}

/// SQL 中视为空白的字节
#[inline]
#[must_use]
pub const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// 去除首尾空白
#[must_use]
pub fn trim_whitespace(mut s: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = s {
        if is_whitespace(*first) {
            s = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = s {
        if is_whitespace(*last) {
            s = rest;
        } else {
            break;
        }
    }
    s
}

/// 跳过 `pos` 起的空白，返回第一个非空白字节的位置
#[inline]
#[must_use]
pub fn skip_whitespace(s: &[u8], mut pos: usize) -> usize {
    while pos < s.len() && is_whitespace(s[pos]) {
        pos += 1;
    }
    pos
}

/// 若 `s[pos..]` 以关键字开头（不区分大小写，且其后为空白），返回关键字之后的位置
#[must_use]
pub fn match_keyword(s: &[u8], pos: usize, keyword: &[u8]) -> Option<usize> {
    let end = pos + keyword.len();
    if end >= s.len() || !is_whitespace(s[end]) {
        return None;
    }
    s[pos..end].eq_ignore_ascii_case(keyword).then_some(end)
}

/// 去除开头的空白和 `--` 行注释
///
/// 注释一直延续到输入末尾时返回空切片。
#[must_use]
pub fn strip_leading_comments(mut s: &[u8]) -> &[u8] {
    loop {
        s = &s[skip_whitespace(s, 0)..];
        if !s.starts_with(b"--") {
            return s;
        }
        match s.iter().position(|&b| b == b'\n') {
            Some(pos) => s = &s[pos + 1..],
            None => return &[],
        }
    }
}

/// 按单词匹配多词关键字（不区分大小写），单词之间允许任意长度的空白
///
/// 匹配成功时返回关键字之后的位置。
#[must_use]
pub fn match_keyword_phrase(s: &[u8], keyword: &[u8]) -> Option<usize> {
    let mut pos = 0;
    for (i, word) in keyword.split(|&b| b == b' ').enumerate() {
        if i > 0 {
            let next = skip_whitespace(s, pos);
            if next == pos {
                return None;
            }
            pos = next;
        }
        let end = pos + word.len();
        if end > s.len() || !s[pos..end].eq_ignore_ascii_case(word) {
            return None;
        }
        pos = end;
    }
    Some(pos)
}

/// 将表名转换为可用的文件名：替换路径分隔符等不安全字符
#[must_use]
pub fn sanitize_file_stem(table_name: &str) -> String {
    let mut out: String = table_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if out.starts_with('.') {
        out.replace_range(0..1, "_");
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_tiers() {
        assert_eq!(determine_buffer_size(0), SMALL_BUFFER_SIZE);
        assert_eq!(determine_buffer_size(1024), SMALL_BUFFER_SIZE);
        assert_eq!(determine_buffer_size(50 * 1024 * 1024), SMALL_BUFFER_SIZE);
        assert_eq!(determine_buffer_size(500 * 1024 * 1024), SMALL_BUFFER_SIZE);
        assert_eq!(
            determine_buffer_size(HUGE_INPUT_THRESHOLD),
            SMALL_BUFFER_SIZE
        );
        assert_eq!(
            determine_buffer_size(HUGE_INPUT_THRESHOLD + 1),
            MEDIUM_BUFFER_SIZE
        );
    }

    #[test]
    fn test_trim_whitespace() {
        assert_eq!(trim_whitespace(b"  \n SELECT 1;\r\n"), b"SELECT 1;");
        assert_eq!(trim_whitespace(b" \t\n"), b"");
        assert_eq!(trim_whitespace(b""), b"");
        assert_eq!(trim_whitespace(b"x"), b"x");
    }

    #[test]
    fn test_match_keyword() {
        let s = b"if not exists users";
        assert_eq!(match_keyword(s, 0, b"IF"), Some(2));
        assert_eq!(match_keyword(s, 3, b"NOT"), Some(6));
        assert_eq!(match_keyword(b"ifx users", 0, b"IF"), None);
        assert_eq!(match_keyword(b"if", 0, b"IF"), None);
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("users"), "users");
        assert_eq!(sanitize_file_stem("a/b"), "a_b");
        assert_eq!(sanitize_file_stem("..\\evil"), "_._evil");
        assert_eq!(sanitize_file_stem("表一"), "表一");
        assert_eq!(sanitize_file_stem(""), "_");
    }

    #[test]
    fn test_strip_leading_comments() {
        assert_eq!(
            strip_leading_comments(b"--\n-- Table structure\n--\n\nDROP TABLE t;"),
            b"DROP TABLE t;"
        );
        assert_eq!(strip_leading_comments(b"  -- only a comment"), b"");
        assert_eq!(strip_leading_comments(b"SELECT 1; -- tail"), b"SELECT 1; -- tail");
        assert_eq!(strip_leading_comments(b"-1;"), b"-1;");
    }

    #[test]
    fn test_match_keyword_phrase() {
        assert_eq!(match_keyword_phrase(b"INSERT  INTO t", b"INSERT INTO"), Some(12));
        assert_eq!(match_keyword_phrase(b"create\n\tTABLE t", b"CREATE TABLE"), Some(13));
        assert_eq!(match_keyword_phrase(b"INSERTINTO t", b"INSERT INTO"), None);
        assert_eq!(match_keyword_phrase(b"CREATE VIEW v", b"CREATE TABLE"), None);
        assert_eq!(match_keyword_phrase(b"DROP", b"DROP TABLE"), None);
    }
}
