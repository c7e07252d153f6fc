//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。
//! 所有致命错误都会携带足够的上下文（文件路径、表名），便于定位失败的目标。

use std::{io, path::PathBuf};

/// SQL 导出文件处理的结果类型
pub type Result<T> = std::result::Result<T, SplitterError>;

/// SQL 导出文件处理错误类型
#[derive(Debug, thiserror::Error)]
pub enum SplitterError {
    /// 输入文件无法打开
    #[error("无法打开输入文件 {}: {source}", .path.display())]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 输入文件元数据读取失败
    #[error("无法读取输入文件信息 {}: {source}", .path.display())]
    InputStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 读取语句时发生的 IO 错误（EOF 除外）
    #[error("读取语句失败: {0}")]
    Read(#[source] io::Error),

    /// 输出目录创建失败
    #[error("无法创建输出目录 {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 表输出文件创建失败
    #[error("无法为表 {table} 创建输出文件 {}: {source}", .path.display())]
    WriterCreate {
        table: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 写入表输出失败
    #[error("写入表 {table} 失败: {source}")]
    Write {
        table: String,
        #[source]
        source: io::Error,
    },

    /// 关闭表输出失败
    #[error("关闭表 {table} 的输出失败: {source}")]
    Close {
        table: String,
        #[source]
        source: io::Error,
    },

    /// 通用 IO 错误
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 配置文件解析错误
    #[error("配置解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// 配置序列化错误
    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON 序列化错误
    #[cfg(feature = "exporter-json")]
    #[error("JSON序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 日志错误（仅在启用 logging feature 时可用）
    #[cfg(feature = "logging")]
    #[error("日志错误: {0}")]
    Log(#[from] crate::logging::LogError),

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl SplitterError {
    /// 创建一个配置错误
    pub fn config<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        #[cfg(feature = "logging")]
        tracing::error!("未知错误: {}", message);
        Self::Other(message)
    }

    /// 创建表写入错误
    pub fn write<S: Into<String>>(table: S, source: io::Error) -> Self {
        let table = table.into();
        #[cfg(feature = "logging")]
        tracing::error!(table = %table, error = %source, "写入表输出失败");
        Self::Write { table, source }
    }

    /// 创建表关闭错误
    pub fn close<S: Into<String>>(table: S, source: io::Error) -> Self {
        let table = table.into();
        #[cfg(feature = "logging")]
        tracing::error!(table = %table, error = %source, "关闭表输出失败");
        Self::Close { table, source }
    }

    /// 检查是否为 IO 相关错误（包括读取和输入文件错误）
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            SplitterError::Io(_)
                | SplitterError::Read(_)
                | SplitterError::InputOpen { .. }
                | SplitterError::InputStat { .. }
        )
    }

    /// 检查是否为输出目标相关错误
    pub fn is_output_error(&self) -> bool {
        matches!(
            self,
            SplitterError::OutputDir { .. }
                | SplitterError::WriterCreate { .. }
                | SplitterError::Write { .. }
                | SplitterError::Close { .. }
        )
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SplitterError::Config(_)
                | SplitterError::TomlDe(_)
                | SplitterError::TomlSer(_)
        )
    }

    /// 出错的表名（仅输出相关错误携带）
    pub fn table(&self) -> Option<&str> {
        match self {
            SplitterError::WriterCreate { table, .. }
            | SplitterError::Write { table, .. }
            | SplitterError::Close { table, .. } => Some(table),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SplitterError::config("config missing");
        assert!(config_err.is_config_error());
        assert!(!config_err.is_io_error());

        let other = SplitterError::other("boom");
        assert!(matches!(other, SplitterError::Other(_)));
    }

    #[test]
    fn test_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SplitterError = io_err.into();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_error_display_contains_context() {
        let err = SplitterError::WriterCreate {
            table: "users".to_string(),
            path: PathBuf::from("out/users.sql"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        let display = format!("{}", err);
        assert!(display.contains("users"));
        assert!(display.contains("out/users.sql"));
        assert!(err.is_output_error());
        assert_eq!(err.table(), Some("users"));
    }

    #[test]
    fn test_read_error_is_io() {
        let err = SplitterError::Read(io::Error::other("disk"));
        assert!(err.is_io_error());
        assert_eq!(err.table(), None);
    }
}
