//! 日志初始化和配置模块
//!
//! 这个模块提供了统一的日志初始化功能，使用 tracing 库。
//! 默认配置：info 级别，输出到控制台和 logs 目录，按天滚动。

use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志配置结构体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: Level,
    /// 是否输出到控制台
    pub enable_stdout: bool,
    /// 日志文件目录，`None` 表示不写文件
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    /// 创建新的日志配置，使用默认值
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 设置是否输出到控制台
    pub fn stdout(mut self, enable: bool) -> Self {
        self.enable_stdout = enable;
        self
    }

    /// 设置日志文件目录
    pub fn log_dir<P: Into<PathBuf>>(mut self, dir: Option<P>) -> Self {
        self.log_dir = dir.map(Into::into);
        self
    }

    /// 从配置文件中的日志段构造
    ///
    /// 级别字符串在 [`crate::config::Config::validate`] 中已校验，
    /// 无法识别时回退到 INFO。
    pub fn from_settings(settings: &crate::config::LogSettings) -> Self {
        let level = parse_level(&settings.level).unwrap_or(Level::INFO);
        let log_dir = if settings.log_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&settings.log_dir))
        };
        Self { level, enable_stdout: settings.enable_stdout, log_dir }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            enable_stdout: true,
            log_dir: Some(PathBuf::from("logs")),
        }
    }
}

/// 解析日志级别字符串（不区分大小写）
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
    #[error("日志配置错误: {0}")]
    Config(String),
    #[error("日志初始化错误: {0}")]
    Init(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - 控制台输出层（可关闭）
/// - 文件输出层：`log_dir` 下按天滚动的 `sqldump-splitter` 日志
/// - `RUST_LOG` 环境变量优先于配置的级别
///
/// 重复初始化不视为错误。
///
/// # Examples
///
/// ```no_run
/// use sqldump_splitter::logging::{init_logging, LogConfig};
/// use tracing::Level;
///
/// let config = LogConfig::new().level(Level::DEBUG);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> LogResult<()> {
    if !config.enable_stdout && config.log_dir.is_none() {
        return Err(LogError::Config(
            "控制台和文件输出均已关闭".to_string(),
        ));
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if config.enable_stdout {
        layers.push(
            fmt::layer()
                .with_timer(SystemTime)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .boxed(),
        );
    }

    let mut guard = None;
    if let Some(dir) = config.log_dir.as_ref() {
        std::fs::create_dir_all(dir)?;
        let file_appender =
            tracing_appender::rolling::daily(dir, "sqldump-splitter");
        let (non_blocking, g) = tracing_appender::non_blocking(file_appender);
        guard = Some(g);
        layers.push(
            fmt::layer()
                .with_writer(non_blocking)
                .with_timer(SystemTime)
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false) // 文件中不使用颜色
                .boxed(),
        );
    }

    let subscriber = Registry::default().with(layers).with(env_filter);

    match subscriber.try_init() {
        Ok(()) => {
            // appender 的 guard 需要存活到进程结束
            if let Some(g) = guard {
                std::mem::forget(g);
            }
            tracing::info!("日志系统初始化完成");
            Ok(())
        }
        // 已经初始化过了，这不是错误
        Err(_) => Ok(()),
    }
}
