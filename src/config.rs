//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能

use crate::error::{Result, SplitterError};
use crate::statement::ContentFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认配置文件名（位于当前工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 主配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub log: LogSettings,
    /// 输入配置
    #[serde(default)]
    pub input: InputConfig,
    /// 拆分配置
    #[serde(default)]
    pub split: SplitConfig,
    /// 统计分析配置
    #[serde(default)]
    pub analyze: AnalyzeConfig,
    /// 统计结果导出配置
    #[serde(default)]
    pub export: ExportConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录，空字符串表示不写文件
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

/// 输入配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// SQL 导出文件路径
    #[serde(default)]
    pub path: String,
    /// 读取块大小（字节），0 表示按文件大小自动选择
    #[serde(default)]
    pub buffer_size: usize,
}

/// 拆分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// 输出目录
    pub output_dir: String,
    /// 只拆分这些表，为空表示全部
    #[serde(default)]
    pub tables: Vec<String>,
    /// 只分析不写文件
    #[serde(default)]
    pub dry_run: bool,
    /// 内容过滤
    #[serde(default)]
    pub content: ContentFilter,
    /// 是否输出进度
    #[serde(default)]
    pub progress: bool,
}

/// 统计分析配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    /// 只统计这些表，为空表示全部
    #[serde(default)]
    pub tables: Vec<String>,
    /// 是否输出进度
    #[serde(default)]
    pub progress: bool,
}

/// 导出配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// CSV 导出配置
    #[serde(default)]
    pub csv: Vec<CsvConfig>,
    /// JSON 导出配置
    #[serde(default)]
    pub json: Vec<JsonConfig>,
}

/// CSV 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// 输出文件路径
    pub out_path: String,
    /// 是否覆盖现有文件
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

/// JSON 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonConfig {
    /// 输出文件路径
    pub out_path: String,
    /// 是否覆盖现有文件
    #[serde(default = "default_true")]
    pub overwrite: bool,
    /// 是否使用缩进格式
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            tables: Vec::new(),
            dry_run: false,
            content: ContentFilter::All,
            progress: false,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从字符串加载配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 读取当前目录下的 `config.toml`，不存在时使用默认配置
    pub fn load() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(SplitterError::config(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        if !self.split.dry_run && self.split.output_dir.trim().is_empty() {
            return Err(SplitterError::config("输出目录不能为空"));
        }

        if let Some(t) = self
            .split
            .tables
            .iter()
            .chain(self.analyze.tables.iter())
            .find(|t| t.trim().is_empty())
        {
            return Err(SplitterError::config(format!(
                "表过滤列表中存在空表名: {t:?}"
            )));
        }

        if self.export.csv.iter().any(|c| c.out_path.is_empty())
            || self.export.json.iter().any(|c| c.out_path.is_empty())
        {
            return Err(SplitterError::config("导出文件路径不能为空"));
        }

        Ok(())
    }

    /// 实际使用的读取块大小覆盖值
    pub fn buffer_size_override(&self) -> Option<usize> {
        (self.input.buffer_size > 0).then_some(self.input.buffer_size)
    }
}
