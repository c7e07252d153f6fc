//! 输入文件定位、打开与解压
//!
//! 压缩格式由扩展名决定（`.gz`、`.bz2`、`.xz`、`.zst`），需要 `compression` feature。
//! 进度统计包在解压器外层，回调收到的是已读取的压缩字节数，与文件大小可比。

use crate::config::Config;
use crate::error::{Result, SplitterError};
use crate::progress::{ProgressCallback, ProgressReader};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 输入文件的压缩格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// 根据扩展名判断压缩格式（不区分大小写）
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    pub fn is_compressed(self) -> bool {
        self != Compression::None
    }

    /// 用对应的解压器包装 Reader
    #[cfg(feature = "compression")]
    pub fn wrap_reader<'a>(
        self,
        reader: Box<dyn Read + 'a>,
    ) -> Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => {
                Box::new(flate2::read::MultiGzDecoder::new(reader))
            }
            Compression::Bzip2 => {
                Box::new(bzip2::read::MultiBzDecoder::new(reader))
            }
            Compression::Xz => {
                Box::new(xz2::read::XzDecoder::new_multi_decoder(reader))
            }
            Compression::Zstd => {
                Box::new(zstd::stream::read::Decoder::new(reader)?)
            }
        })
    }

    /// 未启用 `compression` feature 时只接受未压缩输入
    #[cfg(not(feature = "compression"))]
    pub fn wrap_reader<'a>(
        self,
        reader: Box<dyn Read + 'a>,
    ) -> Result<Box<dyn Read + 'a>> {
        match self {
            Compression::None => Ok(reader),
            other => Err(SplitterError::config(format!(
                "输入为 {other} 压缩格式，但未启用 compression 功能"
            ))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::Xz => "xz",
            Compression::Zstd => "zstd",
        })
    }
}

/// 组装读取链：原始 Reader → 进度统计（可选）→ 解压
pub fn wrap_input<'a, R: Read + 'a>(
    reader: R,
    progress: Option<&ProgressCallback>,
    compression: Compression,
) -> Result<Box<dyn Read + 'a>> {
    let source: Box<dyn Read + 'a> = match progress {
        Some(callback) => {
            Box::new(ProgressReader::new(reader, Arc::clone(callback)))
        }
        None => Box::new(reader),
    };
    compression.wrap_reader(source)
}

/// 确定要处理的 SQL 导出文件路径，命令行参数优先于配置文件
pub fn resolve_input_path(
    input_override: Option<&Path>,
    config: &Config,
) -> Result<PathBuf> {
    if let Some(path) = input_override {
        return Ok(path.to_path_buf());
    }
    let configured = config.input.path.trim();
    if configured.is_empty() {
        return Err(SplitterError::config(
            "未指定输入文件：请在命令行或配置文件 [input].path 中提供",
        ));
    }
    Ok(PathBuf::from(configured))
}

/// 打开输入文件并读取其大小
pub fn open_input(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).map_err(|source| {
        #[cfg(feature = "logging")]
        tracing::error!(path = %path.display(), error = %source, "打开输入文件失败");
        SplitterError::InputOpen { path: path.to_path_buf(), source }
    })?;
    let size = file
        .metadata()
        .map_err(|source| SplitterError::InputStat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    Ok((file, size))
}
