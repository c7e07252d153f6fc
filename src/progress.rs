//! 读取进度上报
//!
//! [`ProgressReader`] 包装任意 `Read`，每次读取后把累计字节数交给回调。
//! 回调的频率由调用方自行控制（例如只在跨过 5% 时输出日志）。

use std::io::{self, Read};
use std::sync::Arc;

/// 进度回调，参数为累计已读取字节数
pub type ProgressCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// 统计读取字节数并回调的 Reader 包装
pub struct ProgressReader<R: Read> {
    inner: R,
    callback: ProgressCallback,
    bytes_read: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, callback: ProgressCallback) -> Self {
        Self { inner, callback, bytes_read: 0 }
    }

    /// 从闭包创建
    pub fn with_fn<F>(inner: R, callback: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        Self::new(inner, Arc::new(callback))
    }

    /// 累计已读取字节数
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n as u64;
        (self.callback)(self.bytes_read);
        Ok(n)
    }
}

/// 按百分比步长节流的进度日志回调
///
/// 只有当进度跨过新的 `step_percent` 整数倍时才会调用 `report`，
/// `total` 为 0 时不上报。
pub fn throttled<F>(total: u64, step_percent: u64, report: F) -> ProgressCallback
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    use std::sync::atomic::{AtomicU64, Ordering};

    let step = step_percent.clamp(1, 100);
    let last_bucket = AtomicU64::new(0);
    Arc::new(move |bytes: u64| {
        if total == 0 {
            return;
        }
        let percent = (bytes.min(total) * 100 / total).min(100);
        let bucket = percent / step;
        if bucket > last_bucket.load(Ordering::Relaxed) {
            last_bucket.store(bucket, Ordering::Relaxed);
            report(bytes, percent);
        }
    })
}
