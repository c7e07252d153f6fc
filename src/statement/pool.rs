//! 语句缓冲区对象池
//!
//! 读取器从池中借出一个缓冲区拼接语句，语句复制出去之后缓冲区归还池中，
//! 下次读取时复用已有容量，避免每条语句都重新分配。

use std::sync::{Arc, Mutex, PoisonError};

/// 新缓冲区的初始容量，匹配常见语句大小
pub const INITIAL_STMT_CAPACITY: usize = 32 * 1024;

/// 池中最多保留的空闲缓冲区数量
pub const DEFAULT_MAX_POOLED: usize = 8;

/// 可在多个读取器间共享的语句缓冲区池
#[derive(Debug)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    initial_capacity: usize,
    max_pooled: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_limits(INITIAL_STMT_CAPACITY, DEFAULT_MAX_POOLED)
    }

    pub fn with_limits(initial_capacity: usize, max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_pooled)),
            initial_capacity,
            max_pooled,
        }
    }

    /// 便于共享的 `Arc` 版本
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// 借出一个空缓冲区（保留之前的容量）
    pub fn checkout(&self) -> Vec<u8> {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity))
    }

    /// 归还缓冲区；池已满时直接丢弃
    pub fn checkin(&self, mut buf: Vec<u8>) {
        buf.clear();
        let mut free =
            self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_pooled {
            free.push(buf);
        }
    }

    /// 当前空闲缓冲区数量
    pub fn available(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
