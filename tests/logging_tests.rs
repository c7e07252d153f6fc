//! 日志初始化集成测试

#![cfg(feature = "logging")]

use sqldump_splitter::logging::{LogConfig, init_logging};
use tempfile::TempDir;
use tracing::Level;

#[test]
fn test_init_logging_writes_to_dir() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");

    let config = LogConfig::new()
        .level(Level::DEBUG)
        .stdout(false)
        .log_dir(Some(&log_dir));
    init_logging(config).unwrap();
    assert!(log_dir.is_dir());

    // 重复初始化不报错
    init_logging(LogConfig::new().log_dir(None::<&str>)).unwrap();

    tracing::info!("logging test message");
}
