//! 集成测试公共模块

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 创建测试用的 SQL 导出文件
pub fn create_dump(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write test dump");
    file_path
}

/// 一个表、三条语句
#[allow(dead_code)]
pub const USERS_DUMP: &str = "CREATE TABLE users (id INT);\n\
INSERT INTO users VALUES (1);\n\
INSERT INTO users VALUES (2);\n";

/// 多表、多种语句、带引号和注释的导出内容
#[allow(dead_code)]
pub const MIXED_DUMP: &str = r#"-- MySQL dump 10.13
/*!40101 SET NAMES utf8mb4 */;
SET FOREIGN_KEY_CHECKS=0;

DROP TABLE IF EXISTS `users`;
CREATE TABLE `users` (
  `id` int NOT NULL,
  `name` varchar(255) DEFAULT 'a;b',
  PRIMARY KEY (`id`)
);
INSERT INTO `users` VALUES (1,'O\'Brien; Jr.'),(2,"say \"hi;\"");
INSERT INTO `users` VALUES (3,'it''s;fine');

CREATE TABLE "orders" (id INT, note TEXT);
CREATE UNIQUE INDEX idx_orders_id ON orders (id);
INSERT INTO orders VALUES (10, 'x');
ALTER TABLE orders ADD COLUMN total INT;

LOCK TABLES `users` WRITE;
SELECT * FROM users;
UNLOCK TABLES;
INSERT INTO `shop`.`products` VALUES (1, 'semi;colon')"#;

/// 生成包含 `tables` 个表、每表 `rows` 条 INSERT 的导出内容
#[allow(dead_code)]
pub fn generate_dump(tables: usize, rows: usize) -> String {
    let mut out = String::new();
    for t in 0..tables {
        out.push_str(&format!("CREATE TABLE t{t} (id INT, v TEXT);\n"));
    }
    for r in 0..rows {
        for t in 0..tables {
            out.push_str(&format!(
                "INSERT INTO t{t} VALUES ({r}, 'row;{r}');\n"
            ));
        }
    }
    out
}

/// 读取目录下所有文件，按文件名排序
#[allow(dead_code)]
pub fn read_dir_sorted(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|e| {
            let path = e.unwrap().path();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&path).unwrap())
        })
        .collect();
    files.sort();
    files
}

/// 验证文件存在且非空
#[allow(dead_code)]
pub fn verify_output_file_exists(path: &Path) -> bool {
    path.exists() && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}
