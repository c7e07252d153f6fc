use criterion::{Criterion, criterion_group, criterion_main};
use sqldump_splitter::statement::{StatementReader, classify};
use sqldump_splitter::{Analyzer, Splitter};
use std::hint::black_box;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const INSERT_LINE: &str =
    "INSERT INTO `orders` VALUES (1,'O\\'Brien; Jr.',\"a;b\",42.5,'2025-10-10');\n";

fn sample_dump(rows: usize) -> String {
    let mut out = String::from(
        "CREATE TABLE `orders` (id INT, name TEXT, note TEXT, total DOUBLE, day DATE);\n",
    );
    for _ in 0..rows {
        out.push_str(INSERT_LINE);
    }
    out
}

fn bench_classify(c: &mut Criterion) {
    let stmt = INSERT_LINE.trim_end().as_bytes();
    c.bench_function("classify_insert", |b| {
        b.iter(|| black_box(classify(black_box(stmt))))
    });
}

fn bench_read_statements(c: &mut Criterion) {
    let dump = sample_dump(10_000);
    let mut group = c.benchmark_group("read_statements_10k");
    for size in [4 * 1024, 64 * 1024, 256 * 1024] {
        group.bench_function(format!("buffer_{size}"), |b| {
            b.iter(|| {
                let count = StatementReader::new(dump.as_bytes(), size)
                    .filter_map(Result::ok)
                    .count();
                black_box(count)
            })
        });
    }
    group.finish();
}

fn bench_split_and_analyze(c: &mut Criterion) {
    let mut file = NamedTempFile::new().expect("创建临时文件失败");
    file.write_all(sample_dump(10_000).as_bytes()).expect("写入文件失败");
    file.flush().expect("刷新文件失败");

    c.bench_function("split_file_10k", |b| {
        b.iter_batched(
            || TempDir::new().expect("创建临时目录失败"),
            |out| {
                let stats = Splitter::new(file.path(), out.path())
                    .split()
                    .expect("拆分失败");
                black_box(stats.statements_processed);
            },
            criterion::BatchSize::PerIteration,
        )
    });

    c.bench_function("analyze_file_10k", |b| {
        b.iter(|| {
            let stats = Analyzer::new(file.path()).analyze().expect("统计失败");
            black_box(stats.len())
        })
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_read_statements,
    bench_split_and_analyze
);
criterion_main!(benches);
