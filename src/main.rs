use sqldump_splitter::app::{self, Mode};
use sqldump_splitter::config::Config;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "用法: sqldump-splitter <split|analyze> [输入文件]";

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let mode = match args.next().map(|m| m.parse::<Mode>()) {
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::from(2);
        }
        None => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let input = args.next().map(PathBuf::from);

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("加载配置失败: {e}");
            return ExitCode::FAILURE;
        }
    };

    #[cfg(feature = "logging")]
    {
        use sqldump_splitter::logging::{LogConfig, init_logging};
        if let Err(e) = init_logging(LogConfig::from_settings(&config.log)) {
            eprintln!("日志初始化失败: {e}");
        }
    }

    match app::run(mode, input.as_deref(), &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            #[cfg(feature = "logging")]
            tracing::error!("运行失败: {e}");
            eprintln!("运行失败: {e}");
            ExitCode::FAILURE
        }
    }
}
