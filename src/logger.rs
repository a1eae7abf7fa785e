//! 日志初始化
//!
//! 终端被界面占用，日志只写入数据目录下按天轮转的文件。

use std::path::Path;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;

/// 初始化日志系统，返回的 guard 需要在程序生命周期内保持
pub fn init(data_dir: &Path, level: Level) -> Result<WorkerGuard> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("无法创建日志目录 {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "todo-latch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let timer = LocalTime::new(time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("日志系统已初始化")?;
    Ok(guard)
}
