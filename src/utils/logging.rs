//! 日志初始化
//!
//! 输出同时写到终端和按启动时间命名的文件：`logs/YYYY-MM-DD/HH-MM-SS.log`。
//! 级别默认 info，可用 RUST_LOG 覆盖。

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化全局日志订阅器
pub fn init() -> Result<()> {
    let now = chrono::Local::now();

    let dir = Path::new("logs").join(now.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&dir).context("创建日志目录失败")?;

    let file_path = dir.join(format!("{}.log", now.format("%H-%M-%S")));
    let file = fs::File::create(&file_path)
        .with_context(|| format!("创建日志文件 {} 失败", file_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .try_init()
        .context("初始化日志订阅器失败")?;

    Ok(())
}
