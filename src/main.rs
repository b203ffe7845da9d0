use anyhow::Result;
use tracing::info;

use loka_translator::utils::logging;
use loka_translator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init()?;

    info!(
        "🚀 Loka 翻译自动化启动, 版本: {}",
        env!("CARGO_PKG_VERSION")
    );

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    info!("🏁 所有项目处理完毕!");
    Ok(())
}
