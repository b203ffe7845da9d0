//! 登录与会话持久化
//!
//! 没有会话文件时需要一次人工登录：打开登录页，等待人工在浏览器里
//! 完成登录并回到终端按回车确认，然后把 cookies 持久化供后续运行复用。
//! 整个流程只在所有项目流水线启动之前执行一次。

use std::path::Path;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Browser;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::Config;

/// 确保浏览器处于已登录状态
pub async fn ensure_session(browser: &Browser, config: &Config) -> Result<()> {
    if Path::new(&config.auth_state_file).exists() {
        info!("🔑 找到会话文件，跳过登录");
        return restore_session(browser, config).await;
    }

    warn!("⚠️ 未找到会话文件，需要人工登录");
    let page = browser
        .new_page(format!("{}/signin", config.base_url))
        .await
        .context("打开登录页失败")?;

    // Cookie 同意弹窗不一定出现，点不到只告警
    match page.find_element("[id='onetrust-accept-btn-handler']").await {
        Ok(button) => {
            if let Err(e) = button.click().await {
                warn!("关闭 Cookie 弹窗失败: {}", e);
            }
        }
        Err(e) => warn!("未找到 Cookie 弹窗: {}", e),
    }

    await_human_confirmation().await?;

    let cookies = page.get_cookies().await.context("读取 cookies 失败")?;
    let data = serde_json::to_string_pretty(&cookies).context("序列化会话状态失败")?;
    tokio::fs::write(&config.auth_state_file, data)
        .await
        .with_context(|| format!("写入会话文件 {} 失败", config.auth_state_file))?;

    info!("💾 会话已保存: {}", config.auth_state_file);
    Ok(())
}

/// 把持久化的 cookies 恢复到浏览器
async fn restore_session(browser: &Browser, config: &Config) -> Result<()> {
    let data = tokio::fs::read_to_string(&config.auth_state_file)
        .await
        .with_context(|| format!("读取会话文件 {} 失败", config.auth_state_file))?;

    // Cookie 与 CookieParam 的 JSON 字段兼容，多出的字段会被忽略
    let cookies: Vec<CookieParam> =
        serde_json::from_str(&data).context("解析会话文件失败")?;

    let page = browser
        .new_page("about:blank")
        .await
        .context("创建引导页失败")?;
    page.set_cookies(cookies).await.context("恢复 cookies 失败")?;

    Ok(())
}

/// 阻塞等待人工确认（终端回车）
async fn await_human_confirmation() -> Result<()> {
    println!("⌨️  请在浏览器中完成登录，成功后回到终端按 ENTER 继续...");
    let mut line = String::new();
    BufReader::new(stdin())
        .read_line(&mut line)
        .await
        .context("读取终端输入失败")?;
    Ok(())
}
