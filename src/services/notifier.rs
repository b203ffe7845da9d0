//! 结果通知 - 业务能力层
//!
//! 通过 Telegram Bot 接口推送每个项目的处理结果。
//! 发送是尽力而为的：失败只记录日志，绝不向上传播。

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;

/// sendMessage 请求载荷
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    /// 关掉链接预览，避免消息里出现大块网页卡片
    disable_web_page_preview: bool,
}

/// Telegram 通知服务
pub struct Notifier {
    http: reqwest::Client,
    token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.tg_bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    /// 是否配置了通知凭据
    pub fn is_enabled(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    /// 发送一条通知（HTML 格式）
    pub async fn send(&self, text: &str) {
        if !self.is_enabled() {
            debug!("未配置 Telegram 凭据，跳过通知");
            return;
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let payload = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        match self.http.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("通知已发送");
            }
            Ok(response) => {
                warn!("通知发送失败: HTTP {}", response.status());
            }
            Err(e) => {
                warn!("通知发送失败: {}", e);
            }
        }
    }
}
