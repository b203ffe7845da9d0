use std::time::Duration;

/// 程序配置
///
/// 所有字段都有默认值，并可通过同名环境变量覆盖（时间类以 `_MS` 结尾，毫秒）。
#[derive(Clone, Debug)]
pub struct Config {
    /// 项目清单文件（每行一个项目 URL）
    pub input_file: String,
    /// 登录会话状态文件（cookies）
    pub auth_state_file: String,
    /// 翻译指令文本文件
    pub prompt_file: String,
    /// 同时处理的项目数量
    pub max_concurrency: usize,
    /// 目标语言列的 data-lang-id 标记
    pub target_lang_id: String,
    /// 翻译模型名称
    pub model: String,
    /// 翻译接口密钥
    pub gemini_api_key: String,
    /// 翻译接口基础地址
    pub api_base_url: String,
    /// 本地化平台基础地址
    pub base_url: String,
    // --- Telegram 通知配置 ---
    pub tg_bot_token: String,
    pub chat_id: String,
    // --- 时间参数 ---
    /// 滚动后等待虚拟列表渲染
    pub scroll_delay: Duration,
    /// 编辑器挂载等待
    pub editor_load_delay: Duration,
    /// 行滚动到位后的聚焦等待
    pub focus_delay: Duration,
    /// 点击保存前等待
    pub before_save_delay: Duration,
    /// 两行之间的等待
    pub row_next_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "projects.txt".to_string(),
            auth_state_file: "auth.json".to_string(),
            prompt_file: "prompt.txt".to_string(),
            max_concurrency: 1,
            target_lang_id: "748".to_string(),
            model: "gemini-2.5-flash".to_string(),
            gemini_api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1".to_string(),
            base_url: "https://app.lokalise.com".to_string(),
            tg_bot_token: String::new(),
            chat_id: String::new(),
            scroll_delay: Duration::from_millis(2000),
            editor_load_delay: Duration::from_millis(1500),
            focus_delay: Duration::from_millis(300),
            before_save_delay: Duration::from_millis(800),
            row_next_delay: Duration::from_millis(600),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            auth_state_file: std::env::var("AUTH_STATE_FILE").unwrap_or(default.auth_state_file),
            prompt_file: std::env::var("PROMPT_FILE").unwrap_or(default.prompt_file),
            max_concurrency: std::env::var("MAX_CONCURRENCY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrency),
            target_lang_id: std::env::var("TARGET_LANG_ID").unwrap_or(default.target_lang_id),
            model: std::env::var("MODEL").unwrap_or(default.model),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.gemini_api_key),
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            base_url: std::env::var("BASE_URL").unwrap_or(default.base_url),
            tg_bot_token: std::env::var("TG_BOT_TOKEN").unwrap_or(default.tg_bot_token),
            chat_id: std::env::var("CHAT_ID").unwrap_or(default.chat_id),
            scroll_delay: duration_env("SCROLL_DELAY_MS", default.scroll_delay),
            editor_load_delay: duration_env("EDITOR_LOAD_DELAY_MS", default.editor_load_delay),
            focus_delay: duration_env("FOCUS_DELAY_MS", default.focus_delay),
            before_save_delay: duration_env("BEFORE_SAVE_DELAY_MS", default.before_save_delay),
            row_next_delay: duration_env("ROW_NEXT_DELAY_MS", default.row_next_delay),
        }
    }
}

/// 从环境变量读取毫秒数
fn duration_env(key: &str, fallback: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(fallback)
}
