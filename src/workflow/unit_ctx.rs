//! 项目处理上下文
//!
//! 封装"我正在处理清单里的哪个项目"这一信息

use std::fmt::Display;

/// 项目处理上下文
#[derive(Debug, Clone)]
pub struct UnitCtx {
    /// 项目 URL（同时是清单里的条目标识）
    pub url: String,

    /// 项目在本次运行中的序号（仅用于日志显示，从 1 开始）
    pub unit_index: usize,
}

impl UnitCtx {
    /// 创建新的项目上下文
    pub fn new(url: String, unit_index: usize) -> Self {
        Self { url, unit_index }
    }
}

impl Display for UnitCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[项目 #{} {}]", self.unit_index, self.url)
    }
}
