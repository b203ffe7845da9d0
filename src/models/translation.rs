//! 翻译条目数据模型

use serde::{Deserialize, Serialize};

/// 一条待翻译 / 已翻译的条目
///
/// 采集阶段填入 `id` + `original`，提取阶段补全 `translation`。
/// 序列化时 `original` 使用键名 `text`（与翻译接口的载荷格式一致）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    pub id: String,
    #[serde(rename = "text", default)]
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl TranslationItem {
    /// 创建采集阶段的条目（尚无译文）
    pub fn pending(id: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original: original.into(),
            translation: None,
        }
    }
}

/// 虚拟列表中一行的原始快照
///
/// 由行提供方（页面）一次性返回当前已渲染的所有行。
/// 这里只携带事实，空行判定属于采集器的逻辑。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    /// 行唯一标识（data-id）
    pub id: String,
    /// 目标语言单元格内是否存在空态标记元素
    #[serde(default)]
    pub has_empty_marker: bool,
    /// 目标语言单元格的可见文本
    #[serde(default)]
    pub target_text: String,
    /// 源文本单元格中高亮子串的文本（若有）
    #[serde(default)]
    pub source_highlight: Option<String>,
    /// 源文本单元格的完整文本
    #[serde(default)]
    pub source_text: String,
}
