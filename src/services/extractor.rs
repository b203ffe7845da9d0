//! 模型响应提取器 - 业务能力层
//!
//! 把一段不可信的自由文本恢复成结构化的翻译结果列表。
//! 模型可能把 JSON 包在 Markdown 代码块里，也可能在前后附带说明文字，
//! 清洗必须按顺序进行：先去围栏，再按花括号切片，最后解析。

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::TranslationItem;

/// 翻译接口约定的结果结构
#[derive(Debug, Deserialize)]
struct TranslationResponse {
    results: Vec<TranslationItem>,
}

/// 从原始响应文本中提取翻译结果
///
/// 只有两种失败：恢复不出 JSON 对象，或 JSON 不符合结果结构。
/// "零条译文"是合法的成功结果，与"响应不可解析"严格区分。
pub fn extract(raw: &str) -> Result<Vec<TranslationItem>, ExtractionError> {
    let sanitized = sanitize(raw);

    // 防御模型在 JSON 前后输出说明文字：取第一个 { 到最后一个 }
    let sliced = match (sanitized.find('{'), sanitized.rfind('}')) {
        (Some(start), Some(end)) if end > start => &sanitized[start..=end],
        _ => return Err(ExtractionError::NoJsonObject { sanitized }),
    };

    match serde_json::from_str::<TranslationResponse>(sliced) {
        Ok(response) => {
            debug!("提取到 {} 条翻译结果", response.results.len());
            Ok(response.results)
        }
        Err(source) => Err(ExtractionError::SchemaMismatch {
            sanitized: sliced.to_string(),
            source,
        }),
    }
}

/// 清洗响应文本：去除首尾空白与 Markdown 代码围栏
fn sanitize(input: &str) -> String {
    let mut text = input.trim().to_string();

    if text.starts_with("```") {
        // 开头围栏可能带语言标签（```json）
        if let Ok(re) = Regex::new(r"^```[A-Za-z]*[ \t]*\r?\n?") {
            text = re.replace(&text, "").into_owned();
        }
        if let Some(stripped) = text.strip_suffix("```") {
            text = stripped.to_string();
        }
        text = text.trim().to_string();
    }

    text
}
