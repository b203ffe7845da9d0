//! 远程翻译服务 - 业务能力层
//!
//! 把一个批次渲染成单条提示词，调用 generateContent 接口，
//! 显式解包提供方信封（candidates → content → parts → text），
//! 再交给提取器恢复结构化结果。信封的任何一层都不做存在性假设。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, RemoteCallError};
use crate::models::TranslationItem;
use crate::services::extractor;

/// 翻译能力接口
pub trait TranslateBackend {
    /// 翻译一个批次，返回带译文的条目
    async fn translate(
        &self,
        instructions: &str,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslationItem>, AppError>;
}

/// generateContent 请求载荷
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

/// generateContent 响应信封
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini 风格接口的翻译服务
pub struct GeminiTranslator {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiTranslator {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// 接口地址（不含密钥，可安全写入日志和错误信息）
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// 把指令文本和批次渲染成单条提示词
    fn build_prompt(instructions: &str, items: &[TranslationItem]) -> String {
        let payload = serde_json::to_string(items).unwrap_or_default();
        format!(
            "{}\n\nIMPORTANT: Respond ONLY with a valid JSON object.\n\
             Do NOT repeat the translation twice in the output string.\n\
             Structure: {{\"results\": [{{\"id\": \"ID_HERE\", \"translation\": \"TRANSLATED_TEXT_HERE\"}}, ...]}}\n\n\
             Data to translate: {}",
            instructions, payload
        )
    }
}

impl TranslateBackend for GeminiTranslator {
    async fn translate(
        &self,
        instructions: &str,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslationItem>, AppError> {
        info!("⏳ 请求翻译模型，条目数: {}", items.len());

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: Self::build_prompt(instructions, items),
                }],
            }],
        };

        let endpoint = self.endpoint();
        let url = format!("{}?key={}", endpoint, self.api_key);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| RemoteCallError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        let body = response
            .text()
            .await
            .map_err(|source| RemoteCallError::RequestFailed { endpoint, source })?;

        let envelope: GenerateResponse = serde_json::from_str(&body)
            .map_err(|source| RemoteCallError::EnvelopeParseFailed { source })?;

        let generated = unwrap_envelope(envelope)?;
        debug!("模型生成文本长度: {} 字符", generated.len());

        let results = extractor::extract(&generated)?;
        info!("✓ 模型返回 {} 条译文", results.len());
        Ok(results)
    }
}

/// 从信封中取出第一段生成文本
///
/// 成功分支返回文本，否则返回 [`RemoteCallError::EmptyEnvelope`]。
fn unwrap_envelope(envelope: GenerateResponse) -> Result<String, RemoteCallError> {
    envelope
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .next()
        .ok_or(RemoteCallError::EmptyEnvelope)
}
