//! 编辑器页面对象
//!
//! 翻译编辑器页面的全部 DOM 交互：行快照、滚轮滚动、打开单元格
//! 编辑器、输入与保存。页面结构是虚拟化行列表（`.row-key[data-id]`），
//! 各语言单元格按 `data-lang-id` 区分。

use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::Page;

use crate::config::Config;
use crate::error::{InteractionError, NavigationError};
use crate::infrastructure::JsExecutor;
use crate::models::RowSnapshot;
use crate::services::{RowEditor, RowProvider};
use crate::workflow::UnitSession;

/// 编辑器区域选择器（输入与可见性探测共用）
const EDITOR_SELECTOR: &str =
    ".ace_text-input, textarea:not([style*='display: none']), [contenteditable='true']";
/// 保存按钮选择器
const SAVE_BUTTON_SELECTOR: &str = "button.save.btn-primary";

/// 编辑器页面对象
///
/// 每个项目流水线持有自己的页面，互不共享。
pub struct EditorPage {
    executor: JsExecutor,
    lang_marker: String,
}

impl EditorPage {
    pub fn new(page: Page, config: &Config) -> Self {
        Self {
            executor: JsExecutor::new(page),
            lang_marker: config.target_lang_id.clone(),
        }
    }

    fn page(&self) -> &Page {
        self.executor.page()
    }

    /// 派发鼠标滚轮事件
    ///
    /// 虚拟列表监听 wheel 事件按需渲染，window.scrollBy 带不动它。
    async fn wheel(&self, delta: f64) -> Result<(), NavigationError> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseWheel)
            .x(640.0)
            .y(360.0)
            .delta_x(0.0)
            .delta_y(delta)
            .build()
            .map_err(|e| NavigationError::ScriptExecutionFailed { source: e.into() })?;

        self.page()
            .execute(params)
            .await
            .map_err(NavigationError::script)?;
        Ok(())
    }
}

impl RowProvider for EditorPage {
    async fn visible_rows(&self, lang_marker: &str) -> Result<Vec<RowSnapshot>, NavigationError> {
        let marker = serde_json::to_string(lang_marker).map_err(NavigationError::script)?;
        let js = format!(
            r#"
            (() => {{
                const marker = {marker};
                return Array.from(document.querySelectorAll('.row-key[data-id]')).map((row) => {{
                    const cell = row.querySelector(`.cell-trans[data-lang-id='${{marker}}']`);
                    const highlight = row.querySelector('.base-cell-trans .highlight');
                    const base = row.querySelector('.base-cell-trans');
                    return {{
                        id: row.getAttribute('data-id') || '',
                        hasEmptyMarker: !!(cell && cell.querySelector('.empty')),
                        targetText: cell ? cell.innerText : '',
                        sourceHighlight: highlight ? highlight.innerText : null,
                        sourceText: base ? base.innerText : '',
                    }};
                }});
            }})()
            "#
        );
        self.executor.eval_as(js).await
    }

    async fn scroll_by(&self, delta: f64) -> Result<(), NavigationError> {
        self.wheel(delta).await
    }
}

impl RowEditor for EditorPage {
    async fn scroll_row_into_view(&self, id: &str) -> Result<(), InteractionError> {
        let selector = format!(".row-key[data-id='{}']", id);
        let row = self
            .page()
            .find_element(selector.as_str())
            .await
            .map_err(|_| InteractionError::RowNotFound { id: id.to_string() })?;

        row.scroll_into_view()
            .await
            .map_err(|e| InteractionError::ScrollIntoViewFailed {
                id: id.to_string(),
                source: Box::new(e),
            })?;
        Ok(())
    }

    async fn open_editor(&self, id: &str) -> Result<(), InteractionError> {
        // 点击目标语言单元格里的空态控件
        let selector = format!(
            ".row-key[data-id='{}'] .cell-trans[data-lang-id='{}'] .empty",
            id, self.lang_marker
        );
        let affordance = self
            .page()
            .find_element(selector.as_str())
            .await
            .map_err(|e| InteractionError::open_editor(id, e))?;

        affordance
            .click()
            .await
            .map_err(|e| InteractionError::open_editor(id, e))?;
        Ok(())
    }

    async fn type_translation(&self, text: &str) -> Result<(), InteractionError> {
        let editor = self
            .page()
            .find_element(EDITOR_SELECTOR)
            .await
            .map_err(|e| InteractionError::TypingFailed {
                source: Box::new(e),
            })?;

        editor
            .type_str(text)
            .await
            .map_err(|e| InteractionError::TypingFailed {
                source: Box::new(e),
            })?;
        Ok(())
    }

    async fn save(&self) -> Result<(), InteractionError> {
        let button = self
            .page()
            .find_element(SAVE_BUTTON_SELECTOR)
            .await
            .map_err(|e| InteractionError::SaveFailed {
                source: Box::new(e),
            })?;

        button.click().await.map_err(|e| InteractionError::SaveFailed {
            source: Box::new(e),
        })?;
        Ok(())
    }

    async fn editor_visible(&self) -> Result<bool, InteractionError> {
        let selector = serde_json::to_string(EDITOR_SELECTOR).map_err(|e| {
            InteractionError::ProbeFailed {
                source: Box::new(e),
            }
        })?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                return !!(el && el.getClientRects().length > 0);
            }})()
            "#
        );
        self.executor
            .eval_as(js)
            .await
            .map_err(|e| InteractionError::ProbeFailed {
                source: Box::new(e),
            })
    }
}

impl UnitSession for EditorPage {
    async fn open(&self, url: &str) -> Result<(), NavigationError> {
        self.page()
            .goto(url)
            .await
            .map_err(|e| NavigationError::goto(url, e))?;
        self.page()
            .wait_for_navigation()
            .await
            .map_err(|e| NavigationError::goto(url, e))?;
        Ok(())
    }

    async fn display_name(&self) -> Result<String, NavigationError> {
        let js = r#"
            (() => {
                const el = document.querySelector("button[id='1'] strong");
                return el ? el.innerText : null;
            })()
        "#;
        let raw: Option<String> = self.executor.eval_as(js).await?;
        let raw = raw.ok_or_else(|| NavigationError::ElementNotFound {
            selector: "button[id='1'] strong".to_string(),
        })?;
        Ok(clean_display_name(&raw))
    }
}

/// 清理显示名：去掉不换行空格与 "Filename: " 前缀
fn clean_display_name(raw: &str) -> String {
    let name = raw.replace('\u{a0}', " ");
    let name = name.trim();
    let name = name.strip_prefix("Filename: ").unwrap_or(name);
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_display_name_strips_prefix_and_nbsp() {
        assert_eq!(
            clean_display_name("Filename:\u{a0}app_strings.json "),
            "app_strings.json"
        );
        assert_eq!(clean_display_name("  plain.po  "), "plain.po");
        assert_eq!(clean_display_name("Filename: a b.json"), "a b.json");
    }
}
