//! 译文写入器 - 业务能力层
//!
//! 把已接受的译文逐条写回页面：定位行、打开编辑器、输入、保存、
//! 等待编辑器关闭。页面内的 UI 状态不支持并发操作，条目严格串行。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::InteractionError;
use crate::models::TranslationItem;

/// 等待编辑器关闭的轮询次数
const EDITOR_CLOSE_RETRIES: usize = 10;
/// 轮询间隔
const EDITOR_CLOSE_POLL: Duration = Duration::from_millis(200);

/// 行编辑能力：填写阶段对页面的全部操作
pub trait RowEditor {
    /// 把目标行滚动进视口
    async fn scroll_row_into_view(&self, id: &str) -> Result<(), InteractionError>;

    /// 点击目标行的空态控件，打开编辑器
    async fn open_editor(&self, id: &str) -> Result<(), InteractionError>;

    /// 向已打开的编辑器输入译文
    async fn type_translation(&self, text: &str) -> Result<(), InteractionError>;

    /// 点击保存控件
    async fn save(&self) -> Result<(), InteractionError>;

    /// 编辑器区域当前是否可见
    async fn editor_visible(&self) -> Result<bool, InteractionError>;
}

/// 译文写入器
pub struct Filler {
    focus_delay: Duration,
    editor_load_delay: Duration,
    before_save_delay: Duration,
    row_next_delay: Duration,
}

impl Filler {
    pub fn new(config: &Config) -> Self {
        Self {
            focus_delay: config.focus_delay,
            editor_load_delay: config.editor_load_delay,
            before_save_delay: config.before_save_delay,
            row_next_delay: config.row_next_delay,
        }
    }

    /// 顺序写入全部译文
    ///
    /// 任一条目失败立即中止后续条目；已保存的条目保持已保存状态，
    /// 下次运行会重新采集剩余的空行。
    pub async fn fill<E: RowEditor>(
        &self,
        editor: &E,
        items: &[TranslationItem],
    ) -> Result<(), InteractionError> {
        info!("✍️ 开始写入 {} 条译文", items.len());

        for (idx, item) in items.iter().enumerate() {
            let Some(text) = item.translation.as_deref() else {
                warn!("条目 {} 没有译文，跳过", item.id);
                continue;
            };
            debug!("[{}/{}] 写入行 {}", idx + 1, items.len(), item.id);

            editor.scroll_row_into_view(&item.id).await?;
            sleep(self.focus_delay).await;

            editor.open_editor(&item.id).await?;
            // 编辑器挂载是异步的
            sleep(self.editor_load_delay).await;

            editor.type_translation(text).await?;
            sleep(self.before_save_delay).await;

            editor.save().await?;
            self.wait_editor_closed(editor, &item.id).await?;

            sleep(self.row_next_delay).await;
        }

        Ok(())
    }

    /// 轮询等待编辑器区域消失；超出预算只告警，不视为失败
    async fn wait_editor_closed<E: RowEditor>(
        &self,
        editor: &E,
        id: &str,
    ) -> Result<(), InteractionError> {
        for _ in 0..EDITOR_CLOSE_RETRIES {
            if !editor.editor_visible().await? {
                return Ok(());
            }
            sleep(EDITOR_CLOSE_POLL).await;
        }
        warn!("行 {} 的编辑器在轮询预算内未关闭，继续处理下一行", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn item(id: &str, translation: Option<&str>) -> TranslationItem {
        TranslationItem {
            id: id.to_string(),
            original: format!("src-{id}"),
            translation: translation.map(|s| s.to_string()),
        }
    }

    fn filler() -> Filler {
        Filler {
            focus_delay: Duration::ZERO,
            editor_load_delay: Duration::ZERO,
            before_save_delay: Duration::ZERO,
            row_next_delay: Duration::ZERO,
        }
    }

    /// 记录每一步操作的假编辑器
    #[derive(Default)]
    struct FakeEditor {
        attempted: Mutex<Vec<String>>,
        saved: Mutex<Vec<String>>,
        typed: Mutex<Vec<String>>,
        fail_open_on: Option<String>,
    }

    impl RowEditor for FakeEditor {
        async fn scroll_row_into_view(&self, id: &str) -> Result<(), InteractionError> {
            self.attempted.lock().unwrap().push(id.to_string());
            Ok(())
        }

        async fn open_editor(&self, id: &str) -> Result<(), InteractionError> {
            if self.fail_open_on.as_deref() == Some(id) {
                return Err(InteractionError::RowNotFound { id: id.to_string() });
            }
            Ok(())
        }

        async fn type_translation(&self, text: &str) -> Result<(), InteractionError> {
            self.typed.lock().unwrap().push(text.to_string());
            Ok(())
        }

        async fn save(&self) -> Result<(), InteractionError> {
            let id = self.attempted.lock().unwrap().last().cloned().unwrap_or_default();
            self.saved.lock().unwrap().push(id);
            Ok(())
        }

        async fn editor_visible(&self) -> Result<bool, InteractionError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_fill_saves_all_items_in_order() {
        let editor = FakeEditor::default();
        let items = vec![item("1", Some("a")), item("2", Some("b"))];

        filler().fill(&editor, &items).await.unwrap();

        assert_eq!(*editor.saved.lock().unwrap(), vec!["1", "2"]);
        assert_eq!(*editor.typed.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_midway_keeps_earlier_saves_and_skips_rest() {
        let editor = FakeEditor {
            fail_open_on: Some("3".to_string()),
            ..Default::default()
        };
        let items = vec![
            item("1", Some("a")),
            item("2", Some("b")),
            item("3", Some("c")),
            item("4", Some("d")),
            item("5", Some("e")),
        ];

        let err = filler().fill(&editor, &items).await.unwrap_err();

        assert!(matches!(err, InteractionError::RowNotFound { ref id } if id == "3"));
        assert_eq!(*editor.saved.lock().unwrap(), vec!["1", "2"]);
        // 第 4、5 条不再尝试
        assert_eq!(*editor.attempted.lock().unwrap(), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_items_without_translation_are_skipped() {
        let editor = FakeEditor::default();
        let items = vec![item("1", Some("a")), item("2", None), item("3", Some("c"))];

        filler().fill(&editor, &items).await.unwrap();

        assert_eq!(*editor.saved.lock().unwrap(), vec!["1", "3"]);
    }
}
