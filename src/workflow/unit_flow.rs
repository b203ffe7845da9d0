//! 项目处理流程 - 流程层
//!
//! 单个项目的状态机：
//!
//! ```text
//! Pending → Navigated → Collected → Translated → Filled → Done
//!                  └──────── 任一阶段出错 ────────┘
//!                                ↓
//!                              Failed
//! ```
//!
//! 采集结果为空时从 Collected 直接短路到 Done，不触发远程调用与写入。
//! 流程内部不重试：失败的项目保留在清单里，下次运行整体重来。

use std::collections::HashSet;
use std::fmt::Display;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, NavigationError};
use crate::models::TranslationItem;
use crate::services::{Collector, Filler, RowEditor, RowProvider, TranslateBackend};
use crate::workflow::UnitCtx;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStage {
    Pending,
    Navigated,
    Collected,
    Translated,
    Filled,
    Done,
    Failed,
}

impl UnitStage {
    fn label(self) -> &'static str {
        match self {
            UnitStage::Pending => "待处理",
            UnitStage::Navigated => "已打开",
            UnitStage::Collected => "已采集",
            UnitStage::Translated => "已翻译",
            UnitStage::Filled => "已写入",
            UnitStage::Done => "完成",
            UnitStage::Failed => "失败",
        }
    }
}

impl Display for UnitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 单个项目的处理结果
#[derive(Debug)]
pub struct PipelineOutcome {
    /// 项目 URL（清单条目）
    pub unit: String,
    /// 显示名，尽力读取，失败时可能为空
    pub display_name: String,
    /// 成功，或导致 Failed 的错误
    pub result: Result<(), AppError>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 项目会话能力：流程对页面的全部依赖
pub trait UnitSession: RowProvider + RowEditor {
    /// 打开项目页面
    async fn open(&self, url: &str) -> Result<(), NavigationError>;

    /// 读取项目显示名
    async fn display_name(&self) -> Result<String, NavigationError>;
}

/// 项目处理流程
///
/// 不持有页面资源，只依赖能力接口；每个项目创建一个实例即可复用配置。
pub struct UnitFlow<'a, T: TranslateBackend> {
    config: &'a Config,
    translator: &'a T,
    instructions: &'a str,
}

impl<'a, T: TranslateBackend> UnitFlow<'a, T> {
    pub fn new(config: &'a Config, translator: &'a T, instructions: &'a str) -> Self {
        Self {
            config,
            translator,
            instructions,
        }
    }

    /// 运行整条流水线
    ///
    /// 任何错误都被折叠进返回值，调用方据此更新清单并发送通知。
    pub async fn run<S: UnitSession>(&self, session: &S, ctx: &UnitCtx) -> PipelineOutcome {
        let mut display_name = String::new();
        let result = self.drive(session, ctx, &mut display_name).await;

        if let Err(e) = &result {
            error!("[项目 {}] ❌ 进入 {} 阶段: {}", ctx.unit_index, UnitStage::Failed, e);
        }

        PipelineOutcome {
            unit: ctx.url.clone(),
            display_name,
            result,
        }
    }

    async fn drive<S: UnitSession>(
        &self,
        session: &S,
        ctx: &UnitCtx,
        display_name: &mut String,
    ) -> Result<(), AppError> {
        self.advance(ctx, UnitStage::Pending);

        // Pending → Navigated
        session.open(&ctx.url).await?;
        *display_name = session.display_name().await?;
        self.advance(ctx, UnitStage::Navigated);

        // Navigated → Collected
        let collector = Collector::new(self.config);
        let batch = collector.collect(session).await;
        self.advance(ctx, UnitStage::Collected);

        // 没有空行：不翻译、不写入，直接完成
        if batch.is_empty() {
            info!("[项目 {}] ℹ️ 没有未翻译的行", ctx.unit_index);
            self.advance(ctx, UnitStage::Done);
            return Ok(());
        }

        // Collected → Translated
        let translated = self
            .translator
            .translate(self.instructions, &batch)
            .await?;
        let accepted = accept_known(&batch, translated, ctx.unit_index);
        self.advance(ctx, UnitStage::Translated);

        // Translated → Filled
        let filler = Filler::new(self.config);
        filler.fill(session, &accepted).await?;
        self.advance(ctx, UnitStage::Filled);

        self.advance(ctx, UnitStage::Done);
        Ok(())
    }

    fn advance(&self, ctx: &UnitCtx, stage: UnitStage) {
        info!("[项目 {}] ▸ {}", ctx.unit_index, stage);
    }
}

/// 只接受发出去过的 id
///
/// 模型偶尔会编造条目；未知 id 丢弃并告警，不视为失败。
fn accept_known(
    batch: &[TranslationItem],
    translated: Vec<TranslationItem>,
    unit_index: usize,
) -> Vec<TranslationItem> {
    let sent: HashSet<&str> = batch.iter().map(|item| item.id.as_str()).collect();

    let mut accepted = Vec::with_capacity(translated.len());
    for item in translated {
        if sent.contains(item.id.as_str()) {
            accepted.push(item);
        } else {
            warn!("[项目 {}] ⚠️ 丢弃未知条目 id: {}", unit_index, item.id);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InteractionError, RemoteCallError};
    use crate::models::RowSnapshot;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            scroll_delay: Duration::ZERO,
            editor_load_delay: Duration::ZERO,
            focus_delay: Duration::ZERO,
            before_save_delay: Duration::ZERO,
            row_next_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn empty_row(id: &str, source: &str) -> RowSnapshot {
        RowSnapshot {
            id: id.to_string(),
            has_empty_marker: true,
            target_text: String::new(),
            source_highlight: None,
            source_text: source.to_string(),
        }
    }

    /// 一次性给出全部行的假会话
    #[derive(Default)]
    struct FakeSession {
        passes: Mutex<VecDeque<Vec<RowSnapshot>>>,
        saved: Mutex<Vec<String>>,
        fail_open: bool,
    }

    impl FakeSession {
        fn with_rows(rows: Vec<RowSnapshot>) -> Self {
            Self {
                passes: Mutex::new(VecDeque::from(vec![rows])),
                ..Default::default()
            }
        }
    }

    impl RowProvider for FakeSession {
        async fn visible_rows(
            &self,
            _lang_marker: &str,
        ) -> Result<Vec<RowSnapshot>, NavigationError> {
            Ok(self.passes.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn scroll_by(&self, _delta: f64) -> Result<(), NavigationError> {
            Ok(())
        }
    }

    impl RowEditor for FakeSession {
        async fn scroll_row_into_view(&self, _id: &str) -> Result<(), InteractionError> {
            Ok(())
        }

        async fn open_editor(&self, id: &str) -> Result<(), InteractionError> {
            self.saved.lock().unwrap().push(id.to_string());
            Ok(())
        }

        async fn type_translation(&self, _text: &str) -> Result<(), InteractionError> {
            Ok(())
        }

        async fn save(&self) -> Result<(), InteractionError> {
            Ok(())
        }

        async fn editor_visible(&self) -> Result<bool, InteractionError> {
            Ok(false)
        }
    }

    impl UnitSession for FakeSession {
        async fn open(&self, url: &str) -> Result<(), NavigationError> {
            if self.fail_open {
                return Err(NavigationError::ElementNotFound {
                    selector: url.to_string(),
                });
            }
            Ok(())
        }

        async fn display_name(&self) -> Result<String, NavigationError> {
            Ok("demo_project.json".to_string())
        }
    }

    /// 回放预置结果的假翻译后端
    struct FakeTranslator {
        reply: Vec<TranslationItem>,
        called: AtomicBool,
        fail: bool,
    }

    impl FakeTranslator {
        fn replying(reply: Vec<TranslationItem>) -> Self {
            Self {
                reply,
                called: AtomicBool::new(false),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                reply: Vec::new(),
                called: AtomicBool::new(false),
                fail: true,
            }
        }
    }

    impl TranslateBackend for FakeTranslator {
        async fn translate(
            &self,
            _instructions: &str,
            _items: &[TranslationItem],
        ) -> Result<Vec<TranslationItem>, AppError> {
            self.called.store(true, Ordering::SeqCst);
            if self.fail {
                return Err(RemoteCallError::EmptyEnvelope.into());
            }
            Ok(self.reply.clone())
        }
    }

    fn translated(id: &str, text: &str) -> TranslationItem {
        TranslationItem {
            id: id.to_string(),
            original: String::new(),
            translation: Some(text.to_string()),
        }
    }

    fn ctx() -> UnitCtx {
        UnitCtx::new("https://app.example/project/1".to_string(), 1)
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits_to_done() {
        let config = test_config();
        let session = FakeSession::default();
        let translator = FakeTranslator::replying(vec![]);
        let flow = UnitFlow::new(&config, &translator, "instructions");

        let outcome = flow.run(&session, &ctx()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.display_name, "demo_project.json");
        // 既没有远程调用也没有写入
        assert!(!translator.called.load(Ordering::SeqCst));
        assert!(session.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_pipeline_fills_translated_rows() {
        let config = test_config();
        let session = FakeSession::with_rows(vec![empty_row("a", "Hi"), empty_row("b", "Bye")]);
        let translator =
            FakeTranslator::replying(vec![translated("a", "Cześć"), translated("b", "Pa")]);
        let flow = UnitFlow::new(&config, &translator, "instructions");

        let outcome = flow.run(&session, &ctx()).await;

        assert!(outcome.is_success());
        assert!(translator.called.load(Ordering::SeqCst));
        assert_eq!(*session.saved.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_from_model_are_dropped() {
        let config = test_config();
        let session = FakeSession::with_rows(vec![empty_row("a", "Hi")]);
        let translator = FakeTranslator::replying(vec![
            translated("a", "Cześć"),
            translated("made-up", "???"),
        ]);
        let flow = UnitFlow::new(&config, &translator, "instructions");

        let outcome = flow.run(&session, &ctx()).await;

        assert!(outcome.is_success());
        assert_eq!(*session.saved.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_translate_failure_fails_unit_with_display_name() {
        let config = test_config();
        let session = FakeSession::with_rows(vec![empty_row("a", "Hi")]);
        let translator = FakeTranslator::failing();
        let flow = UnitFlow::new(&config, &translator, "instructions");

        let outcome = flow.run(&session, &ctx()).await;

        assert!(!outcome.is_success());
        assert!(matches!(outcome.result, Err(AppError::RemoteCall(_))));
        // 显示名在导航阶段已经读到
        assert_eq!(outcome.display_name, "demo_project.json");
        assert!(session.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_failure_yields_empty_display_name() {
        let config = test_config();
        let session = FakeSession {
            fail_open: true,
            ..Default::default()
        };
        let translator = FakeTranslator::replying(vec![]);
        let flow = UnitFlow::new(&config, &translator, "instructions");

        let outcome = flow.run(&session, &ctx()).await;

        assert!(!outcome.is_success());
        assert!(outcome.display_name.is_empty());
        assert!(!translator.called.load(Ordering::SeqCst));
    }
}
