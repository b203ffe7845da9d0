//! 空行采集器 - 业务能力层
//!
//! 驱动虚拟列表滚动，增量发现行并判定是否未翻译，聚合为一个批次。
//!
//! 虚拟列表只渲染视口附近的行，单次扫描必然漏行；采集器用
//! "连续 N 轮无新行" 的收敛规则区分"列表真的到头了"和"渲染还没跟上"。
//! 滚动机制属于行提供方，这里只负责判定与收敛。

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::NavigationError;
use crate::models::{RowSnapshot, TranslationItem};

/// 连续多少轮滚动没有新行即视为到达列表末尾
const MAX_STALL_PASSES: usize = 5;
/// 每轮滚动的固定距离（像素）
const SCROLL_STEP: f64 = 800.0;

/// 行提供方能力：返回当前已渲染行的快照，并按增量滚动视口
pub trait RowProvider {
    /// 当前已渲染行的快照（一次性读取，不是实时流）
    async fn visible_rows(&self, lang_marker: &str) -> Result<Vec<RowSnapshot>, NavigationError>;

    /// 纵向滚动视口
    async fn scroll_by(&self, delta: f64) -> Result<(), NavigationError>;
}

/// 空行采集器
pub struct Collector {
    lang_marker: String,
    scroll_settle: Duration,
}

impl Collector {
    pub fn new(config: &Config) -> Self {
        Self {
            lang_marker: config.target_lang_id.clone(),
            scroll_settle: config.scroll_delay,
        }
    }

    /// 采集所有未翻译的行
    ///
    /// 永不致命失败：读取行快照出错时提前结束，返回已累计的批次。
    /// 结束后把视口一次性滚回起点，调用方会继续使用该页面。
    pub async fn collect<P: RowProvider>(&self, provider: &P) -> Vec<TranslationItem> {
        let mut batch: Vec<TranslationItem> = Vec::new();
        let mut batch_ids: HashSet<String> = HashSet::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut stall_passes = 0usize;
        let mut total_scrolled = 0.0f64;

        info!("🔍 开始搜寻未翻译的行");

        while stall_passes < MAX_STALL_PASSES {
            let rows = match provider.visible_rows(&self.lang_marker).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("读取行快照失败，提前结束采集: {}", e);
                    break;
                }
            };

            let mut new_this_pass = 0usize;
            for row in rows {
                // 行在虚拟化过程中短暂消失又出现时不会被重新判定，首次判定生效
                if row.id.is_empty() || !seen.insert(row.id.clone()) {
                    continue;
                }
                new_this_pass += 1;

                if !is_untranslated(&row) {
                    continue;
                }
                // 批次内按 id 去重，独立于 seen
                if batch_ids.insert(row.id.clone()) {
                    let original = best_source_text(&row);
                    batch.push(TranslationItem::pending(row.id, original));
                }
            }

            if new_this_pass > 0 {
                stall_passes = 0;
            } else {
                stall_passes += 1;
            }
            debug!("本轮新行 {} 个，连续空轮 {}", new_this_pass, stall_passes);

            // 滚动失败不影响收敛判定，渲染延迟由 settle 等待兜住
            if let Err(e) = provider.scroll_by(SCROLL_STEP).await {
                debug!("滚动失败（忽略）: {}", e);
            }
            total_scrolled += SCROLL_STEP;
            sleep(self.scroll_settle).await;
        }

        if let Err(e) = provider.scroll_by(-total_scrolled).await {
            debug!("回滚视口失败（忽略）: {}", e);
        }

        info!("✅ 采集完成: 检查 {} 行，收集 {} 行", seen.len(), batch.len());
        batch
    }
}

/// 目标语言单元格是否视为"未翻译"
///
/// 三种情况之一：存在空态标记元素、文本去空白后为空、文本恰为占位词 `Empty`。
fn is_untranslated(row: &RowSnapshot) -> bool {
    let text = row.target_text.trim();
    row.has_empty_marker || text.is_empty() || text == "Empty"
}

/// 取最优的源文本：优先高亮子串，为空则退回完整文本，去除首尾空白
fn best_source_text(row: &RowSnapshot) -> String {
    match row.source_highlight.as_deref().map(str::trim) {
        Some(highlight) if !highlight.is_empty() => highlight.to_string(),
        _ => row.source_text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn row(id: &str, has_empty_marker: bool, target: &str, highlight: Option<&str>, source: &str) -> RowSnapshot {
        RowSnapshot {
            id: id.to_string(),
            has_empty_marker,
            target_text: target.to_string(),
            source_highlight: highlight.map(|s| s.to_string()),
            source_text: source.to_string(),
        }
    }

    fn empty_row(id: &str, source: &str) -> RowSnapshot {
        row(id, false, "", None, source)
    }

    /// 按预置轮次返回快照的行提供方
    struct FakeProvider {
        passes: Mutex<VecDeque<Vec<RowSnapshot>>>,
        calls: AtomicUsize,
        scrolls: Mutex<Vec<f64>>,
        fail_on_call: Option<usize>,
    }

    impl FakeProvider {
        fn new(passes: Vec<Vec<RowSnapshot>>) -> Self {
            Self {
                passes: Mutex::new(passes.into()),
                calls: AtomicUsize::new(0),
                scrolls: Mutex::new(Vec::new()),
                fail_on_call: None,
            }
        }

        fn failing_on(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }
    }

    impl RowProvider for FakeProvider {
        async fn visible_rows(&self, _lang_marker: &str) -> Result<Vec<RowSnapshot>, NavigationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(NavigationError::ElementNotFound {
                    selector: ".row-key".to_string(),
                });
            }
            Ok(self.passes.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn scroll_by(&self, delta: f64) -> Result<(), NavigationError> {
            self.scrolls.lock().unwrap().push(delta);
            Ok(())
        }
    }

    fn collector() -> Collector {
        Collector {
            lang_marker: "748".to_string(),
            scroll_settle: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_same_id_across_passes_collected_once() {
        let provider = FakeProvider::new(vec![
            vec![empty_row("a", "Hello")],
            vec![empty_row("a", "Hello"), empty_row("b", "World")],
        ]);
        let batch = collector().collect(&provider).await;

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, "a");
        assert_eq!(batch[1].id, "b");
    }

    #[tokio::test]
    async fn test_terminates_after_five_stall_passes() {
        let provider = FakeProvider::new(vec![]);
        let batch = collector().collect(&provider).await;

        assert!(batch.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), MAX_STALL_PASSES);
    }

    #[tokio::test]
    async fn test_provider_error_returns_accumulated_batch() {
        let provider =
            FakeProvider::new(vec![vec![empty_row("a", "Hello")]]).failing_on(1);
        let batch = collector().collect(&provider).await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, "a");
    }

    #[tokio::test]
    async fn test_classification_rules() {
        let provider = FakeProvider::new(vec![vec![
            row("marker", true, "istnieje", None, "s1"),
            row("blank", false, "   ", None, "s2"),
            row("placeholder", false, " Empty ", None, "s3"),
            row("translated", false, "przetłumaczone", None, "s4"),
        ]]);
        let batch = collector().collect(&provider).await;

        let ids: Vec<&str> = batch.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["marker", "blank", "placeholder"]);
    }

    #[tokio::test]
    async fn test_source_text_prefers_highlight() {
        let provider = FakeProvider::new(vec![vec![
            row("h", false, "", Some("  highlighted  "), "full text"),
            row("f", false, "", Some("   "), "  full text  "),
        ]]);
        let batch = collector().collect(&provider).await;

        assert_eq!(batch[0].original, "highlighted");
        assert_eq!(batch[1].original, "full text");
    }

    #[tokio::test]
    async fn test_viewport_restored_after_collection() {
        let provider = FakeProvider::new(vec![vec![empty_row("a", "x")]]);
        collector().collect(&provider).await;

        let scrolls = provider.scrolls.lock().unwrap().clone();
        let (back, forward) = scrolls.split_last().unwrap();
        let scrolled: f64 = forward.iter().sum();
        assert_eq!(*back, -scrolled);
    }

    #[tokio::test]
    async fn test_rows_without_id_are_ignored() {
        let provider = FakeProvider::new(vec![vec![empty_row("", "ghost")]]);
        let batch = collector().collect(&provider).await;

        assert!(batch.is_empty());
        // 无 id 的行不算新行，列表在阈值轮数内收敛
        assert_eq!(provider.calls.load(Ordering::SeqCst), MAX_STALL_PASSES);
    }
}
