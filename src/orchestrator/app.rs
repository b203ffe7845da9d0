//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：读取指令文本、启动浏览器、完成登录
//! 2. **清单加载**：从清单文件读出全部待处理项目
//! 3. **并发控制**：通过 WorkerPool 准入，先取许可再开任务
//! 4. **结果落账**：成功的项目移出清单，任何结果都发一条通知
//! 5. **资源管理**：唯一持有 Browser，每个项目分配独立页面
//! 6. **全局统计**：汇总所有项目的处理结果
//!
//! 单元级错误在这里被兜住，绝不影响其他项目；只有初始化阶段的
//! 失败才会让整个进程以非零退出。

use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser::{launch_browser, login, EditorPage};
use crate::config::Config;
use crate::orchestrator::WorkerPool;
use crate::services::{GeminiTranslator, Notifier, WorkListStore};
use crate::workflow::{PipelineOutcome, UnitCtx, UnitFlow};

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    store: Arc<WorkListStore>,
    notifier: Arc<Notifier>,
    translator: Arc<GeminiTranslator>,
    instructions: Arc<String>,
}

impl App {
    /// 初始化应用
    ///
    /// 这里的任何失败都是进程级的，直接向上传播退出。
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let instructions = tokio::fs::read_to_string(&config.prompt_file)
            .await
            .with_context(|| format!("读取指令文件 {} 失败", config.prompt_file))?;

        let browser = launch_browser().await?;

        // 人工登录只发生在这里，所有流水线启动之前
        login::ensure_session(&browser, &config).await.context("登录失败")?;

        let store = Arc::new(WorkListStore::new(&config.input_file));
        let notifier = Arc::new(Notifier::new(&config));
        let translator = Arc::new(GeminiTranslator::new(&config));

        Ok(Self {
            config,
            browser,
            store,
            notifier,
            translator,
            instructions: Arc::new(instructions),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let units = self.store.load().await.context("读取项目清单失败")?;

        if units.is_empty() {
            warn!("⚠️ 项目清单为空，程序结束");
            return Ok(());
        }

        let total = units.len();
        log_units_loaded(total, self.config.max_concurrency);

        let pool = WorkerPool::new(self.config.max_concurrency);
        let mut handles = Vec::new();
        let mut stats = RunStats {
            total,
            ..Default::default()
        };

        for (idx, url) in units.into_iter().enumerate() {
            let unit_index = idx + 1;

            // 准入控制：没有空位时在这里挂起
            let permit = pool.admit().await?;

            // 每个项目使用独立页面，导航互不可见
            let page = match self.browser.new_page("about:blank").await {
                Ok(page) => page,
                Err(e) => {
                    error!("[项目 {}] ❌ 创建页面失败: {}", unit_index, e);
                    self.notifier.send(&failure_message(&url, &url)).await;
                    stats.failed += 1;
                    continue;
                }
            };
            let session = EditorPage::new(page, &self.config);

            let config = self.config.clone();
            let translator = self.translator.clone();
            let instructions = self.instructions.clone();
            let store = self.store.clone();
            let notifier = self.notifier.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                info!("[项目 {}] 🚀 开始处理: {}", unit_index, url);

                let flow = UnitFlow::new(&config, translator.as_ref(), &instructions);
                let ctx = UnitCtx::new(url, unit_index);
                let outcome = flow.run(&session, &ctx).await;

                settle_outcome(outcome, unit_index, &store, &notifier).await
            });
            handles.push((unit_index, handle));
        }

        // 等待全部流水线结束并汇总
        for (unit_index, handle) in handles {
            match handle.await {
                Ok(true) => stats.success += 1,
                Ok(false) => stats.failed += 1,
                Err(e) => {
                    error!("[项目 {}] 任务执行失败: {}", unit_index, e);
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(&stats);
        Ok(())
    }
}

/// 处理单个项目的最终结果
///
/// 成功时把条目移出清单（移除失败只告警，条目下次运行重试）；
/// 无论成败都恰好发送一条通知。
async fn settle_outcome(
    outcome: PipelineOutcome,
    unit_index: usize,
    store: &WorkListStore,
    notifier: &Notifier,
) -> bool {
    let label = if outcome.display_name.is_empty() {
        outcome.unit.clone()
    } else {
        outcome.display_name.clone()
    };

    match &outcome.result {
        Ok(()) => {
            if let Err(e) = store.remove(&outcome.unit).await {
                warn!("[项目 {}] ⚠️ 从清单移除失败: {}", unit_index, e);
            }
            info!("[项目 {}] ✅ 完成: {}", unit_index, label);
            notifier.send(&success_message(&outcome.unit, &label)).await;
            true
        }
        Err(e) => {
            error!("[项目 {}] ❌ 处理失败: {} ({})", unit_index, label, e);
            notifier.send(&failure_message(&outcome.unit, &label)).await;
            false
        }
    }
}

fn success_message(url: &str, display: &str) -> String {
    format!("✅ 处理完成:\n<a href=\"{}\">{}</a>", url, display)
}

fn failure_message(url: &str, display: &str) -> String {
    format!("❌ 处理失败:\n<a href=\"{}\">{}</a>", url, display)
}

/// 处理统计
#[derive(Debug, Default)]
struct RunStats {
    success: usize,
    failed: usize,
    total: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多项目翻译模式");
    info!("📊 最大并发数: {}", config.max_concurrency);
    info!("🌐 目标语言标记: {}", config.target_lang_id);
    info!("{}", "=".repeat(60));
}

fn log_units_loaded(total: usize, max_concurrency: usize) {
    info!("📋 找到 {} 个待处理的项目", total);
    info!("💡 同时最多处理 {} 个\n", max_concurrency);
}

fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
}
