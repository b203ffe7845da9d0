//! # Loka Translator
//!
//! 一个用于自动化填写本地化平台空白译文的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Browser）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//! - `browser/` - 浏览器启动、登录会话、编辑器页面对象
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个批次
//! - `Collector` - 虚拟列表空行采集能力
//! - `GeminiTranslator` - 远程翻译能力
//! - `Filler` - 译文写回能力
//! - `WorkListStore` - 清单读写能力
//! - `Notifier` - 结果通知能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个项目"的完整处理流程
//! - `UnitCtx` - 上下文封装（url + unit_index）
//! - `UnitFlow` - 流程编排（打开 → 采集 → 翻译 → 写入）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 批量项目调度器，管理资源和并发
//! - `orchestrator/worker_pool` - 计数信号量准入池
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{launch_browser, EditorPage};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::TranslationItem;
pub use orchestrator::{App, WorkerPool};
pub use workflow::{PipelineOutcome, UnitCtx, UnitFlow, UnitStage};
