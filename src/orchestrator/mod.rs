//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个系统的"指挥中心"，负责批量调度与结果落账。
//!
//! ## 模块划分
//!
//! ### `app` - 应用编排器
//! - 管理应用生命周期（初始化、登录、运行）
//! - 加载项目清单并逐个派发流水线
//! - 成功后移除清单条目并发送通知
//! - 唯一持有 Browser 的模块
//!
//! ### `worker_pool` - 并发许可池
//! - 固定大小的计数信号量
//! - 先取许可再启动任务，结束即归还
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理 Vec<Unit>)
//!     ↓
//! workflow::UnitFlow (处理单个项目)
//!     ↓
//! services (能力层：collect / translate / fill / notify / store)
//!     ↓
//! infrastructure + browser (基础设施：JsExecutor / EditorPage)
//! ```

pub mod app;
pub mod worker_pool;

pub use app::App;
pub use worker_pool::WorkerPool;
