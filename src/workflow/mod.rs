//! 流程层（Workflow Layer）
//!
//! 定义"一个项目"的完整处理流程：打开页面 → 采集空行 → 远程翻译 →
//! 写回译文，并把结果折叠成一个 [`PipelineOutcome`]。
//! 本层不持有任何页面资源，只依赖能力接口（services）。

pub mod unit_ctx;
pub mod unit_flow;

pub use unit_ctx::UnitCtx;
pub use unit_flow::{PipelineOutcome, UnitFlow, UnitSession, UnitStage};
