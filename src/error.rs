//! 应用错误类型
//!
//! 错误分类与传播策略：
//! - 单元级错误（导航 / 提取 / 远程调用 / 交互）只终止当前项目的流水线，
//!   由编排层转换为失败结果并发送通知，不影响其他项目
//! - 存储错误在移除清单条目时只记录日志，项目会在下次运行时重试
//! - 进程级错误（无法读取清单、无法启动浏览器）直接以非零退出码结束

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 页面导航 / 脚本执行错误
    #[error("导航错误: {0}")]
    Navigation(#[from] NavigationError),
    /// 模型响应提取错误
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 远程翻译调用错误
    #[error("远程调用错误: {0}")]
    RemoteCall(#[from] RemoteCallError),
    /// 页面交互错误（填写阶段）
    #[error("交互错误: {0}")]
    Interaction(#[from] InteractionError),
    /// 清单文件错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
}

/// 导航相关错误
#[derive(Debug, Error)]
pub enum NavigationError {
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 页面元素不存在
    #[error("未找到页面元素: {selector}")]
    ElementNotFound { selector: String },
}

/// 模型响应提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 清洗后的文本中没有可解析的 JSON 对象
    #[error("响应中没有可解析的 JSON 对象，清洗后文本: {sanitized}")]
    NoJsonObject { sanitized: String },
    /// JSON 可解析但不符合结果结构
    #[error("响应 JSON 不符合结果结构: {source}，清洗后文本: {sanitized}")]
    SchemaMismatch {
        sanitized: String,
        source: serde_json::Error,
    },
}

/// 远程翻译调用错误
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// 网络请求失败
    #[error("请求 {endpoint} 失败: {source}")]
    RequestFailed {
        endpoint: String,
        source: reqwest::Error,
    },
    /// 响应体不是合法的接口信封
    #[error("响应信封解析失败: {source}")]
    EnvelopeParseFailed { source: serde_json::Error },
    /// 信封中没有任何候选内容
    #[error("响应信封中没有候选内容")]
    EmptyEnvelope,
}

/// 页面交互错误（填写翻译时）
#[derive(Debug, Error)]
pub enum InteractionError {
    /// 目标行在页面上不存在
    #[error("未找到行 {id}")]
    RowNotFound { id: String },
    /// 行无法滚动进视口
    #[error("滚动到行 {id} 失败: {source}")]
    ScrollIntoViewFailed {
        id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 打开行编辑器失败
    #[error("打开行 {id} 的编辑器失败: {source}")]
    EditorOpenFailed {
        id: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 输入译文失败
    #[error("输入译文失败: {source}")]
    TypingFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 点击保存失败
    #[error("点击保存失败: {source}")]
    SaveFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 无法探测编辑器可见状态
    #[error("探测编辑器状态失败: {source}")]
    ProbeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 清单文件错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读取清单失败
    #[error("读取清单 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 重写清单失败
    #[error("重写清单 {path} 失败: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl NavigationError {
    /// 创建脚本执行错误
    pub fn script(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        NavigationError::ScriptExecutionFailed {
            source: Box::new(source),
        }
    }

    /// 创建导航失败错误
    pub fn goto(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        NavigationError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        }
    }
}

impl InteractionError {
    /// 创建打开编辑器失败错误
    pub fn open_editor(
        id: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        InteractionError::EditorOpenFailed {
            id: id.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
