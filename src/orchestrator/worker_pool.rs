//! 并发许可池 - 编排层
//!
//! 固定大小的计数信号量：启动任务前先取许可，任务结束（无论成败）
//! 随许可 drop 归还名额。只做准入控制，与任务数量和调度顺序无关。

use std::sync::Arc;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// 并发许可池
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl WorkerPool {
    /// 创建许可池；上限至少为 1
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 获取一个准入许可；没有空位时挂起等待
    ///
    /// 许可随返回值的生命周期释放，把它 move 进任务即可。
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.semaphore.clone().acquire_owned().await
    }
}
