//! 项目清单存储 - 业务能力层
//!
//! 待处理项目的持久化记录：单个 UTF-8 文本文件，每行一个项目 URL，
//! 空行与 `#` 注释行在读取时忽略。移除条目是锁内的完整
//! "读取-过滤-重写"，并发完成的多个流水线各自移除时都能看到
//! 最新的磁盘状态，不会基于过期快照互相覆盖。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;

/// 项目清单存储
pub struct WorkListStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WorkListStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取当前待处理的项目列表（保序去重）
    pub async fn load(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_units().await
    }

    /// 从清单中移除一个项目
    ///
    /// 重写后的文件恰好是原集合减去被移除项，空行、注释与重复行被丢弃，
    /// 每行一个条目，末尾带换行。
    pub async fn remove(&self, unit: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let remaining: Vec<String> = self
            .read_units()
            .await?
            .into_iter()
            .filter(|line| line != unit)
            .collect();

        let mut content = remaining.join("\n");
        content.push('\n');

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| StoreError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            })?;

        debug!("已从清单移除: {}", unit);
        Ok(())
    }

    async fn read_units(&self) -> Result<Vec<String>, StoreError> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::ReadFailed {
                path: self.path.display().to_string(),
                source,
            })?;

        let mut seen = HashSet::new();
        let mut units = Vec::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if seen.insert(line.to_string()) {
                units.push(line.to_string());
            }
        }
        Ok(units)
    }
}
