// ==========================================
// CBAM 铝业碳排放平台 - 异步持久化分发
// ==========================================
// 规则: 写入即发即忘 (fire-and-forget)
// - 有 tokio 运行时: spawn_blocking 后台执行,按分发顺序串行落库
// - 无运行时: 当场同步执行
// 红线: 写入失败只记日志与失败记录,不重试,不回滚内存状态
// ==========================================

use crate::repository::error::RepositoryResult;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 一次失败的写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceFailure {
    pub collection: String,
    pub operation: String,
    pub record_id: String,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

/// 失败记录 (旁路通道,供调用方查询)
#[derive(Debug, Clone, Default)]
pub struct PersistenceFailureLog {
    entries: Arc<Mutex<Vec<PersistenceFailure>>>,
}

impl PersistenceFailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<PersistenceFailure>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, failure: PersistenceFailure) {
        self.guard().push(failure);
    }

    pub fn entries(&self) -> Vec<PersistenceFailure> {
        self.guard().clone()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// 取出并清空
    pub fn drain(&self) -> Vec<PersistenceFailure> {
        std::mem::take(&mut *self.guard())
    }
}

/// 写入目标描述
#[derive(Debug, Clone)]
pub struct WriteTarget {
    pub collection: &'static str,
    pub operation: &'static str,
    pub record_id: String,
}

impl WriteTarget {
    pub fn new(collection: &'static str, operation: &'static str, record_id: impl Into<String>) -> Self {
        Self {
            collection,
            operation,
            record_id: record_id.into(),
        }
    }
}

// ==========================================
// PersistenceDispatcher
// ==========================================
#[derive(Debug, Default)]
pub struct PersistenceDispatcher {
    failures: PersistenceFailureLog,
    pending: Mutex<PendingWrites>,
}

/// 未完成的后台写入
///
/// tail: 最近一次写入的完成信号,下一次写入须等它结束 (create 先于 update)
#[derive(Debug, Default)]
struct PendingWrites {
    tasks: Vec<JoinHandle<()>>,
    tail: Option<oneshot::Receiver<()>>,
}

impl PersistenceDispatcher {
    pub fn new(failures: PersistenceFailureLog) -> Self {
        Self {
            failures,
            pending: Mutex::new(PendingWrites::default()),
        }
    }

    pub fn failures(&self) -> &PersistenceFailureLog {
        &self.failures
    }

    /// 分发一次写入,不等待结果
    pub fn dispatch<F>(&self, target: WriteTarget, write: F)
    where
        F: FnOnce() -> RepositoryResult<()> + Send + 'static,
    {
        let failures = self.failures.clone();
        let job = move || {
            if let Err(e) = write() {
                tracing::error!(
                    collection = target.collection,
                    operation = target.operation,
                    record_id = %target.record_id,
                    error = %e,
                    "持久化写入失败"
                );
                failures.record(PersistenceFailure {
                    collection: target.collection.to_string(),
                    operation: target.operation.to_string(),
                    record_id: target.record_id,
                    error: e.to_string(),
                    occurred_at: Utc::now(),
                });
            }
        };

        match Handle::try_current() {
            Ok(handle) => {
                let mut pending = self.pending_guard();
                pending.tasks.retain(|t| !t.is_finished());
                let (done_tx, done_rx) = oneshot::channel();
                let previous = pending.tail.replace(done_rx);
                let task = handle.spawn(async move {
                    if let Some(previous) = previous {
                        // 前一次写入 panic 时发送端被丢弃,这里照常继续
                        let _ = previous.await;
                    }
                    if let Err(e) = tokio::task::spawn_blocking(job).await {
                        tracing::error!(error = %e, "持久化任务异常退出");
                    }
                    let _ = done_tx.send(());
                });
                pending.tasks.push(task);
            }
            Err(_) => job(),
        }
    }

    /// 等待所有已分发写入完成 (测试 / 关闭时使用)
    pub async fn flush(&self) {
        // tail 保留: flush 期间新分发的写入仍排在在途写入之后
        let tasks = std::mem::take(&mut self.pending_guard().tasks);
        if tasks.is_empty() {
            return;
        }
        let count = tasks.len();
        for result in join_all(tasks).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "持久化任务异常退出");
            }
        }
        tracing::debug!(count, "持久化写入已全部完成");
    }

    /// 未完成的后台写入数
    pub fn pending_count(&self) -> usize {
        let mut pending = self.pending_guard();
        pending.tasks.retain(|t| !t.is_finished());
        pending.tasks.len()
    }

    fn pending_guard(&self) -> MutexGuard<'_, PendingWrites> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::RepositoryError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_without_runtime_runs_inline() {
        let dispatcher = PersistenceDispatcher::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        dispatcher.dispatch(WriteTarget::new("suppliers", "create", "s1"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dispatcher.failures().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_after_flush() {
        let dispatcher = PersistenceDispatcher::default();
        dispatcher.dispatch(WriteTarget::new("cbam_reports", "update", "cbam-9"), || {
            Err(RepositoryError::NotFound {
                entity: "CbamReport".to_string(),
                id: "cbam-9".to_string(),
            })
        });
        dispatcher.flush().await;

        let failures = dispatcher.failures().drain();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].collection, "cbam_reports");
        assert_eq!(failures[0].record_id, "cbam-9");
        assert!(dispatcher.failures().is_empty());
    }

    #[tokio::test]
    async fn test_writes_apply_in_dispatch_order() {
        let dispatcher = PersistenceDispatcher::default();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..16 {
            let order = Arc::clone(&order);
            dispatcher.dispatch(WriteTarget::new("cbam_reports", "update", format!("cbam-{}", i)), move || {
                std::thread::sleep(std::time::Duration::from_millis((16 - i) as u64));
                order.lock().unwrap().push(i);
                Ok(())
            });
        }
        dispatcher.flush().await;

        assert_eq!(*order.lock().unwrap(), (0..16).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_finished_writes_are_pruned_without_flush() {
        let dispatcher = PersistenceDispatcher::default();
        for i in 0..8 {
            dispatcher.dispatch(WriteTarget::new("suppliers", "create", format!("s{}", i)), || Ok(()));
        }

        let mut remaining = dispatcher.pending_count();
        for _ in 0..200 {
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            remaining = dispatcher.pending_count();
        }
        assert_eq!(remaining, 0);

        // 再次分发时已完成的句柄被清理
        dispatcher.dispatch(WriteTarget::new("suppliers", "create", "s8"), || Ok(()));
        assert!(dispatcher.pending_count() <= 1);
        dispatcher.flush().await;
        assert_eq!(dispatcher.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_write_dispatched_during_flush_stays_ordered() {
        let dispatcher = PersistenceDispatcher::default();
        let order = Arc::new(Mutex::new(Vec::new()));

        let slow = Arc::clone(&order);
        dispatcher.dispatch(WriteTarget::new("cbam_reports", "create", "cbam-1"), move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            slow.lock().unwrap().push("create");
            Ok(())
        });

        let fast = Arc::clone(&order);
        tokio::join!(dispatcher.flush(), async {
            tokio::task::yield_now().await;
            dispatcher.dispatch(WriteTarget::new("cbam_reports", "update", "cbam-1"), move || {
                fast.lock().unwrap().push("update");
                Ok(())
            });
        });
        dispatcher.flush().await;

        assert_eq!(*order.lock().unwrap(), vec!["create", "update"]);
    }
}
