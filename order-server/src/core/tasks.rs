//! 后台任务管理
//!
//! - [`TaskKind::Listener`] - 事件监听器 (账本 → 推送)
//! - [`TaskKind::Periodic`] - 定时任务 (心跳)
//!
//! 所有任务共享一个取消令牌；关闭时先取消，再在宽限期内等待，超时的任务被 abort。

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 关闭宽限期
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Listener,
    Periodic,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Listener => "listener",
            TaskKind::Periodic => "periodic",
        }
    }
}

/// 后台任务管理器
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.spawn("heartbeat", TaskKind::Periodic, run_heartbeat(hub, interval, tasks.shutdown_token()));
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    handles: Vec<(&'static str, JoinHandle<()>)>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 任务内部监听的取消令牌
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 启动任务；panic 被捕获并记录，不会拖垮进程
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if shutdown.is_cancelled() => {
                    tracing::debug!(task = name, kind = kind.as_str(), "Background task stopped");
                }
                Ok(()) => {
                    tracing::warn!(
                        task = name,
                        kind = kind.as_str(),
                        "Background task exited early"
                    );
                }
                Err(panic) => {
                    tracing::error!(
                        task = name,
                        kind = kind.as_str(),
                        panic = %panic_message(panic.as_ref()),
                        "Background task panicked"
                    );
                }
            }
        });
        self.handles.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 取消所有任务并等待退出
    pub async fn shutdown(self) {
        tracing::info!(count = self.handles.len(), "Stopping background tasks");
        self.shutdown.cancel();

        for (name, mut handle) in self.handles {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Task join failed"),
                Err(_) => {
                    tracing::warn!(task = name, "Task ignored shutdown, aborting");
                    handle.abort();
                }
            }
        }
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
