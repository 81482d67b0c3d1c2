use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 抓取生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Running,
    CancelRequested,
    Draining,
    Stopped,
}

impl CrawlState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CrawlState::Running,
            1 => CrawlState::CancelRequested,
            2 => CrawlState::Draining,
            _ => CrawlState::Stopped,
        }
    }
}

/// 取消协调器: 信号监听任务与抓取任务之间唯一的共享状态
///
/// 状态只会前进 `Running -> CancelRequested -> Draining -> Stopped`;
/// 抓取任务只在条目/页/价格区间之间检查取消标记, 不会中断进行中的请求。
#[derive(Debug)]
pub struct CancellationCoordinator {
    state: AtomicU8,
    cancel: CancellationToken,
    stopped: CancellationToken,
}

impl Default for CancellationCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationCoordinator {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(CrawlState::Running as u8),
            cancel: CancellationToken::new(),
            stopped: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> CrawlState {
        CrawlState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 请求取消; 只有第一次调用生效, 返回是否发生了状态转换
    pub fn request_cancel(&self) -> bool {
        let accepted = self.transition(CrawlState::Running, CrawlState::CancelRequested);
        if accepted {
            self.cancel.cancel();
        }
        accepted
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 进入收尾阶段
    pub fn begin_drain(&self) -> bool {
        self.transition(CrawlState::CancelRequested, CrawlState::Draining)
    }

    /// 标记结束 (正常完成或收尾完成)
    pub fn finish(&self) {
        self.state.store(CrawlState::Stopped as u8, Ordering::Release);
        self.stopped.cancel();
    }

    fn transition(&self, from: CrawlState, to: CrawlState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 监听 Ctrl-C; 第一次信号请求取消, 之后的信号被忽略, 抓取结束后任务退出
    pub fn listen_for_interrupt(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    signal = tokio::signal::ctrl_c() => {
                        if let Err(e) = signal {
                            tracing::error!("Failed to listen for interrupt: {}", e);
                            return;
                        }
                        if coordinator.request_cancel() {
                            tracing::warn!("Interrupt received, finishing current unit of work before exit");
                        } else {
                            tracing::info!("Interrupt ignored, shutdown already in progress ({:?})", coordinator.state());
                        }
                    }
                    _ = coordinator.stopped.cancelled() => return,
                }
            }
        })
    }
}
