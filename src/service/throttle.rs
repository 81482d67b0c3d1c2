use std::time::Duration;

/// 搜索调用之间的强制间隔
///
/// 每次调用结束后记下一个待完成的间隔, 在下一次调用前 (或流程结束前) 完整等待;
/// 取消不会缩短它。
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    pending: bool,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// 一次搜索调用已完成
    pub fn mark_call(&mut self) {
        self.pending = true;
    }

    /// 等待未完成的间隔
    pub async fn settle(&mut self) {
        if self.pending {
            tokio::time::sleep(self.delay).await;
            self.pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn settles_only_after_a_call() {
        let mut throttle = Throttle::new(Duration::from_millis(1500));
        let start = Instant::now();
        throttle.settle().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        throttle.mark_call();
        assert!(throttle.is_pending());
        throttle.settle().await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert!(!throttle.is_pending());

        // 已经等待过, 不再重复
        let again = Instant::now();
        throttle.settle().await;
        assert_eq!(again.elapsed(), Duration::ZERO);
    }
}
