// ==========================================
// 医院药品库存监控系统 - 定时刷新服务
// ==========================================
// 按固定间隔重新读取台账并重算库存状态
// 收到停止信号(如 Ctrl-C)后退出
// ==========================================

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 定时刷新器
#[derive(Debug, Clone, Copy)]
pub struct StatusRefresher {
    interval: Duration,
}

impl StatusRefresher {
    pub fn new(interval: Duration) -> Self {
        // tokio interval 不接受 0
        let interval = interval.max(Duration::from_millis(1));
        Self { interval }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 运行刷新循环
    ///
    /// 第一次刷新立即执行;单次刷新失败只记录 warn,不中断循环
    ///
    /// # 返回
    /// 已执行的刷新次数
    pub async fn run<T, E, F, S>(&self, mut refresh: F, shutdown: S) -> u64
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(interval_ms = self.interval.as_millis() as u64, "刷新循环启动");

        let mut ticks: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(ticks, "刷新循环停止");
                    break;
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    match refresh() {
                        Ok(_) => debug!(tick = ticks, "刷新完成"),
                        Err(e) => warn!(tick = ticks, error = %e, "刷新失败"),
                    }
                }
            }
        }

        ticks
    }
}
