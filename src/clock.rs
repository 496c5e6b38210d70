//! 时钟抽象模块
//!
//! 时间轮驱动（`TimerWheel::tick`）不直接读取系统时间，而是通过
//! [`TickClock`] 协作者获取"自某固定起点以来经过了多少个 tick 单位"。
//! 生产环境使用 [`MonotonicClock`]；测试和基准可以使用 [`ManualClock`]
//! 手动推进时间，使驱动逻辑完全可确定地回放。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 时钟协作者 trait
///
/// 实现者需要返回一个 64 位的 tick 计数，要求单调不减；
/// 平台特定的时钟回跳由驱动侧容忍（记录诊断、不推进时间轮），
/// 实现者不需要自行处理。
pub trait TickClock: Send + Sync + 'static {
    /// 返回自任意固定起点以来经过的 tick 单位数
    fn now_ticks(&self) -> u64;
}

/// 共享时钟：测试中常以 `Arc<ManualClock>` 同时交给定时器和测试代码
impl<C: TickClock + ?Sized> TickClock for std::sync::Arc<C> {
    fn now_ticks(&self) -> u64 {
        (**self).now_ticks()
    }
}

/// 基于 `std::time::Instant` 的单调时钟
///
/// 以创建时刻为起点，把经过的真实时间按 tick 时长换算成 tick 计数。
pub struct MonotonicClock {
    origin: Instant,
    tick_millis: u64,
}

impl MonotonicClock {
    /// 创建单调时钟
    ///
    /// # 参数
    /// - `tick_duration`: 单个 tick 对应的真实时间（已验证为整数毫秒且非零）
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            origin: Instant::now(),
            tick_millis: tick_duration.as_millis() as u64,
        }
    }
}

impl TickClock for MonotonicClock {
    fn now_ticks(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64 / self.tick_millis
    }
}

/// 手动时钟
///
/// tick 计数只在调用 [`ManualClock::advance`] 或 [`ManualClock::set`]
/// 时变化，用于测试和基准中模拟时间流逝。
///
/// # 示例
/// ```
/// use strata_timer::ManualClock;
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new());
/// clock.advance(5);
/// ```
#[derive(Default)]
pub struct ManualClock {
    ticks: AtomicU64,
}

impl ManualClock {
    /// 创建起点为 0 的手动时钟
    pub fn new() -> Self {
        Self::default()
    }

    /// 将时钟向前推进 `n` 个 tick
    pub fn advance(&self, n: u64) {
        self.ticks.fetch_add(n, Ordering::SeqCst);
    }

    /// 直接设置时钟读数（允许设置为更小的值，用于模拟时钟回跳）
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }
}

impl TickClock for ManualClock {
    fn now_ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}
