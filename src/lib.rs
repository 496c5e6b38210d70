//! # 分层时间轮定时器
//!
//! 基于 5 层分层时间轮（Hierarchical Timing Wheel）算法实现的高并发
//! 一次性定时器，插入与到期派发的均摊复杂度为 O(1)，逻辑时间精度固定
//! 为一个 tick（默认 10ms 真实时间）。适合嵌入事件驱动服务器、actor
//! 运行时和游戏循环，管理连接超时、重传定时等大规模超时回调，而不必
//! 每个 tick 扫描全局定时器列表。
//!
//! ## 特性
//!
//! - **分层桶结构**: 最外层 256 个细粒度桶 + 4 层各 64 个粗粒度桶，
//!   恰好覆盖 32 位 tick 空间；远期任务随时间逼近被级联逐步细化
//! - **O(1) 均摊成本**: 插入、整桶取出、级联重映射都不做逐任务扫描
//! - **线程安全**: 任意多线程并发插入，使用 `parking_lot` 提供的
//!   高性能锁机制；回调在锁外执行，回调内可以重新调度（周期任务的
//!   惯用写法）
//! - **确定性驱动**: 通过 [`TickClock`] 抽象注入时钟，[`ManualClock`]
//!   让测试完全可确定地回放时间流逝
//! - **回绕安全**: 走针在 2^32 处回绕是设计内的正常情况，有专门的
//!   级联路径和测试覆盖
//!
//! ## 快速开始
//!
//! ```no_run
//! use strata_timer::TimerWheel;
//! use std::thread;
//! use std::time::Duration;
//!
//! let timer = TimerWheel::with_defaults();
//!
//! // 100 个 tick（1 秒）后触发，标签用于把触发对应回具体主体
//! timer.schedule_ticks(100, 42, |tag| {
//!     println!("subject {} timed out", tag);
//! });
//!
//! // 驱动循环：比一个 tick 更勤地轮询以压低派发延迟
//! loop {
//!     timer.tick();
//!     thread::sleep(Duration::from_micros(2500));
//! }
//! ```

mod clock;
mod config;
mod error;
mod task;
mod timer;
mod wheel;

// 重新导出公共 API
pub use clock::{ManualClock, MonotonicClock, TickClock};
pub use config::{WheelConfig, WheelConfigBuilder};
pub use error::TimerError;
pub use task::{TaskId, TimerCallback};
pub use timer::{TimerHandle, TimerWheel};
