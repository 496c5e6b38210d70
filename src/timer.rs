use crate::clock::{MonotonicClock, TickClock};
use crate::config::WheelConfig;
use crate::task::{TaskId, TimerCallback, TimerTask};
use crate::wheel::Wheel;
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "cancel")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "cancel")]
use std::sync::Arc;

/// 定时器句柄
///
/// 插入成功时返回，仅用于身份识别（比较 [`TaskId`]）。
///
/// 启用 `cancel` 特性后句柄额外提供 [`cancel`](TimerHandle::cancel)；
/// 注意取消只是尽力而为：任务可能已经被整桶取出、正处于派发途中，
/// 此时取消标记来不及阻止回调执行。默认关闭该特性正是因为这条竞争
/// 没有廉价的安全解法。
#[derive(Clone)]
pub struct TimerHandle {
    task_id: TaskId,
    #[cfg(feature = "cancel")]
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    /// 获取任务 ID
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// 标记任务取消
    ///
    /// 被标记的任务在派发时跳过回调、照常释放。对已经触发或正在派发
    /// 的任务调用无效果。
    #[cfg(feature = "cancel")]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// 分层时间轮定时器
///
/// 任意多个线程可以并发调用调度方法；约定由单个线程在固定的真实时间
/// 间隔上反复调用 [`tick`](TimerWheel::tick)（建议每 1/4 个 tick 一次，
/// 以压低到期与派发之间的延迟——调用得更勤只会让未满一个 tick 的调用
/// 成为空操作，不会让时间轮多走）。
///
/// 单把 `parking_lot::Mutex` 串行化对轮体的全部修改：落位、级联、整桶
/// 取出都在守卫内完成；回调一律在守卫外执行，因此回调内可以再次调度
/// 新的定时器而不会死锁。
///
/// # 示例
/// ```
/// use strata_timer::{ManualClock, TimerWheel, WheelConfig};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new());
/// let timer = TimerWheel::with_clock(WheelConfig::default(), Arc::clone(&clock));
///
/// timer.schedule_ticks(3, 7, |tag| {
///     println!("subject {} timed out", tag);
/// });
///
/// clock.advance(3);
/// timer.tick();
/// ```
pub struct TimerWheel {
    /// 轮体（含调度时钟状态），单把锁保护
    wheel: Mutex<Wheel>,

    /// 时钟协作者
    clock: Box<dyn TickClock>,

    /// 单个 tick 的真实时间长度，用于 Duration 到 tick 的换算
    tick_duration: Duration,
}

impl TimerWheel {
    /// 使用单调时钟创建定时器
    ///
    /// 创建时刻的时钟读数被记录为起点。
    pub fn new(config: WheelConfig) -> Self {
        let clock = MonotonicClock::new(config.tick_duration);
        Self::with_clock(config, clock)
    }

    /// 创建带默认配置（10ms tick）的定时器
    pub fn with_defaults() -> Self {
        Self::new(WheelConfig::default())
    }

    /// 使用自定义时钟创建定时器
    ///
    /// # 参数
    /// - `config`: 时间轮配置
    /// - `clock`: 时钟协作者，测试中常用 [`crate::ManualClock`]
    pub fn with_clock<C>(config: WheelConfig, clock: C) -> Self
    where
        C: TickClock,
    {
        let start_point = clock.now_ticks();
        Self {
            wheel: Mutex::new(Wheel::new(start_point)),
            clock: Box::new(clock),
            tick_duration: config.tick_duration,
        }
    }

    /// 调度一次性定时器（以 tick 为单位）
    ///
    /// # 参数
    /// - `delay_ticks`: 距现在多少个 tick 触发。小于等于 0 时回调在本次
    ///   调用内同步执行（在守卫外），不分配任务
    /// - `tag`: 关联标签，触发时原样传给回调
    /// - `callback`: 回调，派发线程恰好调用一次
    ///
    /// # 返回
    /// 任务进入时间轮时返回句柄；立即触发时返回 `None`
    pub fn schedule_ticks<C>(&self, delay_ticks: i32, tag: i32, callback: C) -> Option<TimerHandle>
    where
        C: TimerCallback,
    {
        if delay_ticks <= 0 {
            // 立即到期：不进轮体，在守卫外同步执行
            Box::new(callback).call(tag);
            return None;
        }

        let mut wheel = self.wheel.lock();
        let expire = wheel.current_tick().wrapping_add(delay_ticks as u32);
        let task = TimerTask::new(expire, tag, Box::new(callback));
        let task_id = task.id;
        #[cfg(feature = "cancel")]
        let cancelled = Arc::clone(&task.cancelled);
        wheel.schedule(task);
        drop(wheel);

        Some(TimerHandle {
            task_id,
            #[cfg(feature = "cancel")]
            cancelled,
        })
    }

    /// 调度一次性定时器（以真实时间为单位）
    ///
    /// 延迟按 tick 时长向下取整换算；非零但不足一个 tick 的延迟按
    /// 1 个 tick 处理，零延迟立即触发。
    pub fn schedule<C>(&self, delay: Duration, tag: i32, callback: C) -> Option<TimerHandle>
    where
        C: TimerCallback,
    {
        let mut ticks = (delay.as_millis() / self.tick_duration.as_millis())
            .min(i32::MAX as u128) as i32;
        if ticks == 0 && !delay.is_zero() {
            ticks = 1;
        }
        self.schedule_ticks(ticks, tag, callback)
    }

    /// 驱动步：对照时钟推进时间轮并派发到期任务
    ///
    /// 读取时钟并与记录值求差 `diff`，随后恰好执行 `diff` 次完整的
    /// "派发 + 走针级联 + 派发"。绝不把走针一次跳过多格：中间每个 tick
    /// 的级联都必须发生，否则落在中间桶里的任务会被跳过。
    ///
    /// 时钟读数不足一个 tick 时本方法是空操作；读数回跳时记录值保持
    /// 在已达到的最大值上并输出诊断，逻辑走针从不回退。
    pub fn tick(&self) {
        let reading = self.clock.now_ticks();
        let diff = {
            let mut wheel = self.wheel.lock();
            if reading < wheel.current_point {
                warn!(
                    reading,
                    recorded = wheel.current_point,
                    "时钟读数回跳，时间轮本次不推进"
                );
                0
            } else {
                let diff = reading - wheel.current_point;
                wheel.current_point = reading;
                diff
            }
        };
        for _ in 0..diff {
            self.update();
        }
    }

    /// 单个逻辑 tick 的完整步骤
    ///
    /// 走针前的派发处理"本 tick 内已经到期"的任务，走针后的派发处理
    /// 刚被级联送进 near 层的任务。
    fn update(&self) {
        self.execute();
        self.wheel.lock().shift();
        self.execute();
    }

    /// 派发当前走针对应的 near 层桶
    ///
    /// 整桶取出后释放守卫再逐个执行回调，然后重新检查：回调若调度了
    /// 落回同一桶的任务，会在同一个逻辑 tick 内触发而不是被悄悄推迟。
    fn execute(&self) {
        loop {
            let expired = self.wheel.lock().expired();
            if expired.is_empty() {
                return;
            }
            for task in expired {
                task.run();
            }
        }
    }

    /// 当前逻辑走针（自创建以来经过的 tick 数，按 u32 回绕）
    pub fn current_tick(&self) -> u32 {
        self.wheel.lock().current_tick()
    }

    /// 当前待触发的任务数
    pub fn task_count(&self) -> usize {
        self.wheel.lock().task_count()
    }

    /// 自创建以来时钟经过的 tick 单位数
    pub fn uptime_ticks(&self) -> u64 {
        let wheel = self.wheel.lock();
        wheel.current_point - wheel.start_point
    }

    /// 关闭定时器
    ///
    /// 释放所有还未触发的任务，不执行任何回调。消耗自身，之后无法再
    /// 调度或驱动。
    ///
    /// # 返回
    /// 被释放的任务数
    pub fn shutdown(self) -> usize {
        let released = self.wheel.into_inner().clear();
        debug!(released, "时间轮关闭，未触发任务已全部释放");
        released
    }
}
