use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "cancel")]
use std::sync::atomic::AtomicBool;
#[cfg(feature = "cancel")]
use std::sync::Arc;

/// 全局唯一的任务 ID 生成器
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// 定时器任务的唯一标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// 生成一个新的唯一任务 ID
    pub fn new() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 获取任务 ID 的数值
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// 定时器回调 trait
///
/// 实现此 trait 的类型可以作为定时器的回调函数使用。回调在任务到期时
/// 被派发线程调用恰好一次，调用时传入注册时携带的关联标签 `tag`，
/// 调用方据此把触发事件对应回具体主体（例如线程号或连接号）。
///
/// 回调执行时时间轮的锁已经释放，因此回调内部可以再次调用
/// `TimerWheel::schedule_ticks` 重新武装定时器（周期性任务的惯用写法）。
///
/// # 示例
///
/// ```
/// use strata_timer::TimerCallback;
///
/// struct MyCallback;
///
/// impl TimerCallback for MyCallback {
///     fn call(self: Box<Self>, tag: i32) {
///         println!("timer fired for subject {}", tag);
///     }
/// }
/// ```
pub trait TimerCallback: Send + 'static {
    /// 执行回调，消耗自身（每个任务恰好派发一次）
    fn call(self: Box<Self>, tag: i32);
}

/// 为闭包实现 TimerCallback trait
///
/// 支持 `FnOnce(i32)` 类型的闭包；需要周期性触发时在回调内重新调度即可。
impl<F> TimerCallback for F
where
    F: FnOnce(i32) + Send + 'static,
{
    fn call(self: Box<Self>, tag: i32) {
        (*self)(tag)
    }
}

/// 定时器任务
///
/// 任务自创建起由时间轮（所在桶）持有；到期被整桶取出后所有权转移给
/// 派发线程，回调执行完毕即销毁。到期 tick 在创建后不再变化。
pub struct TimerTask {
    /// 任务唯一标识符
    pub(crate) id: TaskId,

    /// 绝对到期 tick（按 u32 回绕语义与时间轮走针比较）
    pub(crate) expire: u32,

    /// 关联标签，派发时原样传给回调
    pub(crate) tag: i32,

    /// 回调函数
    callback: Box<dyn TimerCallback>,

    /// 取消标记，与 TimerHandle 共享
    #[cfg(feature = "cancel")]
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl TimerTask {
    /// 创建定时器任务
    pub(crate) fn new(expire: u32, tag: i32, callback: Box<dyn TimerCallback>) -> Self {
        Self {
            id: TaskId::new(),
            expire,
            tag,
            callback,
            #[cfg(feature = "cancel")]
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 派发任务：执行回调并销毁任务
    ///
    /// 启用 `cancel` 特性时，已标记取消的任务跳过回调、直接销毁。
    pub(crate) fn run(self) {
        #[cfg(feature = "cancel")]
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        self.callback.call(self.tag);
    }
}
