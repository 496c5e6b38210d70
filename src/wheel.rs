//! 分层时间轮核心数据结构
//!
//! 轮体由 5 层桶数组构成：最外层（near 层）256 个桶，直接以到期 tick 的
//! 低 8 位索引；其上 4 个粗粒度层各 64 个桶，分别以更高的 6 位窗口索引。
//! 8 + 4 × 6 = 32，五层恰好覆盖整个 u32 tick 空间，到期 tick 按 u32
//! 回绕语义与走针比较，2^32 处的回绕是设计内的正常情况。
//!
//! 三个纯函数承担所有位运算：[`placement`] 决定任务落在哪一层哪个桶，
//! [`cascade_source`] 决定某个 tick 边界上应当取出哪个粗层桶做级联，
//! `coarse_index` 计算粗层桶下标。锁和回调派发在上层 `timer` 模块处理，
//! 本模块内所有方法都假定调用方已持有守卫。

use crate::task::TimerTask;
use static_assertions::const_assert_eq;
use std::mem;
use tracing::trace;

/// near 层索引位宽
pub(crate) const NEAR_SHIFT: u32 = 8;
/// near 层桶数量
pub(crate) const NEAR: usize = 1 << NEAR_SHIFT;
/// near 层索引掩码
pub(crate) const NEAR_MASK: u32 = (NEAR - 1) as u32;
/// 粗粒度层索引位宽
pub(crate) const LEVEL_SHIFT: u32 = 6;
/// 每个粗粒度层的桶数量
pub(crate) const LEVEL: usize = 1 << LEVEL_SHIFT;
/// 粗粒度层索引掩码
pub(crate) const LEVEL_MASK: u32 = (LEVEL - 1) as u32;
/// 粗粒度层数量
pub(crate) const LEVEL_COUNT: usize = 4;

// 五层索引位必须恰好覆盖 32 位 tick 空间
const_assert_eq!(NEAR_SHIFT + LEVEL_SHIFT * LEVEL_COUNT as u32, 32);

/// 任务的落位结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// near 层的桶下标
    Near(usize),
    /// (粗粒度层号, 桶下标)
    Coarse(usize, usize),
}

/// 计算粗粒度层 `level` 中到期 tick 对应的桶下标
#[inline]
fn coarse_index(expire: u32, level: usize) -> usize {
    ((expire >> (NEAR_SHIFT + LEVEL_SHIFT * level as u32)) & LEVEL_MASK) as usize
}

/// 落位算法：给定当前走针 `time` 和绝对到期 tick `expire`，选出唯一的桶
///
/// near 层判据：`expire` 与 `time` 把低 8 位全部置 1 后相等，即高 24 位
/// 相等，此时 `expire - time`（mod 2^32）必然小于 256。否则自内向外尝试
/// 逐层加宽的掩码 `(256 << 6(i+1)) - 1`，第一个使两者"或掩码后相等"的
/// 层 i 即为归属层；前三层都不匹配则落入最粗的第 3 层。
///
/// 等价描述：找到同时包含 `expire` 和 `time` 的最小 64 幂对齐窗口，
/// 把任务放在它在该窗口内的位置上。离当前时间越近的任务粒度越细，
/// 远期任务先落粗桶、随时间逼近被级联逐步细化。
pub(crate) fn placement(time: u32, expire: u32) -> Placement {
    if (expire | NEAR_MASK) == (time | NEAR_MASK) {
        return Placement::Near((expire & NEAR_MASK) as usize);
    }
    let mut mask: u32 = (NEAR << LEVEL_SHIFT) as u32;
    for level in 0..LEVEL_COUNT - 1 {
        if (expire | (mask - 1)) == (time | (mask - 1)) {
            return Placement::Coarse(level, coarse_index(expire, level));
        }
        mask <<= LEVEL_SHIFT;
    }
    Placement::Coarse(LEVEL_COUNT - 1, coarse_index(expire, LEVEL_COUNT - 1))
}

/// 级联算法的桶选择：走针到达 `ct` 时应当整桶取出并重映射的粗层桶
///
/// - `ct == 0`：走针发生了 2^32 回绕，常规下标计算退化，无条件取出
///   第 3 层 0 号桶。
/// - 否则仅当 `ct` 的低 `8 + 6(i+1)` 位全为 0 时第 i 层才到达级联边界；
///   该层窗口下标非 0 则取它并停止，下标为 0 说明更外一层在同一 tick
///   也到达边界，继续向外检查。
///
/// 每个 tick 边界至多取出一个桶，把 O(桶大小) 的重映射成本摊到时间上；
/// 一个任务在走向到期的路上每层至多被级联一次，均摊 O(1)。
pub(crate) fn cascade_source(ct: u32) -> Option<(usize, usize)> {
    if ct == 0 {
        return Some((LEVEL_COUNT - 1, 0));
    }
    let mut mask: u32 = NEAR as u32;
    let mut upper = ct >> NEAR_SHIFT;
    for level in 0..LEVEL_COUNT {
        if ct & (mask - 1) != 0 {
            return None;
        }
        let idx = (upper & LEVEL_MASK) as usize;
        if idx != 0 {
            return Some((level, idx));
        }
        // 下标为 0 且 ct != 0，必然存在更高的非零窗口，继续向外走
        mask <<= LEVEL_SHIFT;
        upper >>= LEVEL_SHIFT;
    }
    // ct != 0 时四层窗口不可能全为 0
    None
}

/// 时间轮轮体
///
/// 持有全部待触发任务和调度时钟状态。本结构不含锁，线程安全由上层的
/// `parking_lot::Mutex<Wheel>` 保证；所有方法都要求在守卫内调用。
pub(crate) struct Wheel {
    /// near 层桶数组，每个桶是按插入顺序排列的任务序列
    near: Vec<Vec<TimerTask>>,

    /// 4 个粗粒度层的桶数组
    levels: Vec<Vec<Vec<TimerTask>>>,

    /// 逻辑走针：自轮体创建以来经过的 tick 数，到期比较的坐标系
    time: u32,

    /// 当前存于轮体内的任务数
    pending: usize,

    /// 驱动侧记录的最近一次时钟读数，仅用于计算经过的 tick 数
    pub(crate) current_point: u64,

    /// 创建时刻的时钟读数
    pub(crate) start_point: u64,
}

impl Wheel {
    /// 创建空轮体，记录初始时钟读数
    pub(crate) fn new(start_point: u64) -> Self {
        let mut near = Vec::with_capacity(NEAR);
        for _ in 0..NEAR {
            near.push(Vec::new());
        }
        let mut levels = Vec::with_capacity(LEVEL_COUNT);
        for _ in 0..LEVEL_COUNT {
            let mut slots = Vec::with_capacity(LEVEL);
            for _ in 0..LEVEL {
                slots.push(Vec::new());
            }
            levels.push(slots);
        }
        Self {
            near,
            levels,
            time: 0,
            pending: 0,
            current_point: start_point,
            start_point,
        }
    }

    /// 当前逻辑走针
    pub(crate) fn current_tick(&self) -> u32 {
        self.time
    }

    /// 当前存于轮体内的任务数
    pub(crate) fn task_count(&self) -> usize {
        self.pending
    }

    /// 放入一个新任务
    pub(crate) fn schedule(&mut self, task: TimerTask) {
        self.place(task);
        self.pending += 1;
    }

    /// 按落位算法把任务挂入对应的桶（不改变计数，级联重映射复用此方法）
    fn place(&mut self, task: TimerTask) {
        match placement(self.time, task.expire) {
            Placement::Near(idx) => {
                // near 层落位保证到期在当前走针的 256 tick 窗口内
                debug_assert!(task.expire.wrapping_sub(self.time) < NEAR as u32);
                self.near[idx].push(task);
            }
            Placement::Coarse(level, idx) => self.levels[level][idx].push(task),
        }
    }

    /// 走针前进一格并在需要时做级联
    ///
    /// 走针按 u32 回绕递增。若新值命中某个粗层桶的级联边界（含回绕到 0
    /// 的特殊情况），整桶取出其中任务并逐个重新落位。
    pub(crate) fn shift(&mut self) {
        self.time = self.time.wrapping_add(1);
        if let Some((level, idx)) = cascade_source(self.time) {
            let moved = mem::take(&mut self.levels[level][idx]);
            if !moved.is_empty() {
                trace!(
                    tick = self.time,
                    level,
                    slot = idx,
                    moved = moved.len(),
                    "级联重映射"
                );
            }
            for task in moved {
                self.place(task);
            }
        }
    }

    /// 整桶取出当前走针对应的 near 层桶
    ///
    /// 返回的序列保持插入顺序；桶本身被原子地重置为空，调用方可以在
    /// 释放守卫后安全地逐个派发。
    pub(crate) fn expired(&mut self) -> Vec<TimerTask> {
        let idx = (self.time & NEAR_MASK) as usize;
        let drained = mem::take(&mut self.near[idx]);
        self.pending -= drained.len();
        drained
    }

    /// 释放全部待触发任务（不执行回调），返回释放的数量
    pub(crate) fn clear(&mut self) -> usize {
        for slot in self.near.iter_mut() {
            slot.clear();
        }
        for level in self.levels.iter_mut() {
            for slot in level.iter_mut() {
                slot.clear();
            }
        }
        mem::replace(&mut self.pending, 0)
    }

    /// 直接设置走针，用于覆盖回绕等边界场景
    #[cfg(test)]
    pub(crate) fn set_time(&mut self, time: u32) {
        self.time = time;
    }
}
