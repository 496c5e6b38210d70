//! 定时器配置模块
//!
//! 提供配置结构和 Builder 模式，用于配置时间轮的 tick 精度。
//!
//! 时间轮的层级结构（1 层 256 格 + 4 层 64 格）由级联算法决定，
//! 不开放配置；唯一可调的参数是单个 tick 对应的真实时间长度。

use crate::error::TimerError;
use std::time::Duration;

/// 时间轮配置
///
/// # 示例
/// ```
/// use strata_timer::WheelConfig;
/// use std::time::Duration;
///
/// // 使用默认配置（10ms tick）
/// let config = WheelConfig::default();
///
/// // 使用 Builder 自定义配置
/// let config = WheelConfig::builder()
///     .tick_duration(Duration::from_millis(20))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct WheelConfig {
    /// 每个 tick 的时间长度
    pub tick_duration: Duration,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            tick_duration: Duration::from_millis(10),
        }
    }
}

impl WheelConfig {
    /// 创建配置构建器
    pub fn builder() -> WheelConfigBuilder {
        WheelConfigBuilder::default()
    }
}

/// 时间轮配置构建器
#[derive(Debug, Clone)]
pub struct WheelConfigBuilder {
    tick_duration: Duration,
}

impl Default for WheelConfigBuilder {
    fn default() -> Self {
        let config = WheelConfig::default();
        Self {
            tick_duration: config.tick_duration,
        }
    }
}

impl WheelConfigBuilder {
    /// 设置 tick 时长
    pub fn tick_duration(mut self, duration: Duration) -> Self {
        self.tick_duration = duration;
        self
    }

    /// 构建配置并进行验证
    ///
    /// # 返回
    /// - `Ok(WheelConfig)`: 配置有效
    /// - `Err(TimerError)`: 配置验证失败
    ///
    /// # 验证规则
    /// - tick_duration 必须大于 0
    /// - tick_duration 必须是整数毫秒（时钟换算以毫秒为单位）
    pub fn build(self) -> Result<WheelConfig, TimerError> {
        if self.tick_duration.is_zero() {
            return Err(TimerError::InvalidConfiguration {
                field: "tick_duration",
                reason: "tick 时长必须大于 0",
            });
        }

        if self.tick_duration.subsec_nanos() % 1_000_000 != 0 {
            return Err(TimerError::InvalidConfiguration {
                field: "tick_duration",
                reason: "tick 时长必须是整数毫秒",
            });
        }

        Ok(WheelConfig {
            tick_duration: self.tick_duration,
        })
    }
}
