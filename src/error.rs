use std::fmt;

/// 定时器错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// 配置参数无效
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidConfiguration { field, reason } => {
                write!(f, "无效的配置项 {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for TimerError {}
