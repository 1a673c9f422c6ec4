// ==========================================
// 医院药品库存监控系统 - 分级/补货策略参数
// ==========================================
// 来源: config_kv (ConfigManager::load_policy),缺省取默认值
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// 默认滑动窗口(当天 + 前 6 天)
pub const DEFAULT_USAGE_WINDOW_DAYS: usize = 7;
/// CRITICAL 补货缓冲天数(交货期之外)
pub const DEFAULT_CRITICAL_BUFFER_DAYS: i64 = 30;
/// WARNING 补货缓冲天数(交货期之外)
pub const DEFAULT_WARNING_BUFFER_DAYS: i64 = 15;

/// 库存分级与补货策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPolicy {
    pub usage_window_days: usize,
    pub critical_buffer_days: i64,
    pub warning_buffer_days: i64,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            usage_window_days: DEFAULT_USAGE_WINDOW_DAYS,
            critical_buffer_days: DEFAULT_CRITICAL_BUFFER_DAYS,
            warning_buffer_days: DEFAULT_WARNING_BUFFER_DAYS,
        }
    }
}

impl StockPolicy {
    /// 校验策略参数
    ///
    /// - 窗口至少 1 天
    /// - 缓冲天数不能为负
    pub fn validate(&self) -> EngineResult<()> {
        if self.usage_window_days == 0 {
            return Err(EngineError::InvalidPolicy(
                "usage_window_days 必须 >= 1".to_string(),
            ));
        }
        if self.critical_buffer_days < 0 || self.warning_buffer_days < 0 {
            return Err(EngineError::InvalidPolicy(format!(
                "缓冲天数不能为负: critical={}, warning={}",
                self.critical_buffer_days, self.warning_buffer_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = StockPolicy::default();
        assert_eq!(policy.usage_window_days, 7);
        assert_eq!(policy.critical_buffer_days, 30);
        assert_eq!(policy.warning_buffer_days, 15);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let policy = StockPolicy {
            usage_window_days: 0,
            ..StockPolicy::default()
        };
        assert!(matches!(policy.validate(), Err(EngineError::InvalidPolicy(_))));
    }

    #[test]
    fn test_negative_buffer_rejected() {
        let policy = StockPolicy {
            warning_buffer_days: -1,
            ..StockPolicy::default()
        };
        assert!(policy.validate().is_err());
    }
}
