// ==========================================
// 医院药品库存监控系统 - 领域类型定义
// ==========================================
// 库存状态分级 + 补货优先级
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 库存状态 (Stock Level)
// ==========================================
// 红线: 三级平铺分级,不是状态机,不保留上一次状态
// 顺序: Healthy < Warning < Critical (按严重程度)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Healthy,  // 充足
    Warning,  // 预警(交货期内可能断货)
    Critical, // 危急(已低于最低库存)
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl StockLevel {
    /// 全部状态,按展示顺序(最严重在前)
    pub const ALL: [StockLevel; 3] = [StockLevel::Critical, StockLevel::Warning, StockLevel::Healthy];

    /// 从字符串解析状态
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Some(StockLevel::Critical),
            "WARNING" => Some(StockLevel::Warning),
            "HEALTHY" => Some(StockLevel::Healthy),
            _ => None,
        }
    }

    /// 转换为存储/导出用字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StockLevel::Critical => "CRITICAL",
            StockLevel::Warning => "WARNING",
            StockLevel::Healthy => "HEALTHY",
        }
    }

    /// 对应的补货优先级(HEALTHY 无需补货)
    pub fn reorder_priority(&self) -> Option<ReorderPriority> {
        match self {
            StockLevel::Critical => Some(ReorderPriority::Urgent),
            StockLevel::Warning => Some(ReorderPriority::Soon),
            StockLevel::Healthy => None,
        }
    }
}

// ==========================================
// 补货优先级 (Reorder Priority)
// ==========================================
// 1 = CRITICAL, 2 = WARNING
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ReorderPriority {
    Urgent = 1, // 立即补货
    Soon = 2,   // 尽快补货
}

impl ReorderPriority {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl From<ReorderPriority> for u8 {
    fn from(p: ReorderPriority) -> Self {
        p.as_u8()
    }
}

impl TryFrom<u8> for ReorderPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ReorderPriority::Urgent),
            2 => Ok(ReorderPriority::Soon),
            other => Err(format!("无效的补货优先级: {}", other)),
        }
    }
}

impl fmt::Display for ReorderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}
