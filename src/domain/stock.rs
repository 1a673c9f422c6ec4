// ==========================================
// 医院药品库存监控系统 - 库存领域模型
// ==========================================
// StockRecord: 外部追加写入的每日台账(输入)
// StockStatus / ReorderRecommendation: 引擎按需重算的纯投影(输出)
// 红线: 投影没有独立身份,不落库,不可修改
// ==========================================

use crate::domain::types::{ReorderPriority, StockLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// SeriesKey - 序列主键 (hospital_id, medicine_name)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub hospital_id: String,
    pub medicine_name: String,
}

impl SeriesKey {
    pub fn new(hospital_id: impl Into<String>, medicine_name: impl Into<String>) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            medicine_name: medicine_name.into(),
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hospital_id, self.medicine_name)
    }
}

// ==========================================
// StockRecord - 每日库存台账
// ==========================================
// 对齐: stock_record 表
// 约束: 同一 (hospital_id, medicine_name) 内按日期全序,日期不重复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub date: NaiveDate,          // 台账日期
    pub hospital_id: String,      // 医院编码
    pub hospital_name: String,    // 医院名称
    pub medicine_name: String,    // 药品名称
    pub opening_stock: i64,       // 期初库存
    pub received: i64,            // 当日入库
    pub issued: i64,              // 当日出库(消耗)
    pub closing_stock: i64,       // 期末库存
    pub lead_time_days: i64,      // 补货交货期(天)
    pub min_stock_level: i64,     // 最低库存
}

impl StockRecord {
    /// 序列主键
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.hospital_id.clone(), self.medicine_name.clone())
    }

    /// 返回取值为负数的数值字段名
    ///
    /// 导入校验与引擎入口共用同一口径
    pub fn negative_fields(&self) -> Vec<&'static str> {
        [
            ("opening_stock", self.opening_stock),
            ("received", self.received),
            ("issued", self.issued),
            ("closing_stock", self.closing_stock),
            ("lead_time_days", self.lead_time_days),
            ("min_stock_level", self.min_stock_level),
        ]
        .iter()
        .filter(|(_, v)| *v < 0)
        .map(|(name, _)| *name)
        .collect()
    }

    /// 台账是否平衡: closing = opening + received - issued
    pub fn is_balanced(&self) -> bool {
        self.opening_stock
            .checked_add(self.received)
            .and_then(|v| v.checked_sub(self.issued))
            == Some(self.closing_stock)
    }
}

// ==========================================
// StockStatus - 当前库存状态
// ==========================================
// 由序列中最新一条台账推导
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatus {
    pub hospital_id: String,
    pub hospital_name: String,
    pub medicine_name: String,
    pub date: NaiveDate,                   // 最新台账日期
    pub current_stock: i64,                // 最新期末库存
    pub min_stock_level: i64,
    pub lead_time_days: i64,
    pub avg_daily_usage: f64,              // 滑动窗口日均消耗
    pub stock_status: StockLevel,
    pub days_until_stockout: Option<f64>,  // 无消耗时为 None(不是无穷大)
}

impl StockStatus {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.hospital_id.clone(), self.medicine_name.clone())
    }

    /// 展示用可用天数(保留 1 位小数)
    ///
    /// 内部计算始终使用未取整的 `days_until_stockout`
    pub fn days_until_stockout_display(&self) -> Option<f64> {
        self.days_until_stockout.map(round_one_decimal)
    }
}

// ==========================================
// ReorderRecommendation - 补货建议
// ==========================================
// 仅对 CRITICAL / WARNING 生成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderRecommendation {
    #[serde(flatten)]
    pub status: StockStatus,
    pub recommended_order_quantity: i64, // >= 0
    pub priority: ReorderPriority,
}

/// 四舍五入到 1 位小数(远离零取整)
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
