// ==========================================
// 医院药品库存监控系统 - 库存状态分级
// ==========================================
// 规则 (按优先级):
// 1. current_stock <= min_stock_level        → CRITICAL
// 2. avg_daily_usage == 0 (无需求信号)        → HEALTHY
// 3. days_until_stockout <= lead_time_days   → WARNING
// 4. 其他                                     → HEALTHY
// ==========================================
// 注意: 无滞回,阈值附近可能逐日翻转
// ==========================================

use crate::domain::types::StockLevel;

/// 库存状态分级
///
/// # 参数
/// - `current_stock`: 当前库存
/// - `min_stock_level`: 最低库存
/// - `avg_daily_usage`: 滑动日均消耗
/// - `lead_time_days`: 补货交货期
///
/// # 返回
/// (stock_status, days_until_stockout)
/// - days_until_stockout 在日均消耗为 0 时为 None
pub fn classify(
    current_stock: i64,
    min_stock_level: i64,
    avg_daily_usage: f64,
    lead_time_days: i64,
) -> (StockLevel, Option<f64>) {
    let days_until_stockout = if avg_daily_usage > 0.0 {
        Some(current_stock as f64 / avg_daily_usage)
    } else {
        None
    };

    if current_stock <= min_stock_level {
        return (StockLevel::Critical, days_until_stockout);
    }

    let level = match days_until_stockout {
        None => StockLevel::Healthy,
        Some(days) if days <= lead_time_days as f64 => StockLevel::Warning,
        Some(_) => StockLevel::Healthy,
    };

    (level, days_until_stockout)
}
