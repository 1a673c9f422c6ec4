use serde::{Deserialize, Serialize};

/// 看板派生指标参数
///
/// 存储位置: config_kv(scope_id='global'),缺省取默认值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardParams {
    /// 断货预测窗口(天)
    pub forecast_horizon_days: f64,

    /// 每次断货的损失金额
    pub stockout_cost: f64,

    /// 每次避免断货所服务的患者数
    pub patients_per_stockout: i64,

    /// 每个健康品项减少的浪费(kg)
    pub waste_kg_per_healthy: f64,

    /// watch 模式重算间隔(秒)
    pub refresh_interval_secs: u64,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            forecast_horizon_days: 7.0,
            stockout_cost: 50_000.0,
            patients_per_stockout: 25,
            waste_kg_per_healthy: 2.0,
            refresh_interval_secs: 60,
        }
    }
}
