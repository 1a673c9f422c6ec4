// ==========================================
// 医院药品库存监控系统 - 补货建议引擎
// ==========================================
// 规则:
// - HEALTHY  → 不生成
// - CRITICAL → max(0, round(usage * (lead + 30) - stock)), priority = 1
// - WARNING  → max(0, round(usage * (lead + 15) - stock)), priority = 2
// 缓冲天数取自 StockPolicy
// ==========================================

use crate::domain::stock::{ReorderRecommendation, StockStatus};
use crate::domain::types::StockLevel;
use crate::engine::policy::StockPolicy;
use std::cmp::Ordering;

// ==========================================
// ReorderEngine - 补货建议引擎
// ==========================================
pub struct ReorderEngine {
    critical_buffer_days: i64,
    warning_buffer_days: i64,
}

impl ReorderEngine {
    pub fn new(policy: &StockPolicy) -> Self {
        Self {
            critical_buffer_days: policy.critical_buffer_days,
            warning_buffer_days: policy.warning_buffer_days,
        }
    }

    /// 单条状态的补货建议
    ///
    /// HEALTHY 返回 None
    pub fn recommend_reorder(&self, status: &StockStatus) -> Option<ReorderRecommendation> {
        let priority = status.stock_status.reorder_priority()?;
        let buffer_days = match status.stock_status {
            StockLevel::Critical => self.critical_buffer_days,
            _ => self.warning_buffer_days,
        };

        Some(ReorderRecommendation {
            status: status.clone(),
            recommended_order_quantity: order_quantity(
                status.avg_daily_usage,
                status.lead_time_days.saturating_add(buffer_days),
                status.current_stock,
            ),
            priority,
        })
    }

    /// 批量生成补货建议并排序
    ///
    /// 排序: priority 升序 → 可用天数升序(无消耗排最后) → hospital_id → medicine_name
    pub fn recommend_all(&self, statuses: &[StockStatus]) -> Vec<ReorderRecommendation> {
        let mut recommendations: Vec<ReorderRecommendation> = statuses
            .iter()
            .filter_map(|s| self.recommend_reorder(s))
            .collect();
        recommendations.sort_by(compare_recommendations);
        recommendations
    }
}

impl Default for ReorderEngine {
    fn default() -> Self {
        Self::new(&StockPolicy::default())
    }
}

/// 补货量: 目标覆盖天数 × 日均消耗 - 当前库存,四舍五入后下限为 0
fn order_quantity(avg_daily_usage: f64, cover_days: i64, current_stock: i64) -> i64 {
    let shortfall = avg_daily_usage * cover_days as f64 - current_stock as f64;
    (shortfall.round() as i64).max(0)
}

fn compare_recommendations(a: &ReorderRecommendation, b: &ReorderRecommendation) -> Ordering {
    let days = |r: &ReorderRecommendation| r.status.days_until_stockout.unwrap_or(f64::INFINITY);

    a.priority
        .cmp(&b.priority)
        .then_with(|| days(a).total_cmp(&days(b)))
        .then_with(|| a.status.hospital_id.cmp(&b.status.hospital_id))
        .then_with(|| a.status.medicine_name.cmp(&b.status.medicine_name))
}
