// ==========================================
// 医院药品库存监控系统 - 医院健康排名 & 影响指标
// ==========================================
// 健康分 = 3 × HEALTHY + 1 × WARNING - 2 × CRITICAL
// 排名基于未过滤的状态集合
// ==========================================

use crate::config::DashboardParams;
use crate::domain::stock::{ReorderRecommendation, StockStatus};
use crate::domain::types::StockLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 医院健康排名项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalHealth {
    pub rank: usize,
    pub hospital_name: String,
    pub health_score: i64,
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

impl HospitalHealth {
    fn score(healthy: usize, warning: usize, critical: usize) -> i64 {
        3 * healthy as i64 + warning as i64 - 2 * critical as i64
    }
}

/// 医院健康排名
///
/// 排序: 健康分降序,同分按医院名称升序;排名从 1 开始
pub fn rank_hospitals(statuses: &[StockStatus]) -> Vec<HospitalHealth> {
    let mut counts: BTreeMap<&str, [usize; 3]> = BTreeMap::new();
    for s in statuses {
        let entry = counts.entry(s.hospital_name.as_str()).or_default();
        match s.stock_status {
            StockLevel::Healthy => entry[0] += 1,
            StockLevel::Warning => entry[1] += 1,
            StockLevel::Critical => entry[2] += 1,
        }
    }

    let mut ranking: Vec<HospitalHealth> = counts
        .into_iter()
        .map(|(name, [healthy, warning, critical])| HospitalHealth {
            rank: 0,
            hospital_name: name.to_string(),
            health_score: HospitalHealth::score(healthy, warning, critical),
            healthy,
            warning,
            critical,
        })
        .collect();

    // BTreeMap 已按名称升序,稳定排序保证同分顺序
    ranking.sort_by(|a, b| b.health_score.cmp(&a.health_score));
    for (idx, item) in ranking.iter_mut().enumerate() {
        item.rank = idx + 1;
    }
    ranking
}

/// 影响指标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    /// 避免的断货次数(CRITICAL 补货建议数)
    pub stockouts_prevented: usize,
    pub cost_savings: f64,
    pub patients_served: i64,
    pub waste_reduced_kg: f64,
}

pub fn compute_impact(
    recommendations: &[ReorderRecommendation],
    statuses: &[StockStatus],
    params: &DashboardParams,
) -> ImpactMetrics {
    let prevented = recommendations
        .iter()
        .filter(|r| r.status.stock_status == StockLevel::Critical)
        .count();
    let healthy = statuses
        .iter()
        .filter(|s| s.stock_status == StockLevel::Healthy)
        .count();

    ImpactMetrics {
        stockouts_prevented: prevented,
        cost_savings: prevented as f64 * params.stockout_cost,
        patients_served: prevented as i64 * params.patients_per_stockout,
        waste_reduced_kg: healthy as f64 * params.waste_kg_per_healthy,
    }
}
