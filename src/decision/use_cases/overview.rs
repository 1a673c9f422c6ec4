// ==========================================
// 医院药品库存监控系统 - 总览指标
// ==========================================
// KPI 卡片 / 状态分布 / 库存热力图
// ==========================================

use crate::domain::stock::StockStatus;
use crate::domain::types::StockLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// KPI 汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_items: usize,
    pub critical: usize,
    pub warning: usize,
    pub healthy: usize,
}

impl KpiSummary {
    pub fn count(&self, level: StockLevel) -> usize {
        match level {
            StockLevel::Critical => self.critical,
            StockLevel::Warning => self.warning,
            StockLevel::Healthy => self.healthy,
        }
    }
}

pub fn compute_kpis(statuses: &[StockStatus]) -> KpiSummary {
    statuses.iter().fold(KpiSummary::default(), |mut kpi, s| {
        kpi.total_items += 1;
        match s.stock_status {
            StockLevel::Critical => kpi.critical += 1,
            StockLevel::Warning => kpi.warning += 1,
            StockLevel::Healthy => kpi.healthy += 1,
        }
        kpi
    })
}

/// 状态分布中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: StockLevel,
    pub count: usize,
    /// 百分比,保留 1 位小数
    pub percentage: f64,
}

/// 状态分布
///
/// 顺序固定为 CRITICAL → WARNING → HEALTHY,数量为 0 的状态不输出
pub fn status_distribution(statuses: &[StockStatus]) -> Vec<StatusShare> {
    let kpi = compute_kpis(statuses);
    if kpi.total_items == 0 {
        return Vec::new();
    }

    StockLevel::ALL
        .iter()
        .map(|&level| (level, kpi.count(level)))
        .filter(|(_, count)| *count > 0)
        .map(|(status, count)| StatusShare {
            status,
            count,
            percentage: (count as f64 * 1000.0 / kpi.total_items as f64).round() / 10.0,
        })
        .collect()
}

/// 库存热力图(药品 × 医院)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    /// 行: 药品名称(升序)
    pub medicines: Vec<String>,
    /// 列: 医院名称(升序)
    pub hospitals: Vec<String>,
    /// cells[i][j]: medicines[i] 在 hospitals[j] 的当前库存合计;无数据为 None
    pub cells: Vec<Vec<Option<i64>>>,
}

impl Heatmap {
    pub fn get(&self, medicine: &str, hospital: &str) -> Option<i64> {
        let i = self.medicines.iter().position(|m| m == medicine)?;
        let j = self.hospitals.iter().position(|h| h == hospital)?;
        self.cells.get(i)?.get(j).copied().flatten()
    }
}

pub fn build_heatmap(statuses: &[StockStatus]) -> Heatmap {
    let mut sums: BTreeMap<(&str, &str), i64> = BTreeMap::new();
    let mut medicines = BTreeSet::new();
    let mut hospitals = BTreeSet::new();

    for s in statuses {
        medicines.insert(s.medicine_name.as_str());
        hospitals.insert(s.hospital_name.as_str());
        let sum = sums
            .entry((s.medicine_name.as_str(), s.hospital_name.as_str()))
            .or_insert(0);
        *sum = sum.saturating_add(s.current_stock);
    }

    let cells = medicines
        .iter()
        .map(|m| {
            hospitals
                .iter()
                .map(|h| sums.get(&(*m, *h)).copied())
                .collect()
        })
        .collect();

    Heatmap {
        medicines: medicines.into_iter().map(String::from).collect(),
        hospitals: hospitals.into_iter().map(String::from).collect(),
        cells,
    }
}
