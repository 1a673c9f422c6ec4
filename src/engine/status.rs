// ==========================================
// 医院药品库存监控系统 - 当前库存状态引擎
// ==========================================
// 输入: 全量 StockRecord
// 输出: 每个 (hospital_id, medicine_name) 一条 StockStatus
// 流程: 校验 → 分组排序 → 重复日期检查 → 取最新 → 滑动均值 → 分级
// ==========================================

use crate::domain::stock::{SeriesKey, StockRecord, StockStatus};
use crate::engine::classifier::classify;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::policy::StockPolicy;
use crate::engine::usage::trailing_usage;
use std::collections::BTreeMap;
use tracing::debug;

// ==========================================
// StockStatusEngine - 当前库存状态引擎
// ==========================================
pub struct StockStatusEngine {
    policy: StockPolicy,
}

impl StockStatusEngine {
    pub fn new(policy: StockPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StockPolicy {
        &self.policy
    }

    /// 推导每个序列的当前状态
    ///
    /// # 返回
    /// - 按 (hospital_id, medicine_name) 排序的 StockStatus,重复调用结果一致
    /// - 空输入返回空列表
    ///
    /// # 错误
    /// - InvalidRecord: 数值字段为负
    /// - DuplicateDate: 同一序列日期重复
    pub fn latest_status_per_series(&self, records: &[StockRecord]) -> EngineResult<Vec<StockStatus>> {
        let groups = group_series(records)?;

        let statuses: Vec<StockStatus> = groups
            .values()
            .filter_map(|series| self.status_for_series(series))
            .collect();

        debug!(
            records = records.len(),
            series = statuses.len(),
            "库存状态推导完成"
        );
        Ok(statuses)
    }

    /// 推导单个序列的当前状态
    ///
    /// `series` 必须已按日期升序且无重复日期;空序列返回 None
    pub fn status_for_series(&self, series: &[StockRecord]) -> Option<StockStatus> {
        let latest = series.last()?;
        let avg_daily_usage = trailing_usage(series, self.policy.usage_window_days)?;

        let (stock_status, days_until_stockout) = classify(
            latest.closing_stock,
            latest.min_stock_level,
            avg_daily_usage,
            latest.lead_time_days,
        );

        Some(StockStatus {
            hospital_id: latest.hospital_id.clone(),
            hospital_name: latest.hospital_name.clone(),
            medicine_name: latest.medicine_name.clone(),
            date: latest.date,
            current_stock: latest.closing_stock,
            min_stock_level: latest.min_stock_level,
            lead_time_days: latest.lead_time_days,
            avg_daily_usage,
            stock_status,
            days_until_stockout,
        })
    }
}

impl Default for StockStatusEngine {
    fn default() -> Self {
        Self::new(StockPolicy::default())
    }
}

/// 按序列主键分组,组内按日期升序
///
/// # 错误
/// - InvalidRecord: 任一记录数值字段为负
/// - DuplicateDate: 组内日期重复(不猜测哪条是最新)
pub fn group_series(records: &[StockRecord]) -> EngineResult<BTreeMap<SeriesKey, Vec<StockRecord>>> {
    let mut groups: BTreeMap<SeriesKey, Vec<StockRecord>> = BTreeMap::new();

    for record in records {
        let negative = record.negative_fields();
        if !negative.is_empty() {
            return Err(EngineError::InvalidRecord {
                key: record.key(),
                date: record.date,
                fields: negative.join(","),
            });
        }
        groups.entry(record.key()).or_default().push(record.clone());
    }

    for (key, series) in groups.iter_mut() {
        series.sort_by_key(|r| r.date);
        if let Some(pair) = series.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(EngineError::DuplicateDate {
                key: key.clone(),
                date: pair[1].date,
            });
        }
    }

    Ok(groups)
}
