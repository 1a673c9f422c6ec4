// ==========================================
// 医院药品库存监控系统 - 看板用例模块
// ==========================================
// 职责: 基于 StockStatus / ReorderRecommendation 计算看板视图
// 红线: 用例只做纯计算,数据由 API 层加载后传入
// ==========================================

pub mod alerts;
pub mod assistant;
pub mod hospital_ranking;
pub mod overview;
pub mod stock_trend;

// 重导出用例输出
pub use alerts::{
    forecast_stockouts, summarize_alerts, AlertItem, AlertSummary, ForecastItem, StockoutForecast,
};
pub use assistant::{answer_question, AssistantAnswer, AssistantItem, HospitalCritical};
pub use hospital_ranking::{compute_impact, rank_hospitals, HospitalHealth, ImpactMetrics};
pub use overview::{build_heatmap, compute_kpis, status_distribution, Heatmap, KpiSummary, StatusShare};
pub use stock_trend::{stock_trend, TrendPoint, TrendSeries};

// ==========================================
// 通用类型定义
// ==========================================

use crate::domain::stock::{StockRecord, StockStatus};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 日期范围
///
/// 相对区间以数据中的最新日期为锚点
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRange {
    #[default]
    AllTime,
    LastDays {
        days: u32,
    },
    Custom {
        from: NaiveDate,
        to: NaiveDate,
    },
}

impl DateRange {
    /// 解析为闭区间 (from, to),None 表示不限
    ///
    /// LastDays 含锚点当天共 days 天;无数据时不限
    pub fn resolve(&self, latest: Option<NaiveDate>) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match *self {
            DateRange::AllTime => (None, None),
            DateRange::LastDays { days } => match latest {
                Some(latest) => {
                    let span = i64::from(days.max(1)) - 1;
                    (Some(latest - Duration::days(span)), Some(latest))
                }
                None => (None, None),
            },
            DateRange::Custom { from, to } => (Some(from), Some(to)),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::AllTime => write!(f, "all"),
            DateRange::LastDays { days } => write!(f, "{}d", days),
            DateRange::Custom { from, to } => write!(f, "{}..{}", from, to),
        }
    }
}

impl FromStr for DateRange {
    type Err = String;

    /// 支持: "all" / "7d" / "30d" / "2024-01-01..2024-01-31"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" || s.is_empty() {
            return Ok(DateRange::AllTime);
        }

        if let Some((from, to)) = s.split_once("..") {
            let parse = |v: &str| {
                NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                    .map_err(|_| format!("日期格式错误: {}", v))
            };
            let (from, to) = (parse(from)?, parse(to)?);
            if from > to {
                return Err(format!("起始日期晚于结束日期: {}..{}", from, to));
            }
            return Ok(DateRange::Custom { from, to });
        }

        match s.strip_suffix('d').map(str::parse::<u32>) {
            Some(Ok(days)) if days > 0 => Ok(DateRange::LastDays { days }),
            _ => Err(format!("无法识别的日期范围: {}", s)),
        }
    }
}

/// 看板过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardFilter {
    /// 药品名称(精确匹配)
    pub medicine: Option<String>,
    /// 医院名称(精确匹配)
    pub hospital: Option<String>,
    /// 日期范围(结束日为评估基准日,起始日只筛掉最新台账早于它的序列)
    pub date_range: DateRange,
}

impl DashboardFilter {
    pub fn matches(&self, status: &StockStatus) -> bool {
        self.medicine
            .as_ref()
            .map_or(true, |m| &status.medicine_name == m)
            && self
                .hospital
                .as_ref()
                .map_or(true, |h| &status.hospital_name == h)
    }

    /// 按药品/医院过滤状态集合(保持原顺序)
    pub fn apply<T, F>(&self, items: &[T], status_of: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> &StockStatus,
    {
        items
            .iter()
            .filter(|item| self.matches(status_of(item)))
            .cloned()
            .collect()
    }
}

/// 过滤下拉选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub medicines: Vec<String>,
    pub hospitals: Vec<String>,
}

impl FilterOptions {
    /// 从台账提取去重排序后的药品/医院名称
    pub fn from_records(records: &[StockRecord]) -> Self {
        let medicines: BTreeSet<&str> = records.iter().map(|r| r.medicine_name.as_str()).collect();
        let hospitals: BTreeSet<&str> = records.iter().map(|r| r.hospital_name.as_str()).collect();
        Self {
            medicines: medicines.into_iter().map(String::from).collect(),
            hospitals: hospitals.into_iter().map(String::from).collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::status;
    use super::*;

    #[test]
    fn test_date_range_parse() {
        assert_eq!("all".parse::<DateRange>().unwrap(), DateRange::AllTime);
        assert_eq!("7d".parse::<DateRange>().unwrap(), DateRange::LastDays { days: 7 });
        assert_eq!(
            "2024-01-01..2024-01-31".parse::<DateRange>().unwrap(),
            DateRange::Custom {
                from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            }
        );
        assert!("0d".parse::<DateRange>().is_err());
        assert!("2024-02-01..2024-01-01".parse::<DateRange>().is_err());
        assert!("yesterday".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_date_range_resolve_anchors_on_latest() {
        let latest = NaiveDate::from_ymd_opt(2024, 1, 31);
        let (from, to) = DateRange::LastDays { days: 7 }.resolve(latest);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 25));
        assert_eq!(to, latest);

        assert_eq!(DateRange::LastDays { days: 7 }.resolve(None), (None, None));
        assert_eq!(DateRange::AllTime.resolve(latest), (None, None));
    }

    #[test]
    fn test_filter_by_medicine_and_hospital() {
        let statuses = vec![
            status("City General", "Insulin", 40, 10, 10.0, 5),
            status("City General", "Saline", 40, 10, 10.0, 5),
            status("Riverside", "Insulin", 40, 10, 10.0, 5),
        ];

        let filter = DashboardFilter {
            medicine: Some("Insulin".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&statuses, |s| s).len(), 2);

        let filter = DashboardFilter {
            medicine: Some("Insulin".to_string()),
            hospital: Some("Riverside".to_string()),
            ..Default::default()
        };
        let filtered = filter.apply(&statuses, |s| s);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].hospital_name, "Riverside");
    }
}
