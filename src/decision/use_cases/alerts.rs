// ==========================================
// 医院药品库存监控系统 - 告警摘要 & 断货预测
// ==========================================
// 输入为已排序的补货建议(最紧急在前)
// 文本输出走 i18n
// ==========================================

use crate::domain::stock::ReorderRecommendation;
use crate::domain::types::StockLevel;
use crate::i18n::{t, t_count, t_with_args};
use serde::{Deserialize, Serialize};

/// 告警摘要中列出的最紧急品项数
pub const MAX_URGENT_ITEMS: usize = 3;

/// 断货预测文本中列出的品项数
pub const MAX_FORECAST_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertItem {
    pub hospital_name: String,
    pub medicine_name: String,
    pub units_left: i64,
    /// 日均消耗(截断为整数)
    pub avg_daily_usage: i64,
}

impl AlertItem {
    fn from_recommendation(rec: &ReorderRecommendation) -> Self {
        Self {
            hospital_name: rec.status.hospital_name.clone(),
            medicine_name: rec.status.medicine_name.clone(),
            units_left: rec.status.current_stock,
            avg_daily_usage: rec.status.avg_daily_usage as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertSummary {
    AllHealthy,
    Attention {
        critical_count: usize,
        warning_count: usize,
        most_urgent: Vec<AlertItem>,
    },
}

pub fn summarize_alerts(recommendations: &[ReorderRecommendation]) -> AlertSummary {
    if recommendations.is_empty() {
        return AlertSummary::AllHealthy;
    }

    let critical: Vec<&ReorderRecommendation> = recommendations
        .iter()
        .filter(|r| r.status.stock_status == StockLevel::Critical)
        .collect();
    let warning_count = recommendations
        .iter()
        .filter(|r| r.status.stock_status == StockLevel::Warning)
        .count();

    AlertSummary::Attention {
        critical_count: critical.len(),
        warning_count,
        most_urgent: critical
            .iter()
            .take(MAX_URGENT_ITEMS)
            .map(|r| AlertItem::from_recommendation(r))
            .collect(),
    }
}

impl AlertSummary {
    pub fn render(&self) -> String {
        match self {
            AlertSummary::AllHealthy => t("alert.all_healthy"),
            AlertSummary::Attention {
                critical_count,
                warning_count,
                most_urgent,
            } => {
                let mut lines = vec![
                    t("alert.title"),
                    t_count("alert.critical_count", critical_count),
                    t_count("alert.warning_count", warning_count),
                ];
                if !most_urgent.is_empty() {
                    lines.push(t("alert.urgent_header"));
                    for item in most_urgent {
                        lines.push(t_with_args(
                            "alert.urgent_item",
                            &[
                                ("hospital", item.hospital_name.as_str()),
                                ("medicine", item.medicine_name.as_str()),
                                ("units", item.units_left.to_string().as_str()),
                                ("usage", item.avg_daily_usage.to_string().as_str()),
                            ],
                        ));
                    }
                }
                lines.join("\n")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub hospital_name: String,
    pub medicine_name: String,
    pub days_until_stockout: f64,
}

/// 断货预测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockoutForecast {
    pub horizon_days: f64,
    /// 是否存在任何补货建议
    pub has_recommendations: bool,
    /// 预测窗口内将断货的品项(保持补货建议顺序)
    pub items: Vec<ForecastItem>,
}

/// 可用天数 <= horizon_days 的补货建议;无消耗(None)不计入
pub fn forecast_stockouts(recommendations: &[ReorderRecommendation], horizon_days: f64) -> StockoutForecast {
    let items = recommendations
        .iter()
        .filter_map(|r| {
            let days = r.status.days_until_stockout?;
            (days <= horizon_days).then(|| ForecastItem {
                hospital_name: r.status.hospital_name.clone(),
                medicine_name: r.status.medicine_name.clone(),
                days_until_stockout: days,
            })
        })
        .collect();

    StockoutForecast {
        horizon_days,
        has_recommendations: !recommendations.is_empty(),
        items,
    }
}

fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{:.0}", days)
    } else {
        days.to_string()
    }
}

impl StockoutForecast {
    pub fn render(&self) -> String {
        let horizon = format_days(self.horizon_days);
        if !self.has_recommendations {
            return t("forecast.no_reorders");
        }
        if self.items.is_empty() {
            return t_with_args("forecast.all_safe", &[("days", horizon.as_str())]);
        }

        let mut lines = vec![t_with_args(
            "forecast.header",
            &[("count", self.items.len().to_string().as_str()), ("days", horizon.as_str())],
        )];
        for item in self.items.iter().take(MAX_FORECAST_ITEMS) {
            lines.push(t_with_args(
                "forecast.item",
                &[
                    ("medicine", item.medicine_name.as_str()),
                    ("days", (item.days_until_stockout as i64).to_string().as_str()),
                ],
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::use_cases::test_support::{recommendations, status};

    #[test]
    fn test_all_healthy() {
        let statuses = vec![status("Alpha", "A", 100, 10, 1.0, 5)];
        assert_eq!(summarize_alerts(&recommendations(&statuses)), AlertSummary::AllHealthy);
    }

    #[test]
    fn test_summary_lists_top_three_critical() {
        let statuses = vec![
            status("Alpha", "A", 1, 10, 2.0, 5),  // CRITICAL 0.5 天
            status("Alpha", "B", 4, 10, 2.0, 5),  // CRITICAL 2.0 天
            status("Beta", "C", 9, 10, 1.5, 5),   // CRITICAL 6.0 天
            status("Beta", "D", 2, 10, 2.0, 5),   // CRITICAL 1.0 天
            status("Gamma", "E", 40, 10, 10.0, 5), // WARNING
        ];

        match summarize_alerts(&recommendations(&statuses)) {
            AlertSummary::Attention {
                critical_count,
                warning_count,
                most_urgent,
            } => {
                assert_eq!(critical_count, 4);
                assert_eq!(warning_count, 1);
                let meds: Vec<&str> = most_urgent.iter().map(|i| i.medicine_name.as_str()).collect();
                assert_eq!(meds, vec!["A", "D", "B"]);
                assert_eq!(most_urgent[0].units_left, 1);
                assert_eq!(most_urgent[0].avg_daily_usage, 2);
            }
            other => panic!("unexpected summary: {:?}", other),
        }
    }

    #[test]
    fn test_avg_usage_truncated() {
        let statuses = vec![status("Beta", "C", 9, 10, 1.9, 5)];
        match summarize_alerts(&recommendations(&statuses)) {
            AlertSummary::Attention { most_urgent, .. } => assert_eq!(most_urgent[0].avg_daily_usage, 1),
            other => panic!("unexpected summary: {:?}", other),
        }
    }

    #[test]
    fn test_forecast_horizon() {
        let statuses = vec![
            status("Alpha", "A", 40, 10, 10.0, 5), // WARNING 4 天
            status("Alpha", "B", 9, 10, 1.0, 5),   // CRITICAL 9 天
            status("Alpha", "C", 8, 10, 0.0, 5),   // CRITICAL 无消耗
            status("Beta", "D", 70, 10, 10.0, 8),  // WARNING 7 天
        ];
        let forecast = forecast_stockouts(&recommendations(&statuses), 7.0);

        assert!(forecast.has_recommendations);
        let meds: Vec<&str> = forecast.items.iter().map(|i| i.medicine_name.as_str()).collect();
        assert_eq!(meds, vec!["A", "D"]);
    }

    #[test]
    fn test_forecast_without_recommendations() {
        let forecast = forecast_stockouts(&[], 7.0);
        assert!(!forecast.has_recommendations);
        assert!(forecast.items.is_empty());
    }
}
