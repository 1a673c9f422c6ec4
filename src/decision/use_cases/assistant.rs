// ==========================================
// 医院药品库存监控系统 - 库存问答助手
// ==========================================
// 关键词路由(大小写不敏感,先命中先返回):
// 1. "critical"            → 危急品项(最多 5 条)
// 2. "insulin"             → 名称含 insulin 的品项
// 3. "hospital"/"location" → 各医院危急品项数
// 4. 其他                   → 总体摘要
// ==========================================

use crate::decision::use_cases::overview::{compute_kpis, KpiSummary};
use crate::domain::stock::StockStatus;
use crate::domain::types::StockLevel;
use crate::i18n::{t, t_count, t_with_args};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 危急品项回答中列出的最大条数
pub const MAX_CRITICAL_ITEMS: usize = 5;

const INSULIN_KEYWORD: &str = "insulin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantItem {
    pub hospital_name: String,
    pub medicine_name: String,
    pub current_stock: i64,
    pub stock_status: StockLevel,
}

impl From<&StockStatus> for AssistantItem {
    fn from(s: &StockStatus) -> Self {
        Self {
            hospital_name: s.hospital_name.clone(),
            medicine_name: s.medicine_name.clone(),
            current_stock: s.current_stock,
            stock_status: s.stock_status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalCritical {
    pub hospital_name: String,
    pub critical: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssistantAnswer {
    CriticalItems {
        total: usize,
        items: Vec<AssistantItem>,
    },
    MedicineMatches {
        keyword: String,
        items: Vec<AssistantItem>,
    },
    CriticalByHospital {
        hospitals: Vec<HospitalCritical>,
    },
    Summary {
        kpi: KpiSummary,
    },
}

/// 回答库存问题
pub fn answer_question(question: &str, statuses: &[StockStatus]) -> AssistantAnswer {
    let q = question.to_lowercase();

    if q.contains("critical") {
        let critical: Vec<&StockStatus> = statuses
            .iter()
            .filter(|s| s.stock_status == StockLevel::Critical)
            .collect();
        AssistantAnswer::CriticalItems {
            total: critical.len(),
            items: critical
                .into_iter()
                .take(MAX_CRITICAL_ITEMS)
                .map(AssistantItem::from)
                .collect(),
        }
    } else if q.contains(INSULIN_KEYWORD) {
        AssistantAnswer::MedicineMatches {
            keyword: INSULIN_KEYWORD.to_string(),
            items: statuses
                .iter()
                .filter(|s| s.medicine_name.to_lowercase().contains(INSULIN_KEYWORD))
                .map(AssistantItem::from)
                .collect(),
        }
    } else if q.contains("hospital") || q.contains("location") {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for s in statuses {
            let entry = counts.entry(s.hospital_name.as_str()).or_insert(0);
            if s.stock_status == StockLevel::Critical {
                *entry += 1;
            }
        }
        AssistantAnswer::CriticalByHospital {
            hospitals: counts
                .into_iter()
                .map(|(name, critical)| HospitalCritical {
                    hospital_name: name.to_string(),
                    critical,
                })
                .collect(),
        }
    } else {
        AssistantAnswer::Summary {
            kpi: compute_kpis(statuses),
        }
    }
}

impl AssistantAnswer {
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        match self {
            AssistantAnswer::CriticalItems { total, items } => {
                if *total == 0 {
                    return t("assistant.no_critical");
                }
                lines.push(t_count("assistant.critical_header", total));
                for item in items {
                    lines.push(t_with_args(
                        "assistant.critical_item",
                        &[
                            ("medicine", item.medicine_name.as_str()),
                            ("hospital", item.hospital_name.as_str()),
                            ("units", item.current_stock.to_string().as_str()),
                        ],
                    ));
                }
            }
            AssistantAnswer::MedicineMatches { keyword, items } => {
                if items.is_empty() {
                    return t_with_args("assistant.no_match", &[("keyword", keyword.as_str())]);
                }
                lines.push(t_with_args(
                    "assistant.medicine_header",
                    &[("keyword", keyword.as_str())],
                ));
                for item in items {
                    lines.push(t_with_args(
                        "assistant.medicine_item",
                        &[
                            ("hospital", item.hospital_name.as_str()),
                            ("medicine", item.medicine_name.as_str()),
                            ("units", item.current_stock.to_string().as_str()),
                            ("status", item.stock_status.to_db_str()),
                        ],
                    ));
                }
            }
            AssistantAnswer::CriticalByHospital { hospitals } => {
                lines.push(t("assistant.hospital_header"));
                for h in hospitals {
                    lines.push(t_with_args(
                        "assistant.hospital_item",
                        &[
                            ("hospital", h.hospital_name.as_str()),
                            ("count", h.critical.to_string().as_str()),
                        ],
                    ));
                }
            }
            AssistantAnswer::Summary { kpi } => {
                lines.push(t("assistant.summary_header"));
                lines.push(t_count("assistant.summary_total", kpi.total_items));
                lines.push(t_count("assistant.summary_critical", kpi.critical));
                lines.push(t_count("assistant.summary_warning", kpi.warning));
                lines.push(t_count("assistant.summary_healthy", kpi.healthy));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::use_cases::test_support::status;

    fn sample() -> Vec<StockStatus> {
        vec![
            status("City General", "Insulin Glargine", 5, 10, 2.0, 5), // CRITICAL
            status("City General", "Saline", 40, 10, 10.0, 5),         // WARNING
            status("Riverside", "insulin", 100, 10, 1.0, 5),           // HEALTHY
            status("Riverside", "Morphine", 3, 10, 1.0, 5),            // CRITICAL
        ]
    }

    #[test]
    fn test_critical_keyword() {
        match answer_question("Which medicines are CRITICAL?", &sample()) {
            AssistantAnswer::CriticalItems { total, items } => {
                assert_eq!(total, 2);
                assert_eq!(items.len(), 2);
            }
            other => panic!("unexpected answer: {:?}", other),
        }
    }

    #[test]
    fn test_critical_items_capped_at_five() {
        let statuses: Vec<StockStatus> = (0..7)
            .map(|i| status("Alpha", &format!("M{}", i), 1, 10, 1.0, 5))
            .collect();
        match answer_question("critical", &statuses) {
            AssistantAnswer::CriticalItems { total, items } => {
                assert_eq!(total, 7);
                assert_eq!(items.len(), MAX_CRITICAL_ITEMS);
            }
            other => panic!("unexpected answer: {:?}", other),
        }
    }

    #[test]
    fn test_first_match_wins() {
        // 同时包含 critical 与 insulin 时按 critical 处理
        let answer = answer_question("critical insulin at each hospital", &sample());
        assert!(matches!(answer, AssistantAnswer::CriticalItems { .. }));
    }

    #[test]
    fn test_insulin_keyword_is_case_insensitive() {
        match answer_question("Show me Insulin stock", &sample()) {
            AssistantAnswer::MedicineMatches { items, .. } => {
                let hospitals: Vec<&str> = items.iter().map(|i| i.hospital_name.as_str()).collect();
                assert_eq!(hospitals, vec!["City General", "Riverside"]);
            }
            other => panic!("unexpected answer: {:?}", other),
        }
    }

    #[test]
    fn test_hospital_keyword() {
        match answer_question("which location needs help", &sample()) {
            AssistantAnswer::CriticalByHospital { hospitals } => {
                assert_eq!(
                    hospitals,
                    vec![
                        HospitalCritical {
                            hospital_name: "City General".to_string(),
                            critical: 1
                        },
                        HospitalCritical {
                            hospital_name: "Riverside".to_string(),
                            critical: 1
                        },
                    ]
                );
            }
            other => panic!("unexpected answer: {:?}", other),
        }
    }

    #[test]
    fn test_general_summary() {
        match answer_question("how are we doing?", &sample()) {
            AssistantAnswer::Summary { kpi } => {
                assert_eq!(kpi.total_items, 4);
                assert_eq!(kpi.critical, 2);
                assert_eq!(kpi.warning, 1);
                assert_eq!(kpi.healthy, 1);
            }
            other => panic!("unexpected answer: {:?}", other),
        }
    }
}
