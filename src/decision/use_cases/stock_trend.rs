// ==========================================
// 医院药品库存监控系统 - 库存趋势
// ==========================================
// 单个药品在各医院的期末库存时间序列
// ==========================================

use crate::domain::stock::StockRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub closing_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub hospital_name: String,
    pub points: Vec<TrendPoint>,
}

/// 按医院分组的趋势序列(医院名称升序,点按日期升序)
pub fn stock_trend(records: &[StockRecord], medicine_name: &str) -> Vec<TrendSeries> {
    let mut by_hospital: BTreeMap<&str, Vec<TrendPoint>> = BTreeMap::new();
    for r in records.iter().filter(|r| r.medicine_name == medicine_name) {
        by_hospital
            .entry(r.hospital_name.as_str())
            .or_default()
            .push(TrendPoint {
                date: r.date,
                closing_stock: r.closing_stock,
            });
    }

    by_hospital
        .into_iter()
        .map(|(hospital_name, mut points)| {
            points.sort_by_key(|p| p.date);
            TrendSeries {
                hospital_name: hospital_name.to_string(),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hospital: &str, medicine: &str, day: u32, closing: i64) -> StockRecord {
        StockRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            hospital_id: format!("ID-{}", hospital),
            hospital_name: hospital.to_string(),
            medicine_name: medicine.to_string(),
            opening_stock: closing,
            received: 0,
            issued: 0,
            closing_stock: closing,
            lead_time_days: 3,
            min_stock_level: 10,
        }
    }

    #[test]
    fn test_trend_groups_and_sorts() {
        let records = vec![
            record("Riverside", "Insulin", 2, 30),
            record("City General", "Insulin", 2, 45),
            record("City General", "Insulin", 1, 50),
            record("City General", "Saline", 1, 99),
        ];

        let trend = stock_trend(&records, "Insulin");
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].hospital_name, "City General");
        assert_eq!(
            trend[0].points.iter().map(|p| p.closing_stock).collect::<Vec<_>>(),
            vec![50, 45]
        );
        assert_eq!(trend[1].points.len(), 1);

        assert!(stock_trend(&records, "Morphine").is_empty());
    }
}
