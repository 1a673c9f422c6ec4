// ==========================================
// 医院药品库存监控系统 - 日均消耗计算
// ==========================================
// 规则: 简单滑动平均,窗口含当天
// avg[i] = mean(issued[max(0, i-w+1) ..= i])
// 序列开头不足 w 条时窗口自然收缩,不补零
// ==========================================

use crate::domain::stock::StockRecord;

/// 计算序列每一天的滑动日均消耗
///
/// # 参数
/// - `series`: 单个 (hospital_id, medicine_name) 的台账,已按日期升序
/// - `window_size`: 窗口天数(含当天);0 按 1 处理
///
/// # 返回
/// 与 `series` 等长的日均消耗
pub fn compute_usage(series: &[StockRecord], window_size: usize) -> Vec<f64> {
    let window = window_size.max(1);
    let mut usage = Vec::with_capacity(series.len());

    // i128 整数累加: 无浮点误差累积,极端出库量也不会溢出
    let mut window_sum: i128 = 0;
    for (i, record) in series.iter().enumerate() {
        window_sum += i128::from(record.issued);
        if i >= window {
            window_sum -= i128::from(series[i - window].issued);
        }
        let count = (i + 1).min(window);
        usage.push(window_sum as f64 / count as f64);
    }

    usage
}

/// 计算序列最后一天的滑动日均消耗
///
/// 空序列返回 None
pub fn trailing_usage(series: &[StockRecord], window_size: usize) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let window = window_size.max(1);
    let start = series.len().saturating_sub(window);
    let tail = &series[start..];
    let sum: i128 = tail.iter().map(|r| i128::from(r.issued)).sum();
    Some(sum as f64 / tail.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series_with_issued(issued: &[i64]) -> Vec<StockRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        issued
            .iter()
            .enumerate()
            .map(|(i, &q)| StockRecord {
                date: start + Duration::days(i as i64),
                hospital_id: "H001".to_string(),
                hospital_name: "City General".to_string(),
                medicine_name: "Insulin".to_string(),
                opening_stock: 100,
                received: 0,
                issued: q,
                closing_stock: 100 - q,
                lead_time_days: 5,
                min_stock_level: 10,
            })
            .collect()
    }

    #[test]
    fn test_window_excludes_older_days() {
        // 8 天,第 1 天消耗 100,其余 2;窗口 7 在最后一天只覆盖第 2-8 天
        let series = series_with_issued(&[100, 2, 2, 2, 2, 2, 2, 2]);
        let usage = compute_usage(&series, 7);
        assert_eq!(usage.len(), 8);
        assert_eq!(usage[7], 2.0);
        assert_eq!(trailing_usage(&series, 7), Some(2.0));
    }

    #[test]
    fn test_constant_series_average() {
        let series = series_with_issued(&[2, 2, 2, 2, 2, 2, 2, 2]);
        let usage = compute_usage(&series, 7);
        assert!(usage.iter().all(|&u| u == 2.0));
    }

    #[test]
    fn test_ramp_up_shrinks_window() {
        let series = series_with_issued(&[4, 8, 12]);
        let usage = compute_usage(&series, 7);
        assert_eq!(usage, vec![4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_single_record_uses_own_issued() {
        let series = series_with_issued(&[9]);
        assert_eq!(compute_usage(&series, 7), vec![9.0]);
        assert_eq!(trailing_usage(&series, 7), Some(9.0));
    }

    #[test]
    fn test_zero_window_treated_as_one() {
        let series = series_with_issued(&[3, 5]);
        assert_eq!(compute_usage(&series, 0), vec![3.0, 5.0]);
    }

    #[test]
    fn test_huge_issued_does_not_overflow() {
        let series = series_with_issued(&[i64::MAX, i64::MAX, 0]);
        let usage = compute_usage(&series, 7);
        assert_eq!(usage[1], i64::MAX as f64);
        let last = trailing_usage(&series, 7).unwrap();
        assert!((last - usage[2]).abs() <= usage[2] * 1e-12);
    }

    #[test]
    fn test_empty_series() {
        assert!(compute_usage(&[], 7).is_empty());
        assert_eq!(trailing_usage(&[], 7), None);
    }

    #[test]
    fn test_trailing_matches_full_computation() {
        let series = series_with_issued(&[1, 7, 3, 0, 9, 4, 6, 2, 8, 5]);
        for window in 1..=12 {
            let full = compute_usage(&series, window);
            let last = trailing_usage(&series, window).unwrap();
            assert!((full[full.len() - 1] - last).abs() < 1e-12);
        }
    }
}
