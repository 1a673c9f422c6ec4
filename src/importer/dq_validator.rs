// ==========================================
// 医院药品库存监控系统 - 数据质量校验器实现
// ==========================================
// 规则:
// - ERROR: 必填字段缺失 / 数值为负 / 台账计算溢出(阻断该行)
// - WARNING: 期末 != 期初 + 入库 - 出库(允许导入)
// - CONFLICT: (hospital_id, medicine_name, date) 重复(阻断该行)
// ==========================================

use crate::domain::import::{DqLevel, DqReport, DqSummary, DqViolation, RawStockRecord};
use crate::domain::stock::SeriesKey;
use crate::importer::stock_importer_trait::DqValidator as DqValidatorTrait;
use chrono::NaiveDate;
use std::collections::HashSet;

pub struct DqValidator;

fn violation(record: &RawStockRecord, level: DqLevel, field: &str, message: String) -> DqViolation {
    DqViolation {
        row_number: record.row_number,
        key: record.key(),
        level,
        field: field.to_string(),
        message,
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_required_fields(&self, record: &RawStockRecord) -> Vec<DqViolation> {
        let required = [
            ("date", record.date.is_some()),
            ("hospital_id", record.hospital_id.is_some()),
            ("medicine_name", record.medicine_name.is_some()),
            ("opening_stock", record.opening_stock.is_some()),
            ("received", record.received.is_some()),
            ("issued", record.issued.is_some()),
            ("closing_stock", record.closing_stock.is_some()),
            ("lead_time_days", record.lead_time_days.is_some()),
            ("min_stock_level", record.min_stock_level.is_some()),
        ];

        required
            .iter()
            .filter(|(_, present)| !present)
            .map(|(field, _)| violation(record, DqLevel::Error, field, format!("必填字段缺失: {}", field)))
            .collect()
    }

    fn validate_values(&self, record: &RawStockRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        let numeric = [
            ("opening_stock", record.opening_stock),
            ("received", record.received),
            ("issued", record.issued),
            ("closing_stock", record.closing_stock),
            ("lead_time_days", record.lead_time_days),
            ("min_stock_level", record.min_stock_level),
        ];
        for (field, value) in numeric {
            if let Some(v) = value {
                if v < 0 {
                    violations.push(violation(
                        record,
                        DqLevel::Error,
                        field,
                        format!("数值为负: {}", v),
                    ));
                }
            }
        }

        // 台账平衡校验(仅在四项齐全时)
        if let (Some(opening), Some(received), Some(issued), Some(closing)) = (
            record.opening_stock,
            record.received,
            record.issued,
            record.closing_stock,
        ) {
            match opening
                .checked_add(received)
                .and_then(|v| v.checked_sub(issued))
            {
                Some(expected) if closing != expected => violations.push(violation(
                    record,
                    DqLevel::Warning,
                    "closing_stock",
                    format!(
                        "台账不平衡: 期末 {} != 期初 {} + 入库 {} - 出库 {} = {}",
                        closing, opening, received, issued, expected
                    ),
                )),
                Some(_) => {}
                None => violations.push(violation(
                    record,
                    DqLevel::Error,
                    "closing_stock",
                    format!(
                        "数值溢出: 期初 {} + 入库 {} - 出库 {}",
                        opening, received, issued
                    ),
                )),
            }
        }

        violations
    }

    fn detect_duplicates(&self, records: &[RawStockRecord]) -> Vec<DqViolation> {
        let mut seen = HashSet::new();
        let mut violations = Vec::new();

        for record in records {
            let (Some(key), Some(date)) = (record.key(), record.date) else {
                continue;
            };
            if !seen.insert((key, date)) {
                violations.push(violation(
                    record,
                    DqLevel::Conflict,
                    "date",
                    format!("同批次内日期重复: {}", date),
                ));
            }
        }

        violations
    }

    fn detect_cross_batch_duplicates(
        &self,
        records: &[RawStockRecord],
        existing: &HashSet<(SeriesKey, NaiveDate)>,
    ) -> Vec<DqViolation> {
        records
            .iter()
            .filter_map(|record| {
                let key = record.key()?;
                let date = record.date?;
                existing.contains(&(key, date)).then(|| {
                    violation(
                        record,
                        DqLevel::Conflict,
                        "date",
                        format!("台账已存在: {}", date),
                    )
                })
            })
            .collect()
    }

    fn generate_dq_report(&self, batch_id: String, violations: Vec<DqViolation>) -> DqReport {
        let rows_at = |level: DqLevel| {
            violations
                .iter()
                .filter(|v| v.level == level)
                .map(|v| v.row_number)
                .collect::<HashSet<_>>()
        };

        let error_rows = rows_at(DqLevel::Error);
        // 同一行既有 ERROR 又有 CONFLICT 时只计入 blocked
        let conflict_rows: HashSet<usize> = rows_at(DqLevel::Conflict)
            .difference(&error_rows)
            .copied()
            .collect();
        let warning_rows: HashSet<usize> = rows_at(DqLevel::Warning)
            .into_iter()
            .filter(|r| !error_rows.contains(r) && !conflict_rows.contains(r))
            .collect();

        DqReport {
            batch_id,
            summary: DqSummary {
                total_rows: 0, // 外部填充
                success: 0,    // 外部填充
                blocked: error_rows.len(),
                warning: warning_rows.len(),
                conflict: conflict_rows.len(),
            },
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(hospital_id: &str, date: &str, row_number: usize) -> RawStockRecord {
        RawStockRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            hospital_id: Some(hospital_id.to_string()),
            hospital_name: Some("City General".to_string()),
            medicine_name: Some("Insulin".to_string()),
            opening_stock: Some(50),
            received: Some(0),
            issued: Some(10),
            closing_stock: Some(40),
            lead_time_days: Some(5),
            min_stock_level: Some(10),
            row_number,
        }
    }

    #[test]
    fn test_valid_record_has_no_violations() {
        let record = create_test_record("H001", "2024-01-01", 1);
        assert!(DqValidator.validate_required_fields(&record).is_empty());
        assert!(DqValidator.validate_values(&record).is_empty());
    }

    #[test]
    fn test_missing_fields_are_errors() {
        let mut record = create_test_record("H001", "2024-01-01", 1);
        record.medicine_name = None;
        record.issued = None;

        let violations = DqValidator.validate_required_fields(&record);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.level == DqLevel::Error));
        assert!(violations.iter().any(|v| v.field == "medicine_name"));
    }

    #[test]
    fn test_negative_value_is_error() {
        let mut record = create_test_record("H001", "2024-01-01", 1);
        record.min_stock_level = Some(-1);

        let violations = DqValidator.validate_values(&record);
        assert!(violations
            .iter()
            .any(|v| v.field == "min_stock_level" && v.level == DqLevel::Error));
    }

    #[test]
    fn test_unbalanced_ledger_is_warning() {
        let mut record = create_test_record("H001", "2024-01-01", 1);
        record.closing_stock = Some(39);

        let violations = DqValidator.validate_values(&record);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Warning);
    }

    #[test]
    fn test_ledger_overflow_is_error() {
        let mut record = create_test_record("H001", "2024-01-01", 1);
        record.opening_stock = Some(i64::MAX);
        record.received = Some(1);
        record.closing_stock = Some(i64::MAX);

        let violations = DqValidator.validate_values(&record);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].level, DqLevel::Error);
        assert_eq!(violations[0].field, "closing_stock");
    }

    #[test]
    fn test_duplicate_dates_within_batch() {
        let records = vec![
            create_test_record("H001", "2024-01-01", 1),
            create_test_record("H002", "2024-01-01", 2),
            create_test_record("H001", "2024-01-01", 3),
        ];

        let violations = DqValidator.detect_duplicates(&records);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].row_number, 3);
        assert_eq!(violations[0].level, DqLevel::Conflict);
    }

    #[test]
    fn test_cross_batch_duplicates() {
        let records = vec![
            create_test_record("H001", "2024-01-01", 1),
            create_test_record("H001", "2024-01-02", 2),
        ];
        let mut existing = HashSet::new();
        existing.insert((
            SeriesKey::new("H001", "Insulin"),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        ));

        let violations = DqValidator.detect_cross_batch_duplicates(&records, &existing);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].row_number, 2);
    }

    #[test]
    fn test_report_counts_distinct_rows() {
        let mut bad = create_test_record("H001", "2024-01-01", 1);
        bad.received = None;
        bad.issued = Some(-3);
        let mut unbalanced = create_test_record("H001", "2024-01-02", 2);
        unbalanced.closing_stock = Some(1);

        let mut violations = DqValidator.validate_required_fields(&bad);
        violations.extend(DqValidator.validate_values(&bad));
        violations.extend(DqValidator.validate_values(&unbalanced));

        let report = DqValidator.generate_dq_report("b1".to_string(), violations);
        assert_eq!(report.summary.blocked, 1);
        assert_eq!(report.summary.warning, 1);
        assert_eq!(report.summary.conflict, 0);
    }
}
