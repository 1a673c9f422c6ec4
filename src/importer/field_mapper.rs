// ==========================================
// 医院药品库存监控系统 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 标准字段映射 + 类型转换
// 输入表头已由 FileParser 归一化为小写下划线形式
// ==========================================

use crate::domain::import::RawStockRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::stock_importer_trait::FieldMapper as FieldMapperTrait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// 支持的日期格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_stock(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<RawStockRecord> {
        Ok(RawStockRecord {
            date: self.parse_date(row, "date", row_number)?,
            hospital_id: self.get_string(row, "hospital_id"),
            hospital_name: self.get_string(row, "hospital_name"),
            medicine_name: self.get_string(row, "medicine_name"),
            opening_stock: self.parse_i64(row, "opening_stock", row_number)?,
            received: self.parse_i64(row, "received", row_number)?,
            issued: self.parse_i64(row, "issued", row_number)?,
            closing_stock: self.parse_i64(row, "closing_stock", row_number)?,
            lead_time_days: self.parse_i64(row, "lead_time_days", row_number)?,
            min_stock_level: self.parse_i64(row, "min_stock_level", row_number)?,
            row_number,
        })
    }
}

impl FieldMapper {
    /// 提取字符串字段(返回 Option),支持多个可能的列名(别名)
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "date" => &["date", "stock_date", "日期"],
            "hospital_id" => &["hospital_id", "hospital_code", "医院编码"],
            "hospital_name" => &["hospital_name", "hospital", "医院名称"],
            "medicine_name" => &["medicine_name", "medicine", "drug_name", "药品名称"],
            "opening_stock" => &["opening_stock", "期初库存"],
            "received" => &["received", "入库"],
            "issued" => &["issued", "出库"],
            "closing_stock" => &["closing_stock", "current_stock", "期末库存"],
            "lead_time_days" => &["lead_time_days", "lead_time", "交货期"],
            "min_stock_level" => &["min_stock_level", "min_level", "最低库存"],
            _ => &[],
        };

        aliases
            .iter()
            .chain(std::iter::once(&key))
            .filter_map(|alias| row.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// 解析整数
    ///
    /// 接受整数值的小数写法(Excel 单元格常见 "50.0"),其余小数视为转换失败
    fn parse_i64(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<i64>> {
        let Some(value) = self.get_string(row, key) else {
            return Ok(None);
        };

        if let Ok(v) = value.parse::<i64>() {
            return Ok(Some(v));
        }

        match value.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
            _ => Err(ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("无法解析为整数: {}", value),
            }),
        }
    }

    /// 解析日期(YYYY-MM-DD / YYYY/MM/DD / YYYYMMDD → NaiveDate)
    fn parse_date(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        let Some(value) = self.get_string(row, key) else {
            return Ok(None);
        };

        // 兼容带时间部分的写法,只取日期
        let date_part = value.split_whitespace().next().unwrap_or(&value);
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
            .map(Some)
            .ok_or_else(|| ImportError::DateFormatError {
                row: row_number,
                field: key.to_string(),
                value: value.clone(),
            })
    }
}
