// ==========================================
// 医院药品库存监控系统 - 导入领域模型
// ==========================================
// 导入管道中间产物 + 批次信息 + DQ 报告
// ==========================================

use crate::domain::stock::{SeriesKey, StockRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// RawStockRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构 → DQ 校验 → StockRecord
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStockRecord {
    pub date: Option<NaiveDate>,
    pub hospital_id: Option<String>,
    pub hospital_name: Option<String>,
    pub medicine_name: Option<String>,
    pub opening_stock: Option<i64>,
    pub received: Option<i64>,
    pub issued: Option<i64>,
    pub closing_stock: Option<i64>,
    pub lead_time_days: Option<i64>,
    pub min_stock_level: Option<i64>,

    // 元信息
    pub row_number: usize, // 原始文件行号(用于 DQ 报告)
}

impl RawStockRecord {
    /// 序列主键(两段都存在时)
    pub fn key(&self) -> Option<SeriesKey> {
        match (&self.hospital_id, &self.medicine_name) {
            (Some(h), Some(m)) => Some(SeriesKey::new(h.clone(), m.clone())),
            _ => None,
        }
    }

    /// 转为完整台账(任一必填字段缺失返回 None)
    ///
    /// hospital_name 缺失时回退为 hospital_id
    pub fn to_stock_record(&self) -> Option<StockRecord> {
        Some(StockRecord {
            date: self.date?,
            hospital_id: self.hospital_id.clone()?,
            hospital_name: self
                .hospital_name
                .clone()
                .or_else(|| self.hospital_id.clone())?,
            medicine_name: self.medicine_name.clone()?,
            opening_stock: self.opening_stock?,
            received: self.received?,
            issued: self.issued?,
            closing_stock: self.closing_stock?,
            lead_time_days: self.lead_time_days?,
            min_stock_level: self.min_stock_level?,
        })
    }
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID(UUID)
    pub file_name: Option<String>,          // 源文件名
    pub file_path: Option<String>,          // 源文件路径
    pub total_rows: i64,                    // 总行数
    pub success_rows: i64,                  // 成功导入行数
    pub blocked_rows: i64,                  // 阻断行数(DQ ERROR)
    pub warning_rows: i64,                  // 警告行数(DQ WARNING)
    pub conflict_rows: i64,                 // 冲突行数(重复日期)
    pub imported_at: Option<DateTime<Utc>>, // 导入时间
    pub elapsed_ms: Option<i64>,            // 导入耗时(毫秒)
    pub dq_report_json: Option<String>,     // DQ 报告 JSON
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,           // 原始文件行号
    pub key: Option<SeriesKey>,      // 序列主键(如果可解析)
    pub level: DqLevel,              // 违规级别
    pub field: String,               // 违规字段
    pub message: String,             // 违规描述
}

// ==========================================
// DqLevel - 数据质量级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,    // 错误(阻断该行)
    Warning,  // 警告(允许导入)
    Info,     // 提示(仅记录)
    Conflict, // 冲突(同一序列日期重复,不导入)
}

impl DqLevel {
    /// 该级别是否阻止行落库
    pub fn blocks_row(&self) -> bool {
        matches!(self, DqLevel::Error | DqLevel::Conflict)
    }
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqReport {
    pub batch_id: String,
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize, // 总行数
    pub success: usize,    // 成功导入
    pub blocked: usize,    // 阻断(ERROR)
    pub warning: usize,    // 警告(WARNING)
    pub conflict: usize,   // 冲突(CONFLICT)
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch: ImportBatch,
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
    pub elapsed_time: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_stock_record_requires_all_fields() {
        let mut raw = RawStockRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            hospital_id: Some("H001".to_string()),
            hospital_name: None,
            medicine_name: Some("Paracetamol".to_string()),
            opening_stock: Some(10),
            received: Some(0),
            issued: Some(2),
            closing_stock: Some(8),
            lead_time_days: Some(3),
            min_stock_level: Some(5),
            row_number: 1,
        };

        let record = raw.to_stock_record().unwrap();
        // hospital_name 缺失时回退为 hospital_id
        assert_eq!(record.hospital_name, "H001");

        raw.issued = None;
        assert!(raw.to_stock_record().is_none());
    }

    #[test]
    fn test_dq_level_blocks_row() {
        assert!(DqLevel::Error.blocks_row());
        assert!(DqLevel::Conflict.blocks_row());
        assert!(!DqLevel::Warning.blocks_row());
        assert!(!DqLevel::Info.blocks_row());
    }
}
