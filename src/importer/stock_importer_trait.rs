// ==========================================
// 医院药品库存监控系统 - 台账导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口(不包含实现)
// 流程: 解析 → 映射 → DQ 校验 → 冲突检测 → 落库
// ==========================================

use crate::domain::import::{DqReport, DqViolation, ImportOutcome, RawStockRecord};
use crate::domain::stock::SeriesKey;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::Path;

// ==========================================
// StockImporter Trait
// ==========================================
// 用途: 台账导入主接口
// 实现者: StockImporterImpl
#[async_trait]
pub trait StockImporter: Send + Sync {
    /// 导入单个文件(.csv / .xlsx / .xls)
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportOutcome>;

    /// 台账为空时才导入,否则返回 None
    async fn import_if_empty<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<Option<ImportOutcome>>;

    /// 批量导入多个文件
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportOutcome, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口(阶段 0)
// 输出: 每行 表头 → 单元格文本;表头已统一为小写下划线形式
pub trait FileParser: Send + Sync {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<HashMap<String, String>>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口(阶段 1)
pub trait FieldMapper: Send + Sync {
    fn map_to_raw_stock(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<RawStockRecord>;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 数据质量校验接口(阶段 2-3)
pub trait DqValidator: Send + Sync {
    /// 必填字段缺失 → ERROR
    fn validate_required_fields(&self, record: &RawStockRecord) -> Vec<DqViolation>;

    /// 数值为负 → ERROR;台账不平衡 → WARNING
    fn validate_values(&self, record: &RawStockRecord) -> Vec<DqViolation>;

    /// 同批次内 (hospital_id, medicine_name, date) 重复 → CONFLICT
    fn detect_duplicates(&self, records: &[RawStockRecord]) -> Vec<DqViolation>;

    /// 与已落库台账重复 → CONFLICT
    fn detect_cross_batch_duplicates(
        &self,
        records: &[RawStockRecord],
        existing: &HashSet<(SeriesKey, NaiveDate)>,
    ) -> Vec<DqViolation>;

    fn generate_dq_report(&self, batch_id: String, violations: Vec<DqViolation>) -> DqReport;
}
