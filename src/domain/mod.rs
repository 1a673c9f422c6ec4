// ==========================================
// 医院药品库存监控系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import;
pub mod stock;
pub mod types;

// 重导出核心类型
pub use import::{DqLevel, DqReport, DqSummary, DqViolation, ImportBatch, ImportOutcome, RawStockRecord};
pub use stock::{ReorderRecommendation, SeriesKey, StockRecord, StockStatus};
pub use types::{ReorderPriority, StockLevel};
