// ==========================================
// 医院药品库存监控系统 - 引擎层
// ==========================================
// 职责: 库存状态分级 + 补货建议 (纯计算)
// 红线: Engine 不拼 SQL, 不做 I/O, 无共享可变状态
// ==========================================

pub mod classifier;
pub mod error;
pub mod policy;
pub mod reorder;
pub mod status;
pub mod usage;

// 重导出核心引擎
pub use classifier::classify;
pub use error::{EngineError, EngineResult};
pub use policy::StockPolicy;
pub use reorder::ReorderEngine;
pub use status::{group_series, StockStatusEngine};
pub use usage::{compute_usage, trailing_usage};
