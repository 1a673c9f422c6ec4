// ==========================================
// 医院药品库存监控系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + CLI
// 系统定位: 决策支持系统 (补货由人工确认)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 库存分级与补货计算
pub mod engine;

// 导入层 - 外部台账
pub mod importer;

// 配置层 - 策略参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// 决策层 - 看板读模型
pub mod decision;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ReorderPriority, StockLevel};

// 领域实体
pub use domain::{ImportBatch, ReorderRecommendation, SeriesKey, StockRecord, StockStatus};

// 引擎
pub use engine::{ReorderEngine, StockPolicy, StockStatusEngine};

// API
pub use api::{ApiError, ApiResult, DashboardApi, ImportApi};

// 应用状态
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "医院药品库存监控系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
