// ==========================================
// 医院药品库存监控系统 - 配置层
// ==========================================
// 职责: 系统配置加载、校验与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod dashboard_params;
pub mod error;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use dashboard_params::DashboardParams;
pub use error::{ConfigError, ConfigResult};
