// ==========================================
// 医院药品库存监控系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 调用
// ==========================================

pub mod config_api;
pub mod dashboard_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use dashboard_api::{AlertsView, DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
