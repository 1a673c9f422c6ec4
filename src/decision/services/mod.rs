// ==========================================
// 医院药品库存监控系统 - Decision 服务层
// ==========================================
// 职责: 导出、定时刷新
// ==========================================

pub mod export_service;
pub mod refresh_service;

pub use export_service::{
    default_file_name, render_text_report, write_inventory_csv, write_reorder_csv, ExportError,
    ExportKind, ExportResult, ExportService,
};
pub use refresh_service::StatusRefresher;
