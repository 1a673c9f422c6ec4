// ==========================================
// 医院药品库存监控系统 - 决策层模块
// ==========================================
// 职责: 基于引擎输出构建驾驶舱读模型
// ==========================================
// 架构原则:
// - 决策层只消费 StockRecord / StockStatus / ReorderRecommendation 切片
// - 不访问数据库,数据由 API 层加载后传入
// - 文本输出(告警、问答、报告)统一走 i18n
// ==========================================

// 决策用例
pub mod use_cases;

// 决策服务(导出、定时刷新)
pub mod services;

pub use use_cases::{
    answer_question, build_heatmap, compute_impact, compute_kpis, forecast_stockouts,
    rank_hospitals, status_distribution, stock_trend, summarize_alerts, AlertItem, AlertSummary,
    AssistantAnswer, DashboardFilter, DateRange, FilterOptions, ForecastItem, Heatmap,
    HospitalHealth, ImpactMetrics, KpiSummary, StatusShare, StockoutForecast, TrendPoint,
    TrendSeries,
};

pub use services::{ExportError, ExportKind, ExportService, StatusRefresher};
