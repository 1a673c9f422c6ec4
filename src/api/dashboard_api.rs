// ==========================================
// 医院药品库存监控系统 - 驾驶舱 API
// ==========================================
// 职责: 读取台账 → 引擎分级/补货 → 决策层读模型
// 架构: API 层 → Engine 层 → Decision 层 (纯计算)
// ==========================================
// 口径:
// - 日期范围结束日为评估基准日,之前的台账全部参与移动平均
// - 日期范围起始日只筛掉最新台账早于它的序列
// - 药品/医院过滤作用于 KPI、分布、热力图、补货表
// - 医院排名、影响指标、告警、预测、问答基于全部品项
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::decision::services::{default_file_name, ExportKind, ExportService};
use crate::decision::use_cases::{
    answer_question, build_heatmap, compute_impact, compute_kpis, forecast_stockouts,
    rank_hospitals, status_distribution, stock_trend, summarize_alerts, AlertSummary,
    AssistantAnswer, DashboardFilter, DateRange, FilterOptions, Heatmap, HospitalHealth,
    ImpactMetrics, KpiSummary, StatusShare, StockoutForecast, TrendSeries,
};
use crate::domain::stock::{ReorderRecommendation, StockRecord, StockStatus};
use crate::engine::{ReorderEngine, StockStatusEngine};
use crate::repository::StockRecordRepository;

// ==========================================
// 响应结构
// ==========================================

/// 驾驶舱快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub filter: DashboardFilter,
    pub kpi: KpiSummary,
    pub distribution: Vec<StatusShare>,
    pub heatmap: Heatmap,
    /// 过滤后的补货建议
    pub recommendations: Vec<ReorderRecommendation>,
    pub hospital_ranking: Vec<HospitalHealth>,
    pub impact: ImpactMetrics,
    pub alerts: AlertSummary,
    pub forecast: StockoutForecast,
}

/// 告警视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsView {
    pub summary: AlertSummary,
    pub forecast: StockoutForecast,
}

/// 一次评估的结果(同一份台账)
struct Evaluation {
    statuses: Vec<StockStatus>,
    recommendations: Vec<ReorderRecommendation>,
}

// ==========================================
// DashboardApi - 驾驶舱 API
// ==========================================

/// 驾驶舱API
///
/// 每次查询都从台账重新推导状态,不缓存
pub struct DashboardApi {
    stock_repo: Arc<StockRecordRepository>,
    config_manager: Arc<ConfigManager>,
}

impl DashboardApi {
    pub fn new(stock_repo: Arc<StockRecordRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            stock_repo,
            config_manager,
        }
    }

    /// 解析日期范围为闭区间
    fn resolve_range(&self, range: DateRange) -> ApiResult<(Option<NaiveDate>, Option<NaiveDate>)> {
        let latest = self.stock_repo.date_bounds()?.map(|(_, max)| max);
        Ok(range.resolve(latest))
    }

    /// 分级 + 补货
    ///
    /// 读取截至结束日的全部台账,移动平均窗口不受起始日截断;
    /// 起始日只用于剔除最新台账早于它的序列
    fn evaluate(&self, range: DateRange) -> ApiResult<Evaluation> {
        let policy = self.config_manager.load_policy()?;
        let (from, to) = self.resolve_range(range)?;
        let records = self.stock_repo.list_in_range(None, to)?;
        debug!(range = %range, from = ?from, to = ?to, records = records.len(), "台账读取完成");

        let in_range = |s: &StockStatus| from.map_or(true, |f| s.date >= f);
        let statuses: Vec<StockStatus> = StockStatusEngine::new(policy)
            .latest_status_per_series(&records)?
            .into_iter()
            .filter(in_range)
            .collect();
        let recommendations = ReorderEngine::new(&policy).recommend_all(&statuses);

        Ok(Evaluation {
            statuses,
            recommendations,
        })
    }

    // ==========================================
    // 状态 / 补货
    // ==========================================

    /// 当前库存状态(按 hospital_id, medicine_name 排序)
    #[instrument(skip(self))]
    pub fn list_stock_status(&self, filter: &DashboardFilter) -> ApiResult<Vec<StockStatus>> {
        let eval = self.evaluate(filter.date_range)?;
        Ok(filter.apply(&eval.statuses, |s| s))
    }

    /// 补货建议(优先级 → 可用天数 → 序列主键)
    #[instrument(skip(self))]
    pub fn list_reorder_recommendations(
        &self,
        filter: &DashboardFilter,
    ) -> ApiResult<Vec<ReorderRecommendation>> {
        let eval = self.evaluate(filter.date_range)?;
        Ok(filter.apply(&eval.recommendations, |r| &r.status))
    }

    // ==========================================
    // 驾驶舱聚合
    // ==========================================

    #[instrument(skip(self))]
    pub fn get_dashboard(&self, filter: &DashboardFilter) -> ApiResult<DashboardSnapshot> {
        let params = self.config_manager.load_dashboard_params()?;
        let eval = self.evaluate(filter.date_range)?;

        let statuses = filter.apply(&eval.statuses, |s| s);
        let recommendations = filter.apply(&eval.recommendations, |r| &r.status);

        let snapshot = DashboardSnapshot {
            filter: filter.clone(),
            kpi: compute_kpis(&statuses),
            distribution: status_distribution(&statuses),
            heatmap: build_heatmap(&statuses),
            recommendations,
            hospital_ranking: rank_hospitals(&eval.statuses),
            impact: compute_impact(&eval.recommendations, &eval.statuses, &params),
            alerts: summarize_alerts(&eval.recommendations),
            forecast: forecast_stockouts(&eval.recommendations, params.forecast_horizon_days),
        };

        info!(
            total_items = snapshot.kpi.total_items,
            critical = snapshot.kpi.critical,
            warning = snapshot.kpi.warning,
            "驾驶舱快照生成"
        );
        Ok(snapshot)
    }

    /// 告警摘要 + 断货预测
    #[instrument(skip(self))]
    pub fn get_alerts(&self, range: DateRange) -> ApiResult<AlertsView> {
        let params = self.config_manager.load_dashboard_params()?;
        let eval = self.evaluate(range)?;
        Ok(AlertsView {
            summary: summarize_alerts(&eval.recommendations),
            forecast: forecast_stockouts(&eval.recommendations, params.forecast_horizon_days),
        })
    }

    /// 单个药品的期末库存趋势
    #[instrument(skip(self))]
    pub fn get_stock_trend(&self, medicine_name: &str, range: DateRange) -> ApiResult<Vec<TrendSeries>> {
        if medicine_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("药品名称不能为空".to_string()));
        }

        let (from, to) = self.resolve_range(range)?;
        let records: Vec<StockRecord> = self
            .stock_repo
            .list_by_medicine(medicine_name)?
            .into_iter()
            .filter(|r| from.map_or(true, |f| r.date >= f) && to.map_or(true, |t| r.date <= t))
            .collect();

        Ok(stock_trend(&records, medicine_name))
    }

    /// 库存问答(基于全部品项)
    #[instrument(skip(self))]
    pub fn ask(&self, question: &str) -> ApiResult<AssistantAnswer> {
        if question.trim().is_empty() {
            return Err(ApiError::InvalidInput("问题不能为空".to_string()));
        }
        let eval = self.evaluate(DateRange::AllTime)?;
        Ok(answer_question(question, &eval.statuses))
    }

    /// 过滤下拉选项
    pub fn get_filter_options(&self) -> ApiResult<FilterOptions> {
        let records = self.stock_repo.list_all()?;
        Ok(FilterOptions::from_records(&records))
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出补货清单 / 库存明细 / 文本报告
    ///
    /// # 参数
    /// - out: 输出路径;为 None 时使用默认文件名(当前目录)
    ///
    /// # 返回
    /// - 实际写入的文件路径
    #[instrument(skip(self, out))]
    pub fn export(
        &self,
        kind: ExportKind,
        filter: &DashboardFilter,
        out: Option<&Path>,
        generated_at: NaiveDateTime,
    ) -> ApiResult<PathBuf> {
        let eval = self.evaluate(filter.date_range)?;
        let statuses = filter.apply(&eval.statuses, |s| s);
        let recommendations = filter.apply(&eval.recommendations, |r| &r.status);

        let path = out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(default_file_name(kind, generated_at.date())));

        // 报告汇总使用全部品项,明细使用过滤结果
        let summary_statuses = match kind {
            ExportKind::Report => &eval.statuses,
            _ => &statuses,
        };
        ExportService::export_to_path(kind, &path, generated_at, summary_statuses, &recommendations)?;
        Ok(path)
    }
}
