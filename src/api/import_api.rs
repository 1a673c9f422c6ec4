// ==========================================
// 医院药品库存监控系统 - 台账导入 API
// ==========================================
// 职责: 封装台账导入与导入批次查询
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::import::{DqSummary, DqViolation, ImportBatch, ImportOutcome};
use crate::importer::{StockImporter, StockImporterImpl};
use crate::repository::{ImportBatchRepository, StockRecordRepository};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入批次ID(由导入器生成)
    pub batch_id: String,
    /// 新导入的台账行数
    pub imported: i64,
    /// 冲突行数(重复日期,未导入)
    pub conflicts: i64,
    /// 阻断行数(DQ ERROR)
    pub blocked: i64,
    /// DQ 汇总统计
    pub dq_summary: DqSummary,
    /// DQ 违规明细
    pub dq_violations: Vec<DqViolation>,
    /// 导入耗时(毫秒)
    pub elapsed_ms: i64,
}

impl From<ImportOutcome> for ImportApiResponse {
    fn from(outcome: ImportOutcome) -> Self {
        Self {
            batch_id: outcome.batch.batch_id.clone(),
            imported: outcome.summary.success as i64,
            conflicts: outcome.summary.conflict as i64,
            blocked: outcome.summary.blocked as i64,
            elapsed_ms: outcome.elapsed_time.as_millis() as i64,
            dq_summary: outcome.summary,
            dq_violations: outcome.violations,
        }
    }
}

/// 导入API
pub struct ImportApi {
    importer: StockImporterImpl,
    batch_repo: Arc<ImportBatchRepository>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(stock_repo: Arc<StockRecordRepository>, batch_repo: Arc<ImportBatchRepository>) -> Self {
        Self {
            importer: StockImporterImpl::with_default_components(stock_repo, batch_repo.clone()),
            batch_repo,
        }
    }

    /// 导入台账文件(.csv / .xlsx / .xls)
    #[instrument(skip(self))]
    pub async fn import_stock_file(&self, file_path: &str) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let outcome = self.importer.import_file(file_path).await?;
        info!(
            batch_id = %outcome.batch.batch_id,
            imported = outcome.summary.success,
            "台账导入完成"
        );
        Ok(outcome.into())
    }

    /// 库为空时才导入(首次启动自动装载样例数据)
    ///
    /// # 返回
    /// - Ok(None): 库中已有数据,未导入
    #[instrument(skip(self))]
    pub async fn import_if_empty(&self, file_path: &str) -> ApiResult<Option<ImportApiResponse>> {
        let outcome = self.importer.import_if_empty(file_path).await?;
        Ok(outcome.map(ImportApiResponse::from))
    }

    /// 批量导入多个文件(并发解析)
    ///
    /// 每个文件独立成批,单个失败不影响其他文件
    pub async fn import_stock_files(&self, file_paths: Vec<String>) -> Vec<Result<ImportApiResponse, String>> {
        self.importer
            .batch_import(file_paths)
            .await
            .into_iter()
            .map(|r| r.map(ImportApiResponse::from))
            .collect()
    }

    /// 最近的导入批次
    pub fn list_import_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        Ok(self.batch_repo.list_recent(limit)?)
    }

    /// 查询单个导入批次
    pub fn get_import_batch(&self, batch_id: &str) -> ApiResult<ImportBatch> {
        self.batch_repo
            .find_by_id(batch_id)?
            .ok_or_else(|| ApiError::NotFound(format!("导入批次(id={})不存在", batch_id)))
    }
}
