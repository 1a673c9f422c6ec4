// ==========================================
// 医院药品库存监控系统 - 台账导入器实现
// ==========================================
// 职责: 整合导入流程,从文件到数据库
// 流程: 解析 → 映射 → DQ 校验 → 冲突检测 → 落库 → 记录批次
// ==========================================

use crate::domain::import::{DqLevel, DqViolation, ImportBatch, ImportOutcome, RawStockRecord};
use crate::domain::stock::{SeriesKey, StockRecord};
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::stock_importer_trait::{DqValidator, FieldMapper, FileParser, StockImporter};
use crate::repository::{ImportBatchRepository, StockRecordRepository};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// StockImporterImpl - 台账导入器实现
// ==========================================
pub struct StockImporterImpl {
    // 数据访问层
    stock_repo: Arc<StockRecordRepository>,
    batch_repo: Arc<ImportBatchRepository>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    dq_validator: Box<dyn DqValidator>,
}

impl StockImporterImpl {
    pub fn new(
        stock_repo: Arc<StockRecordRepository>,
        batch_repo: Arc<ImportBatchRepository>,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        dq_validator: Box<dyn DqValidator>,
    ) -> Self {
        Self {
            stock_repo,
            batch_repo,
            file_parser,
            field_mapper,
            dq_validator,
        }
    }

    /// 使用默认组件(按扩展名解析 + 标准字段映射 + 标准 DQ 规则)
    pub fn with_default_components(
        stock_repo: Arc<StockRecordRepository>,
        batch_repo: Arc<ImportBatchRepository>,
    ) -> Self {
        Self::new(
            stock_repo,
            batch_repo,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DqValidatorImpl),
        )
    }
}

#[async_trait::async_trait]
impl StockImporter for StockImporterImpl {
    /// 导入单个台账文件
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入结果(含 DQ 违规明细)
    /// - Err: 文件级错误或落库失败
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path = file_path.as_ref();
        let file_path_str = path.display().to_string();
        info!(batch_id = %batch_id, file_path = %file_path_str, "开始导入库存台账");

        // === 步骤 1: 解析文件 ===
        let raw_rows = self.file_parser.parse_to_raw_records(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        let total_rows = raw_rows.len();
        info!(total_rows = total_rows, "文件解析完成");

        // === 步骤 2: 字段映射 ===
        let mut records = Vec::with_capacity(total_rows);
        let mut violations = Vec::new();
        for (idx, row) in raw_rows.iter().enumerate() {
            match self.field_mapper.map_to_raw_stock(row, idx + 1) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(row_number = idx + 1, error = %e, "字段映射失败");
                    violations.push(DqViolation {
                        row_number: idx + 1,
                        key: None,
                        level: DqLevel::Error,
                        field: e.field().unwrap_or("row").to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        debug!(success = records.len(), failed = violations.len(), "字段映射完成");

        // === 步骤 3: DQ 校验 ===
        for record in &records {
            violations.extend(self.dq_validator.validate_required_fields(record));
            violations.extend(self.dq_validator.validate_values(record));
        }

        // === 步骤 4: 冲突检测(同批次 + 跨批次) ===
        violations.extend(self.dq_validator.detect_duplicates(&records));
        let existing = self.find_existing(&records)?;
        violations.extend(self.dq_validator.detect_cross_batch_duplicates(&records, &existing));

        let blocked: HashSet<usize> = violations
            .iter()
            .filter(|v| v.level.blocks_row())
            .map(|v| v.row_number)
            .collect();

        // === 步骤 5: 转换并落库 ===
        let valid: Vec<StockRecord> = records
            .iter()
            .filter(|r| !blocked.contains(&r.row_number))
            .filter_map(RawStockRecord::to_stock_record)
            .collect();

        let success_count = if valid.is_empty() {
            0
        } else {
            self.stock_repo.batch_insert(&valid, Some(&batch_id))?
        };
        info!(count = success_count, "台账写入完成");

        // === 步骤 6: 记录批次信息 ===
        let mut dq_report = self
            .dq_validator
            .generate_dq_report(batch_id.clone(), violations);
        dq_report.summary.total_rows = total_rows;
        dq_report.summary.success = success_count;

        let elapsed_time = start_time.elapsed();
        let batch = ImportBatch {
            batch_id: batch_id.clone(),
            file_name: path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.to_string()),
            file_path: Some(file_path_str),
            total_rows: total_rows as i64,
            success_rows: success_count as i64,
            blocked_rows: dq_report.summary.blocked as i64,
            warning_rows: dq_report.summary.warning as i64,
            conflict_rows: dq_report.summary.conflict as i64,
            imported_at: Some(Utc::now()),
            elapsed_ms: Some(elapsed_time.as_millis() as i64),
            dq_report_json: Some(serde_json::to_string(&dq_report)?),
        };
        self.batch_repo.insert(&batch)?;

        info!(
            batch_id = %batch_id,
            total = total_rows,
            success = success_count,
            blocked = dq_report.summary.blocked,
            conflicts = dq_report.summary.conflict,
            elapsed_ms = elapsed_time.as_millis() as u64,
            "库存台账导入完成"
        );

        Ok(ImportOutcome {
            batch,
            summary: dq_report.summary,
            violations: dq_report.violations,
            elapsed_time,
        })
    }

    /// 台账为空时导入(首次启动自动加载样例数据)
    async fn import_if_empty<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<Option<ImportOutcome>> {
        let existing = self.stock_repo.count()?;
        if existing > 0 {
            info!(existing = existing, "台账非空,跳过自动导入");
            return Ok(None);
        }
        self.import_file(file_path).await.map(Some)
    }

    /// 批量导入多个文件(并发执行)
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportOutcome, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                match self.import_file(path).await {
                    Ok(result) => {
                        info!(file = %path_str, success = result.summary.success, "文件导入成功");
                        Ok(result)
                    }
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}

// 辅助方法
impl StockImporterImpl {
    /// 查询本批次中已落库的 (序列, 日期)
    fn find_existing(
        &self,
        records: &[RawStockRecord],
    ) -> ImportResult<HashSet<(SeriesKey, NaiveDate)>> {
        let mut existing = HashSet::new();
        for record in records {
            let (Some(key), Some(date)) = (record.key(), record.date) else {
                continue;
            };
            if self
                .stock_repo
                .exists(&key.hospital_id, &key.medicine_name, date)?
            {
                existing.insert((key, date));
            }
        }
        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::Builder;

    const HEADER: &str = "date,hospital_id,hospital_name,medicine_name,opening_stock,received,issued,closing_stock,lead_time_days,min_stock_level";

    fn create_test_importer() -> (StockImporterImpl, Arc<StockRecordRepository>, Arc<ImportBatchRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let stock_repo = Arc::new(StockRecordRepository::from_connection(conn.clone()));
        let batch_repo = Arc::new(ImportBatchRepository::from_connection(conn));
        let importer =
            StockImporterImpl::with_default_components(stock_repo.clone(), batch_repo.clone());
        (importer, stock_repo, batch_repo)
    }

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_import_valid_file() {
        let (importer, stock_repo, batch_repo) = create_test_importer();
        let file = write_csv(&[
            "2024-01-01,H001,City General,Insulin,50,0,10,40,5,10",
            "2024-01-02,H001,City General,Insulin,40,0,10,30,5,10",
        ]);

        let result = importer.import_file(file.path()).await.unwrap();

        assert_eq!(result.summary.total_rows, 2);
        assert_eq!(result.summary.success, 2);
        assert!(result.violations.is_empty());
        assert_eq!(stock_repo.count().unwrap(), 2);

        let batch = batch_repo.find_by_id(&result.batch.batch_id).unwrap().unwrap();
        assert_eq!(batch.success_rows, 2);
        assert!(batch.dq_report_json.is_some());
    }

    #[tokio::test]
    async fn test_import_blocks_bad_rows_and_keeps_warnings() {
        let (importer, stock_repo, _) = create_test_importer();
        let file = write_csv(&[
            "2024-01-01,H001,City General,Insulin,50,0,10,40,5,10",  // 正常
            "2024-01-02,H001,City General,Insulin,40,0,abc,30,5,10", // 非数字
            "2024-01-03,H001,City General,Insulin,30,0,-1,31,5,10",  // 负数
            "2024-01-04,H001,City General,Insulin,30,0,10,25,5,10",  // 不平衡(警告)
            "2024-01-01,H001,City General,Insulin,50,0,10,40,5,10",  // 同批次重复
            "2024-01-05,,City General,Insulin,30,0,10,20,5,10",      // 缺主键
        ]);

        let result = importer.import_file(file.path()).await.unwrap();

        assert_eq!(result.summary.total_rows, 6);
        assert_eq!(result.summary.success, 2);
        assert_eq!(result.summary.blocked, 3);
        assert_eq!(result.summary.conflict, 1);
        assert_eq!(result.summary.warning, 1);
        assert_eq!(stock_repo.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reimport_reports_conflicts() {
        let (importer, stock_repo, _) = create_test_importer();
        let file = write_csv(&["2024-01-01,H001,City General,Insulin,50,0,10,40,5,10"]);

        importer.import_file(file.path()).await.unwrap();
        let second = importer.import_file(file.path()).await.unwrap();

        assert_eq!(second.summary.success, 0);
        assert_eq!(second.summary.conflict, 1);
        assert_eq!(stock_repo.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_if_empty() {
        let (importer, stock_repo, _) = create_test_importer();
        let file = write_csv(&["2024-01-01,H001,City General,Insulin,50,0,10,40,5,10"]);

        assert!(importer.import_if_empty(file.path()).await.unwrap().is_some());
        assert!(importer.import_if_empty(file.path()).await.unwrap().is_none());
        assert_eq!(stock_repo.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_import_reports_per_file() {
        let (importer, stock_repo, _) = create_test_importer();
        let a = write_csv(&["2024-01-01,H001,City General,Insulin,50,0,10,40,5,10"]);
        let b = write_csv(&["2024-01-01,H002,Riverside,Insulin,50,0,10,40,5,10"]);

        let results = importer
            .batch_import(vec![
                a.path().to_path_buf(),
                b.path().to_path_buf(),
                std::path::PathBuf::from("/no/such/file.csv"),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(results[2].is_err());
        assert_eq!(stock_repo.count().unwrap(), 2);
    }
}
