// ==========================================
// 医院药品库存监控系统 - 导入批次仓储
// ==========================================
// 职责: import_batch 表的写入与查询
// ==========================================

use crate::db::open_and_migrate;
use crate::domain::import::ImportBatch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_migrate(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入批次记录
    pub fn insert(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, file_path, total_rows, success_rows,
                blocked_rows, warning_rows, conflict_rows, imported_at,
                elapsed_ms, dq_report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.file_path,
                batch.total_rows,
                batch.success_rows,
                batch.blocked_rows,
                batch.warning_rows,
                batch.conflict_rows,
                batch.imported_at.map(|t| t.to_rfc3339()),
                batch.elapsed_ms,
                batch.dq_report_json,
            ],
        )?;
        Ok(())
    }

    /// 按 batch_id 查询
    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let batch = conn
            .query_row(
                r#"
                SELECT batch_id, file_name, file_path, total_rows, success_rows,
                       blocked_rows, warning_rows, conflict_rows, imported_at,
                       elapsed_ms, dq_report_json
                FROM import_batch
                WHERE batch_id = ?1
                "#,
                params![batch_id],
                map_import_batch,
            )
            .optional()?;
        Ok(batch)
    }

    /// 最近导入批次(按导入时间倒序)
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_id, file_name, file_path, total_rows, success_rows,
                   blocked_rows, warning_rows, conflict_rows, imported_at,
                   elapsed_ms, dq_report_json
            FROM import_batch
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], map_import_batch)?;

        let mut batches = Vec::new();
        for row in rows {
            batches.push(row?);
        }
        Ok(batches)
    }
}

fn map_import_batch(row: &Row<'_>) -> rusqlite::Result<ImportBatch> {
    let imported_at: Option<String> = row.get(8)?;
    Ok(ImportBatch {
        batch_id: row.get(0)?,
        file_name: row.get(1)?,
        file_path: row.get(2)?,
        total_rows: row.get(3)?,
        success_rows: row.get(4)?,
        blocked_rows: row.get(5)?,
        warning_rows: row.get(6)?,
        conflict_rows: row.get(7)?,
        imported_at: imported_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|t| t.with_timezone(&Utc)),
        elapsed_ms: row.get(9)?,
        dq_report_json: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use chrono::TimeZone;

    fn create_test_repo() -> ImportBatchRepository {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ImportBatchRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn create_test_batch(batch_id: &str, day: u32) -> ImportBatch {
        ImportBatch {
            batch_id: batch_id.to_string(),
            file_name: Some("stock.csv".to_string()),
            file_path: Some("/tmp/stock.csv".to_string()),
            total_rows: 10,
            success_rows: 8,
            blocked_rows: 1,
            warning_rows: 2,
            conflict_rows: 1,
            imported_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap()),
            elapsed_ms: Some(42),
            dq_report_json: Some("{}".to_string()),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = create_test_repo();
        repo.insert(&create_test_batch("b1", 1)).unwrap();

        let found = repo.find_by_id("b1").unwrap().unwrap();
        assert_eq!(found.success_rows, 8);
        assert_eq!(found.conflict_rows, 1);
        assert_eq!(found.imported_at, Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()));

        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_recent_orders_newest_first() {
        let repo = create_test_repo();
        repo.insert(&create_test_batch("b1", 1)).unwrap();
        repo.insert(&create_test_batch("b3", 3)).unwrap();
        repo.insert(&create_test_batch("b2", 2)).unwrap();

        let ids: Vec<String> = repo
            .list_recent(2)
            .unwrap()
            .into_iter()
            .map(|b| b.batch_id)
            .collect();
        assert_eq!(ids, vec!["b3", "b2"]);
    }
}
