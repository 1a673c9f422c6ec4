// ==========================================
// 医院药品库存监控系统 - 库存台账数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑(分级/补货由 engine 负责)
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::open_and_migrate;
use crate::domain::stock::StockRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    date, hospital_id, hospital_name, medicine_name,
    opening_stock, received, issued, closing_stock,
    lead_time_days, min_stock_level
"#;

// ==========================================
// StockRecordRepository - 库存台账仓储
// ==========================================
/// 职责: 管理 stock_record 表的写入与查询
/// 台账只追加,不提供更新接口
pub struct StockRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRecordRepository {
    /// 打开数据库文件并建表
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_and_migrate(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量追加台账
    ///
    /// # 说明
    /// - 单事务写入,任一行失败整体回滚
    /// - (hospital_id, medicine_name, date) 重复时返回 UniqueConstraintViolation
    pub fn batch_insert(&self, records: &[StockRecord], batch_id: Option<&str>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO stock_record (
                    date, hospital_id, hospital_name, medicine_name,
                    opening_stock, received, issued, closing_stock,
                    lead_time_days, min_stock_level, batch_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )?;
            for r in records {
                stmt.execute(params![
                    r.date,
                    r.hospital_id,
                    r.hospital_name,
                    r.medicine_name,
                    r.opening_stock,
                    r.received,
                    r.issued,
                    r.closing_stock,
                    r.lead_time_days,
                    r.min_stock_level,
                    batch_id,
                ])?;
                count += 1;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 台账总行数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM stock_record", [], |row| row.get(0))?;
        Ok(n)
    }

    /// 指定序列在指定日期是否已有台账
    pub fn exists(&self, hospital_id: &str, medicine_name: &str, date: NaiveDate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM stock_record WHERE hospital_id = ?1 AND medicine_name = ?2 AND date = ?3",
                params![hospital_id, medicine_name, date],
                |_row| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    /// 查询全部台账(按 hospital_id, medicine_name, date 排序)
    pub fn list_all(&self) -> RepositoryResult<Vec<StockRecord>> {
        self.list_in_range(None, None)
    }

    /// 按日期区间查询台账(闭区间,端点可选)
    pub fn list_in_range(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> RepositoryResult<Vec<StockRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM stock_record
            WHERE (?1 IS NULL OR date >= ?1)
              AND (?2 IS NULL OR date <= ?2)
            ORDER BY hospital_id, medicine_name, date
            "#,
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![date_from, date_to], map_stock_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 查询单个药品在所有医院的台账(趋势图数据源)
    pub fn list_by_medicine(&self, medicine_name: &str) -> RepositoryResult<Vec<StockRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM stock_record
            WHERE medicine_name = ?1
            ORDER BY date, hospital_name
            "#,
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![medicine_name], map_stock_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// 台账日期范围 (min_date, max_date);空表返回 None
    pub fn date_bounds(&self) -> RepositoryResult<Option<(NaiveDate, NaiveDate)>> {
        let conn = self.get_conn()?;
        let bounds: (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
            "SELECT MIN(date), MAX(date) FROM stock_record",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(match bounds {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
    }
}

fn map_stock_record(row: &Row<'_>) -> rusqlite::Result<StockRecord> {
    Ok(StockRecord {
        date: row.get(0)?,
        hospital_id: row.get(1)?,
        hospital_name: row.get(2)?,
        medicine_name: row.get(3)?,
        opening_stock: row.get(4)?,
        received: row.get(5)?,
        issued: row.get(6)?,
        closing_stock: row.get(7)?,
        lead_time_days: row.get(8)?,
        min_stock_level: row.get(9)?,
    })
}
