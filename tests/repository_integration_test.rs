// ==========================================
// 仓储层集成测试
// ==========================================
// 测试目标: 台账/批次落库往返、区间查询、唯一约束
// ==========================================


use chrono::Utc;
use hospital_stock::domain::ImportBatch;
use hospital_stock::repository::{ImportBatchRepository, RepositoryError, StockRecordRepository};
use test_helpers::{build_series, create_test_db, date};

#[test]
fn test_stock_record_round_trip() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = StockRecordRepository::new(&db_path).unwrap();

    let records = build_series("H001", "Insulin", 100, &[5, 6, 7], 5, 10);
    let inserted = repo.batch_insert(&records, Some("batch-1")).unwrap();
    assert_eq!(inserted, 3);

    let loaded = repo.list_all().unwrap();
    assert_eq!(loaded, records);
    assert!(repo.exists("H001", "Insulin", date(2024, 1, 2)).unwrap());
    assert!(!repo.exists("H001", "Insulin", date(2024, 1, 9)).unwrap());
}

#[test]
fn test_data_survives_reopen() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    {
        let repo = StockRecordRepository::new(&db_path).unwrap();
        repo.batch_insert(&build_series("H001", "Saline", 50, &[1, 1], 3, 5), None)
            .unwrap();
    }

    let repo = StockRecordRepository::new(&db_path).unwrap();
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn test_list_in_range_and_bounds() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = StockRecordRepository::new(&db_path).unwrap();
    assert!(repo.date_bounds().unwrap().is_none());

    let mut records = build_series("H001", "Insulin", 100, &[1; 10], 5, 10);
    records.extend(build_series("H002", "Insulin", 100, &[2; 5], 5, 10));
    repo.batch_insert(&records, None).unwrap();

    assert_eq!(
        repo.date_bounds().unwrap(),
        Some((date(2024, 1, 1), date(2024, 1, 10)))
    );

    let window = repo
        .list_in_range(Some(date(2024, 1, 4)), Some(date(2024, 1, 6)))
        .unwrap();
    // H001 三天 + H002 两天
    assert_eq!(window.len(), 5);
    assert!(window
        .iter()
        .all(|r| r.date >= date(2024, 1, 4) && r.date <= date(2024, 1, 6)));

    let open_ended = repo.list_in_range(Some(date(2024, 1, 9)), None).unwrap();
    assert_eq!(open_ended.len(), 2);

    let insulin = repo.list_by_medicine("Insulin").unwrap();
    assert_eq!(insulin.len(), 15);
    assert!(repo.list_by_medicine("Saline").unwrap().is_empty());
}

#[test]
fn test_duplicate_key_rolls_back_batch() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = StockRecordRepository::new(&db_path).unwrap();

    let records = build_series("H001", "Insulin", 100, &[5, 5], 5, 10);
    repo.batch_insert(&records, None).unwrap();

    let mut again = build_series("H002", "Insulin", 100, &[5], 5, 10);
    again.push(records[0].clone());
    let err = repo.batch_insert(&again, None).unwrap_err();

    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)), "{:?}", err);
    // 整批回滚,H002 未写入
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn test_import_batch_round_trip() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = ImportBatchRepository::new(&db_path).unwrap();

    let batch = ImportBatch {
        batch_id: "batch-1".to_string(),
        file_name: Some("stock.csv".to_string()),
        file_path: Some("/tmp/stock.csv".to_string()),
        total_rows: 10,
        success_rows: 8,
        blocked_rows: 1,
        warning_rows: 0,
        conflict_rows: 1,
        imported_at: Some(Utc::now()),
        elapsed_ms: Some(12),
        dq_report_json: Some("{}".to_string()),
    };
    repo.insert(&batch).unwrap();

    let loaded = repo.find_by_id("batch-1").unwrap().expect("批次应存在");
    assert_eq!(loaded.total_rows, 10);
    assert_eq!(loaded.success_rows, 8);
    assert_eq!(loaded.conflict_rows, 1);
    assert_eq!(loaded.file_name.as_deref(), Some("stock.csv"));

    assert!(repo.find_by_id("missing").unwrap().is_none());
    assert_eq!(repo.list_recent(5).unwrap().len(), 1);
}
