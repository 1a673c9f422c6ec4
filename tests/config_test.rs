// ==========================================
// 配置集成测试
// ==========================================
// 测试目标: 默认值、覆写持久化、ConfigApi 校验
// ==========================================


use hospital_stock::api::{ApiError, ConfigApi};
use hospital_stock::config::{config_keys, ConfigManager, DashboardParams};
use hospital_stock::engine::StockPolicy;
use std::sync::Arc;
use test_helpers::create_test_db;

#[test]
fn test_defaults_on_fresh_database() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(manager.load_policy().unwrap(), StockPolicy::default());
    assert_eq!(manager.load_dashboard_params().unwrap(), DashboardParams::default());
    assert_eq!(manager.get_config_snapshot().unwrap(), "{}");
}

#[test]
fn test_override_persists_across_managers() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    {
        let manager = ConfigManager::new(&db_path).unwrap();
        manager
            .set_config_value(config_keys::USAGE_WINDOW_DAYS, "14")
            .unwrap();
        manager
            .set_config_value(config_keys::FORECAST_HORIZON_DAYS, "3.5")
            .unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    let policy = manager.load_policy().unwrap();
    assert_eq!(policy.usage_window_days, 14);
    assert_eq!(policy.critical_buffer_days, 30);

    let params = manager.load_dashboard_params().unwrap();
    assert_eq!(params.forecast_horizon_days, 3.5);
    assert_eq!(params.stockout_cost, 50_000.0);
}

#[test]
fn test_config_api_list_and_update() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let api = ConfigApi::new(Arc::new(ConfigManager::new(&db_path).unwrap()));

    let items = api.list_configs().unwrap();
    assert_eq!(items.len(), 8);
    assert!(items.iter().all(|i| i.is_default));

    api.update_config("warning_buffer_days", "20").unwrap();
    let item = api.get_config("warning_buffer_days").unwrap();
    assert_eq!(item.value, "20");
    assert!(!item.is_default);

    let snapshot: serde_json::Value =
        serde_json::from_str(&api.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot["warning_buffer_days"], "20");
}

#[test]
fn test_config_api_rejects_bad_input() {
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let api = ConfigApi::new(Arc::new(ConfigManager::new(&db_path).unwrap()));

    for (key, value) in [
        ("unknown_key", "1"),
        ("usage_window_days", "0"),
        ("critical_buffer_days", "-1"),
        ("stockout_cost", "abc"),
        ("", "1"),
    ] {
        let err = api.update_config(key, value).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "{} = {}: {:?}", key, value, err);
    }

    assert!(matches!(api.get_config("unknown_key"), Err(ApiError::NotFound(_))));

    // 批量更新遇错即停,之前的项已生效
    let batch = vec![
        ("patients_per_stockout".to_string(), "30".to_string()),
        ("refresh_interval_secs".to_string(), "0".to_string()),
    ];
    assert!(api.batch_update_configs(&batch).is_err());
    assert_eq!(api.get_config("patients_per_stockout").unwrap().value, "30");
}
