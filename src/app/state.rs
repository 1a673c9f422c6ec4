// ==========================================
// 医院药品库存监控系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, DashboardApi, ImportApi};
use crate::config::ConfigManager;
use crate::repository::{ImportBatchRepository, StockRecordRepository};

/// 应用状态
///
/// 所有仓储共享同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 驾驶舱API
    pub dashboard_api: Arc<DashboardApi>,

    /// 台账导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 配置管理器(CLI 读取刷新间隔等参数)
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径(不存在时自动建库建表)
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_and_migrate(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let stock_repo = Arc::new(StockRecordRepository::from_connection(conn.clone()));
        let batch_repo = Arc::new(ImportBatchRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let dashboard_api = Arc::new(DashboardApi::new(stock_repo.clone(), config_manager.clone()));
        let import_api = Arc::new(ImportApi::new(stock_repo, batch_repo));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            dashboard_api,
            import_api,
            config_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 HOSPITAL_STOCK_DB_PATH
/// 2. 用户数据目录/hospital-stock/hospital_stock.db
/// 3. ./hospital_stock.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("HOSPITAL_STOCK_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./hospital_stock.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("hospital-stock");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("hospital_stock.db");
        }
    }

    path.to_string_lossy().to_string()
}
