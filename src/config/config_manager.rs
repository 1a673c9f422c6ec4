// ==========================================
// 医院药品库存监控系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::dashboard_params::DashboardParams;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::open_and_migrate;
use crate::engine::policy::StockPolicy;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分级/补货策略
    pub const USAGE_WINDOW_DAYS: &str = "usage_window_days";
    pub const CRITICAL_BUFFER_DAYS: &str = "critical_buffer_days";
    pub const WARNING_BUFFER_DAYS: &str = "warning_buffer_days";

    // 看板派生指标
    pub const FORECAST_HORIZON_DAYS: &str = "forecast_horizon_days";
    pub const STOCKOUT_COST: &str = "stockout_cost";
    pub const PATIENTS_PER_STOCKOUT: &str = "patients_per_stockout";
    pub const WASTE_KG_PER_HEALTHY: &str = "waste_kg_per_healthy";

    // watch 模式
    pub const REFRESH_INTERVAL_SECS: &str = "refresh_interval_secs";
}

#[derive(Debug, Clone, Copy)]
enum ValueKind {
    PositiveInt,
    NonNegativeInt,
    NonNegativeNumber,
}

/// 已知配置项: (key, 默认值, 取值类型)
const KNOWN_KEYS: &[(&str, &str, ValueKind)] = &[
    (config_keys::USAGE_WINDOW_DAYS, "7", ValueKind::PositiveInt),
    (config_keys::CRITICAL_BUFFER_DAYS, "30", ValueKind::NonNegativeInt),
    (config_keys::WARNING_BUFFER_DAYS, "15", ValueKind::NonNegativeInt),
    (config_keys::FORECAST_HORIZON_DAYS, "7", ValueKind::NonNegativeNumber),
    (config_keys::STOCKOUT_COST, "50000", ValueKind::NonNegativeNumber),
    (config_keys::PATIENTS_PER_STOCKOUT, "25", ValueKind::NonNegativeInt),
    (config_keys::WASTE_KG_PER_HEALTHY, "2", ValueKind::NonNegativeNumber),
    (config_keys::REFRESH_INTERVAL_SECS, "60", ValueKind::PositiveInt),
];

/// 校验单个配置值
///
/// 未知 key 返回 UnknownKey;类型或范围不符返回 InvalidValue
pub fn validate_config_value(key: &str, value: &str) -> ConfigResult<()> {
    let kind = KNOWN_KEYS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, kind)| *kind)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    };

    let trimmed = value.trim();
    match kind {
        ValueKind::PositiveInt => match trimmed.parse::<i64>() {
            Ok(v) if v >= 1 => Ok(()),
            Ok(_) => Err(invalid("必须 >= 1")),
            Err(_) => Err(invalid("必须为整数")),
        },
        ValueKind::NonNegativeInt => match trimmed.parse::<i64>() {
            Ok(v) if v >= 0 => Ok(()),
            Ok(_) => Err(invalid("不能为负")),
            Err(_) => Err(invalid("必须为整数")),
        },
        ValueKind::NonNegativeNumber => match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
            Ok(_) => Err(invalid("必须为非负有限数")),
            Err(_) => Err(invalid("必须为数字")),
        },
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_and_migrate(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 会对传入连接再次应用统一 PRAGMA(幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值(scope_id='global')
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 读取 global scope 的配置值(公开方法,供其他模块复用)
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 读取并解析配置值,缺失或格式错误时取默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误,使用默认值");
                Ok(default)
            }
        }
    }

    /// 写入配置(UPSERT),写入前按已知配置项校验
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_config_value(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;

        tracing::info!(config_key = key, value = value.trim(), "配置已更新");
        Ok(())
    }

    /// 获取已落库配置的快照(JSON 格式)
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 生效配置: 默认值叠加已落库覆写(仅已知配置项)
    pub fn get_effective_config(&self) -> ConfigResult<BTreeMap<String, String>> {
        let mut effective = BTreeMap::new();
        for (key, default, _) in KNOWN_KEYS {
            let value = self
                .get_config_value(key)?
                .unwrap_or_else(|| default.to_string());
            effective.insert(key.to_string(), value);
        }
        Ok(effective)
    }

    // ===== 分级/补货策略 =====

    /// 加载并校验 StockPolicy
    pub fn load_policy(&self) -> ConfigResult<StockPolicy> {
        let defaults = StockPolicy::default();
        let policy = StockPolicy {
            usage_window_days: self
                .get_parsed_or_default(config_keys::USAGE_WINDOW_DAYS, defaults.usage_window_days)?,
            critical_buffer_days: self.get_parsed_or_default(
                config_keys::CRITICAL_BUFFER_DAYS,
                defaults.critical_buffer_days,
            )?,
            warning_buffer_days: self
                .get_parsed_or_default(config_keys::WARNING_BUFFER_DAYS, defaults.warning_buffer_days)?,
        };

        policy.validate().map_err(|e| ConfigError::InvalidValue {
            key: "stock_policy".to_string(),
            value: format!("{:?}", policy),
            message: e.to_string(),
        })?;

        Ok(policy)
    }

    // ===== 看板派生指标 =====

    pub fn load_dashboard_params(&self) -> ConfigResult<DashboardParams> {
        let defaults = DashboardParams::default();
        Ok(DashboardParams {
            forecast_horizon_days: self.get_parsed_or_default(
                config_keys::FORECAST_HORIZON_DAYS,
                defaults.forecast_horizon_days,
            )?,
            stockout_cost: self
                .get_parsed_or_default(config_keys::STOCKOUT_COST, defaults.stockout_cost)?,
            patients_per_stockout: self.get_parsed_or_default(
                config_keys::PATIENTS_PER_STOCKOUT,
                defaults.patients_per_stockout,
            )?,
            waste_kg_per_healthy: self.get_parsed_or_default(
                config_keys::WASTE_KG_PER_HEALTHY,
                defaults.waste_kg_per_healthy,
            )?,
            refresh_interval_secs: self
                .get_parsed_or_default(config_keys::REFRESH_INTERVAL_SECS, defaults.refresh_interval_secs)?
                .max(1),
        })
    }
}
