// ==========================================
// 医院药品库存监控系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、快照
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;

/// 配置项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    /// 生效值
    pub value: String,
    /// 是否为默认值(未落库覆写)
    pub is_default: bool,
}

/// 配置管理API
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有已知配置项的生效值
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let effective = self.config_manager.get_effective_config()?;
        let mut items = Vec::with_capacity(effective.len());
        for (key, value) in effective {
            let is_default = self.config_manager.get_global_config_value(&key)?.is_none();
            items.push(ConfigItem {
                key,
                value,
                is_default,
            });
        }
        Ok(items)
    }

    /// 查询单个配置项
    pub fn get_config(&self, key: &str) -> ApiResult<ConfigItem> {
        self.list_configs()?
            .into_iter()
            .find(|item| item.key == key)
            .ok_or_else(|| ApiError::NotFound(format!("配置项(key={})不存在", key)))
    }

    /// 更新配置
    #[instrument(skip(self))]
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        self.config_manager.set_config_value(key.trim(), value)?;
        Ok(())
    }

    /// 批量更新配置,遇到第一个非法项即停止
    ///
    /// # 返回
    /// - Ok(usize): 更新的配置数量
    pub fn batch_update_configs(&self, configs: &[(String, String)]) -> ApiResult<usize> {
        if configs.is_empty() {
            return Err(ApiError::InvalidInput("配置列表不能为空".to_string()));
        }
        for (key, value) in configs {
            self.update_config(key, value)?;
        }
        Ok(configs.len())
    }

    /// 已落库配置快照(JSON)
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_config_snapshot()?)
    }
}
