// ==========================================
// 医院药品库存监控系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误,转换为面向用户的错误消息
// ==========================================

use crate::config::ConfigError;
use crate::decision::services::ExportError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 台账数据不满足引擎前置条件(重复日期、负数)
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入 / 导出 / 配置
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidPolicy(msg) => ApiError::ConfigError(msg),
            other => ApiError::ValidationError(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(repo_err) => repo_err.into(),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => {
                ApiError::InvalidInput(err.to_string())
            }
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownKind(kind) => ApiError::InvalidInput(format!("未知导出类型: {}", kind)),
            other => ApiError::ExportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stock::SeriesKey;
    use chrono::NaiveDate;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "ImportBatch".to_string(),
            id: "B001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("ImportBatch"));
                assert!(msg.contains("B001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
    }

    #[test]
    fn test_engine_error_conversion() {
        let engine_err = EngineError::DuplicateDate {
            key: SeriesKey::new("H001", "Insulin"),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        match ApiError::from(engine_err) {
            ApiError::ValidationError(msg) => {
                assert!(msg.contains("H001/Insulin"));
                assert!(msg.contains("2024-01-01"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let api_err: ApiError = EngineError::InvalidPolicy("window".to_string()).into();
        assert!(matches!(api_err, ApiError::ConfigError(_)));
    }

    #[test]
    fn test_config_error_conversion() {
        let api_err: ApiError = ConfigError::UnknownKey("foo".to_string()).into();
        assert!(matches!(api_err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_import_error_unwraps_repository_error() {
        let import_err = ImportError::Repository(RepositoryError::DatabaseQueryError("boom".to_string()));
        assert!(matches!(ApiError::from(import_err), ApiError::DatabaseError(_)));

        let import_err = ImportError::FileNotFound("/tmp/x.csv".to_string());
        assert!(matches!(ApiError::from(import_err), ApiError::ImportError(_)));
    }
}
