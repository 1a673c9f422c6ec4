// ==========================================
// 医院药品库存监控系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::domain::stock::SeriesKey;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
///
/// 分级与补货计算本身是全函数,错误只来自输入校验
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 同一序列出现重复日期,"最新一条"无法确定
    #[error("序列 {key} 存在重复日期: {date}")]
    DuplicateDate { key: SeriesKey, date: NaiveDate },

    /// 数值字段为负数
    #[error("台账数据无效 ({key} @ {date}): 字段为负数 [{fields}]")]
    InvalidRecord {
        key: SeriesKey,
        date: NaiveDate,
        fields: String,
    },

    /// 策略参数不合法
    #[error("策略参数无效: {0}")]
    InvalidPolicy(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
