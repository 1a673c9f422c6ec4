// ==========================================
// 医院药品库存监控系统 - 导入层
// ==========================================
// 职责: 外部台账文件导入,生成 stock_record
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod stock_importer_impl;
pub mod stock_importer_trait;

// 重导出核心类型
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use stock_importer_impl::StockImporterImpl;

// 重导出 Trait 接口
pub use stock_importer_trait::{DqValidator, FieldMapper, FileParser, StockImporter};
