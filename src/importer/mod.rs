// ==========================================
// 施工进度计划分析引擎 - 导入层
// ==========================================
// 职责: 外部进度计划文件 → Milestone 快照
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod milestone_importer;
pub mod milestone_mapper;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use milestone_importer::{ImportSummary, MilestoneImporter};
pub use milestone_mapper::MilestoneFieldMapper;
