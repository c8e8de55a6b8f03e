// ==========================================
// 施工进度计划分析引擎 - API 层
// ==========================================
// 职责: 提供进程内分析接口, 供 CLI 与上层服务调用
// ==========================================

pub mod error;
pub mod programme_api;

pub use error::{ApiError, ApiResult, SnapshotViolation};
pub use programme_api::ProgrammeApi;
