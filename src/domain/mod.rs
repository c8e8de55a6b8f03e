// ==========================================
// 施工进度计划分析引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、分析结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod analysis;
pub mod milestone;
pub mod types;

// 重导出核心类型
pub use analysis::{
    ConflictParty, CriticalFlagDrift, CriticalPathResult, DependencyEdge, MilestoneHealth,
    IssuedReport, MilestoneIssues, ProgrammeReport, ResourceConflict, TemplateGap,
};
pub use milestone::Milestone;
pub use types::{MilestonePriority, MilestoneStatus, RiskLevel};
