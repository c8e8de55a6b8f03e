// ==========================================
// 施工进度计划分析引擎 - 引擎层
// ==========================================
// 职责: 实现进度分析规则, 不做任何 I/O
// 红线: 输入为只读快照, 所有提示必须可解释 (带节点名称)
// ==========================================

pub mod calendar;
pub mod conflict;
pub mod critical_path;
pub mod dependency;
pub mod health;
pub mod report;

// 重导出核心引擎
pub use conflict::{conflicts_for, ConflictDetector};
pub use critical_path::{CriticalPathAnalyzer, DependencyGraph};
pub use dependency::{DependencyValidator, MilestoneIndex};
pub use health::HealthScorer;
pub use report::{overall_health, ReportEngine};
