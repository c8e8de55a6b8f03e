// ==========================================
// 施工进度计划分析引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供节点快照访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod milestone_repo;
pub mod milestone_source;

pub use error::{RepositoryError, RepositoryResult};
pub use milestone_repo::MilestoneRepository;
pub use milestone_source::{InMemoryMilestoneSource, MilestoneSource};
