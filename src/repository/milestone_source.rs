// ==========================================
// 施工进度计划分析引擎 - 节点快照来源
// ==========================================
// 职责: 以异步方式读取项目节点快照
// 实现: SQLite 仓储 (阻塞读放入 spawn_blocking) / 内存快照
// ==========================================

use crate::domain::milestone::Milestone;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::milestone_repo::MilestoneRepository;
use async_trait::async_trait;
use std::collections::HashMap;

/// 节点快照来源
#[async_trait]
pub trait MilestoneSource: Send + Sync {
    /// 读取项目的全部节点
    ///
    /// 项目不存在时返回空列表 (由调用方决定是否视为错误)
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Vec<Milestone>>;
}

#[async_trait]
impl MilestoneSource for MilestoneRepository {
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Vec<Milestone>> {
        let repo = self.clone();
        let project_id = project_id.to_string();
        tokio::task::spawn_blocking(move || repo.find_by_project(&project_id))
            .await
            .map_err(|e| RepositoryError::InternalError(format!("快照读取任务失败: {}", e)))?
    }
}

// ==========================================
// InMemoryMilestoneSource - 内存快照
// ==========================================
/// 内存快照 (导入文件后直接分析时使用)
#[derive(Debug, Clone, Default)]
pub struct InMemoryMilestoneSource {
    by_project: HashMap<String, Vec<Milestone>>,
}

impl InMemoryMilestoneSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按 project_id 归组, 组内保持输入顺序
    pub fn from_milestones(milestones: Vec<Milestone>) -> Self {
        let mut source = Self::new();
        for m in milestones {
            source.by_project.entry(m.project_id.clone()).or_default().push(m);
        }
        source
    }

    pub fn project_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.by_project.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl MilestoneSource for InMemoryMilestoneSource {
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Vec<Milestone>> {
        Ok(self.by_project.get(project_id).cloned().unwrap_or_default())
    }
}
