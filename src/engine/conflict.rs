// ==========================================
// 施工进度计划分析引擎 - 资源冲突检测引擎
// ==========================================
// 职责: 同一工种内的日期重叠 (人力重复占用)
// 算法: 按工种分组, 组内两两比较 (i < j)
// 规模: 单项目节点数为几十到几百, O(n²) 足够
// ==========================================

use crate::config::EngineConfig;
use crate::domain::analysis::{ConflictParty, ResourceConflict};
use crate::domain::milestone::Milestone;
use crate::engine::calendar::{days_between, overlap_range};
use tracing::instrument;

// ==========================================
// ConflictDetector - 资源冲突检测引擎
// ==========================================
pub struct ConflictDetector<'a> {
    config: &'a EngineConfig,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 检测资源冲突
    ///
    /// - 无工种的节点归入默认分组
    /// - 分组按首次出现顺序遍历, 组内按输入顺序配对
    /// - 起止不完整的节点不参与比较
    #[instrument(skip(self, milestones), fields(count = milestones.len()))]
    pub fn detect_resource_conflicts(&self, milestones: &[Milestone]) -> Vec<ResourceConflict> {
        let groups = self.group_by_trade(milestones);
        let mut conflicts = Vec::new();

        for (trade, members) in &groups {
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    if let Some(conflict) = Self::pair_conflict(trade, a, b) {
                        conflicts.push(conflict);
                    }
                }
            }
        }

        tracing::debug!(
            groups = groups.len(),
            conflicts = conflicts.len(),
            "资源冲突检测完成"
        );
        conflicts
    }

    /// 按工种分组 (保持首次出现顺序)
    fn group_by_trade<'m>(&self, milestones: &'m [Milestone]) -> Vec<(String, Vec<&'m Milestone>)> {
        let mut groups: Vec<(String, Vec<&'m Milestone>)> = Vec::new();

        for m in milestones.iter().filter(|m| m.has_bounds()) {
            let trade = m.trade_key().unwrap_or(self.config.default_trade.as_str());
            match groups.iter_mut().find(|(t, _)| t == trade) {
                Some((_, members)) => members.push(m),
                None => groups.push((trade.to_string(), vec![m])),
            }
        }

        groups
    }

    fn pair_conflict(trade: &str, a: &Milestone, b: &Milestone) -> Option<ResourceConflict> {
        // 同一ID的重复记录不视为冲突
        if a.id == b.id {
            return None;
        }

        let (start_a, end_a) = (a.effective_start()?, a.effective_end()?);
        let (start_b, end_b) = (b.effective_start()?, b.effective_end()?);
        let (overlap_start, overlap_end) = overlap_range(start_a, end_a, start_b, end_b)?;

        Some(ResourceConflict {
            trade: trade.to_string(),
            first: ConflictParty {
                milestone_id: a.id.clone(),
                name: a.name.clone(),
            },
            second: ConflictParty {
                milestone_id: b.id.clone(),
                name: b.name.clone(),
            },
            overlap_days: days_between(overlap_start, overlap_end),
            overlap_start,
            overlap_end,
        })
    }
}

/// 过滤出涉及指定节点的冲突
pub fn conflicts_for<'c>(conflicts: &'c [ResourceConflict], milestone_id: &str) -> Vec<&'c ResourceConflict> {
    conflicts.iter().filter(|c| c.involves(milestone_id)).collect()
}
