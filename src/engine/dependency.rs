// ==========================================
// 施工进度计划分析引擎 - 依赖校验引擎
// ==========================================
// 职责: 单节点日期/依赖一致性校验 + 建议开始日期
// 输入: 目标节点 + 全量节点快照
// 输出: 提示文本 (不阻断保存, 由调用方决定是否拦截)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::milestone::Milestone;
use crate::i18n::t_in;
use crate::engine::calendar::shift_days;
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// MilestoneIndex - 节点ID索引
// ==========================================
// 每次分析构建一次, 避免逐条线性查找
// 重复ID以首次出现为准
pub struct MilestoneIndex<'a> {
    by_id: HashMap<&'a str, &'a Milestone>,
}

impl<'a> MilestoneIndex<'a> {
    pub fn build(milestones: &'a [Milestone]) -> Self {
        let mut by_id = HashMap::with_capacity(milestones.len());
        for m in milestones {
            by_id.entry(m.id.as_str()).or_insert(m);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Milestone> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// ==========================================
// DependencyValidator - 依赖校验引擎
// ==========================================
pub struct DependencyValidator<'a> {
    config: &'a EngineConfig,
}

impl<'a> DependencyValidator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 校验单个节点
    ///
    /// 规则:
    /// 1) planned_start 与 planned_end 均存在且 start >= end
    /// 2) 前置节点结束日期 >= 本节点开始日期
    /// 另: 自依赖 / 未知前置ID 同样给出提示, 但不构成约束
    pub fn validate(&self, milestone: &Milestone, all: &[Milestone]) -> Vec<String> {
        let index = MilestoneIndex::build(all);
        self.validate_with_index(milestone, &index)
    }

    /// 使用预构建索引校验 (批量校验时复用索引)
    pub fn validate_with_index(&self, milestone: &Milestone, index: &MilestoneIndex<'_>) -> Vec<String> {
        let locale = self.config.locale.as_str();
        let mut issues = Vec::new();

        // 规则 1: 起止顺序
        if let (Some(start), Some(end)) = (milestone.planned_start, milestone.planned_end) {
            if start >= end {
                issues.push(t_in(
                    locale,
                    "validation.start_not_before_end",
                    &[
                        ("name", milestone.name.as_str()),
                        ("start", start.to_string().as_str()),
                        ("end", end.to_string().as_str()),
                    ],
                ));
            }
        }

        // 规则 2: 前置节点必须先完成
        let own_start = milestone.effective_start();
        for dep_id in milestone.unique_dependencies() {
            if dep_id == milestone.id {
                issues.push(t_in(
                    locale,
                    "validation.self_dependency",
                    &[("name", milestone.name.as_str())],
                ));
                continue;
            }

            let Some(dependency) = index.get(dep_id) else {
                issues.push(t_in(
                    locale,
                    "validation.unknown_dependency",
                    &[("name", milestone.name.as_str()), ("dependency_id", dep_id)],
                ));
                continue;
            };

            if let (Some(dep_end), Some(start)) = (dependency.effective_end(), own_start) {
                if dep_end >= start {
                    issues.push(t_in(
                        locale,
                        "validation.dependency_overlap",
                        &[
                            ("name", milestone.name.as_str()),
                            ("start", start.to_string().as_str()),
                            ("dependency", dependency.name.as_str()),
                            ("dependency_end", dep_end.to_string().as_str()),
                        ],
                    ));
                }
            }
        }

        issues
    }

    /// 建议开始日期
    ///
    /// - 无依赖: 节点自身开始日期, 缺失则为今天
    /// - 有依赖: 前置节点最晚结束日期 + 缓冲天数
    /// - 无结束日期或无法解析的前置不参与计算
    pub fn suggest_optimal_start(
        &self,
        milestone: &Milestone,
        all: &[Milestone],
        today: NaiveDate,
    ) -> NaiveDate {
        let index = MilestoneIndex::build(all);
        self.suggest_optimal_start_with_index(milestone, &index, today)
    }

    pub fn suggest_optimal_start_with_index(
        &self,
        milestone: &Milestone,
        index: &MilestoneIndex<'_>,
        today: NaiveDate,
    ) -> NaiveDate {
        let fallback = milestone.effective_start().unwrap_or(today);

        let latest_end = milestone
            .unique_dependencies()
            .into_iter()
            .filter(|dep_id| *dep_id != milestone.id)
            .filter_map(|dep_id| index.get(dep_id))
            .filter_map(|dep| dep.effective_end())
            .max();

        match latest_end {
            Some(end) => shift_days(end, self.config.dependency_buffer_days),
            None => fallback,
        }
    }
}
