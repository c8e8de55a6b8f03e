// ==========================================
// 施工进度计划分析引擎 - 关键路径分析引擎
// ==========================================
// 职责: 依赖图构建 + 最长路径 (关键路径) + 风险提示
// 算法:
// 1) 每次分析构建一次邻接表 (节点 -> 前置节点)
// 2) 迭代式 DFS 标记 (未访问/访问中/已完成), 指向"访问中"节点的边即成环边, 剔除并记录
// 3) DFS 后序即拓扑序, 按序计算最早完成时间 ef = 工期 + max(前置 ef)
// 4) ef 最大者为终点, 沿最优前置回溯得到关键路径
// 红线: 成环不得死循环/栈溢出, 只剔除成环边并给出风险提示
// ==========================================

use crate::config::EngineConfig;
use crate::domain::analysis::{CriticalFlagDrift, CriticalPathResult, DependencyEdge};
use crate::domain::milestone::Milestone;
use crate::domain::types::MilestoneStatus;
use crate::engine::calendar::milestone_duration_days;
use crate::i18n::t_in;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

// ==========================================
// DependencyGraph - 依赖图
// ==========================================
pub struct DependencyGraph<'m> {
    nodes: Vec<&'m Milestone>,
    prerequisites: Vec<Vec<usize>>, // 保留的前置边 (按依赖列表顺序)
    excluded: Vec<(usize, usize)>,  // 成环被剔除的边 (prerequisite, dependent)
    order: Vec<usize>,              // 拓扑序 (前置在前)
}

impl<'m> DependencyGraph<'m> {
    /// 构建依赖图
    ///
    /// - 重复ID以首次出现为准
    /// - 未知前置ID直接丢弃
    /// - 自依赖按成环处理
    pub fn build(milestones: &'m [Milestone]) -> Self {
        let mut nodes: Vec<&'m Milestone> = Vec::with_capacity(milestones.len());
        let mut index: HashMap<&'m str, usize> = HashMap::with_capacity(milestones.len());
        for m in milestones {
            if !index.contains_key(m.id.as_str()) {
                index.insert(m.id.as_str(), nodes.len());
                nodes.push(m);
            }
        }

        let raw: Vec<Vec<usize>> = nodes
            .iter()
            .map(|m| {
                m.unique_dependencies()
                    .into_iter()
                    .filter_map(|dep| index.get(dep).copied())
                    .collect()
            })
            .collect();

        let (prerequisites, excluded, order) = Self::break_cycles(&raw);

        Self {
            nodes,
            prerequisites,
            excluded,
            order,
        }
    }

    /// 迭代式 DFS: 剔除成环边, 同时产出拓扑序
    #[allow(clippy::type_complexity)]
    fn break_cycles(raw: &[Vec<usize>]) -> (Vec<Vec<usize>>, Vec<(usize, usize)>, Vec<usize>) {
        let n = raw.len();
        let mut state = vec![VisitState::Unvisited; n];
        let mut kept: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut excluded = Vec::new();
        let mut order = Vec::with_capacity(n);

        for root in 0..n {
            if state[root] != VisitState::Unvisited {
                continue;
            }
            state[root] = VisitState::InProgress;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                if top.1 < raw[node].len() {
                    let prerequisite = raw[node][top.1];
                    top.1 += 1;

                    match state[prerequisite] {
                        VisitState::Unvisited => {
                            kept[node].push(prerequisite);
                            state[prerequisite] = VisitState::InProgress;
                            stack.push((prerequisite, 0));
                        }
                        VisitState::InProgress => {
                            excluded.push((prerequisite, node));
                        }
                        VisitState::Done => {
                            kept[node].push(prerequisite);
                        }
                    }
                } else {
                    state[node] = VisitState::Done;
                    order.push(node);
                    stack.pop();
                }
            }
        }

        (kept, excluded, order)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 拓扑序 (前置在前)
    pub fn topological_order(&self) -> Vec<&'m str> {
        self.order.iter().map(|&i| self.nodes[i].id.as_str()).collect()
    }

    /// 成环被剔除的依赖边
    pub fn excluded_edges(&self) -> Vec<DependencyEdge> {
        self.excluded
            .iter()
            .map(|&(p, d)| DependencyEdge {
                prerequisite: self.nodes[p].id.clone(),
                dependent: self.nodes[d].id.clone(),
            })
            .collect()
    }
}

// ==========================================
// CriticalPathAnalyzer - 关键路径分析引擎
// ==========================================
pub struct CriticalPathAnalyzer<'a> {
    config: &'a EngineConfig,
}

impl<'a> CriticalPathAnalyzer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 关键路径分析
    ///
    /// 空集合返回空路径, 工期为 0
    #[instrument(skip(self, milestones), fields(count = milestones.len()))]
    pub fn analyze(&self, milestones: &[Milestone]) -> CriticalPathResult {
        let graph = DependencyGraph::build(milestones);
        if graph.is_empty() {
            return CriticalPathResult::default();
        }

        let (path, duration_days) = Self::longest_path(&graph);

        let mut risk_factors = Vec::new();
        let mut suggestions = Vec::new();
        self.collect_cycle_risks(&graph, &mut risk_factors, &mut suggestions);
        for &i in &path {
            self.collect_milestone_risks(graph.nodes[i], &mut risk_factors, &mut suggestions);
        }

        if !graph.excluded.is_empty() {
            tracing::warn!(
                excluded = graph.excluded.len(),
                "依赖图存在环, 已剔除成环依赖"
            );
        }
        tracing::debug!(
            path_len = path.len(),
            duration_days,
            risks = risk_factors.len(),
            "关键路径分析完成"
        );

        CriticalPathResult {
            path: path.iter().map(|&i| graph.nodes[i].id.clone()).collect(),
            duration_days,
            risk_factors,
            suggestions,
            excluded_edges: graph.excluded_edges(),
        }
    }

    /// 最长路径: 返回 (路径节点下标, 总工期)
    fn longest_path(graph: &DependencyGraph<'_>) -> (Vec<usize>, i64) {
        let n = graph.len();
        let mut earliest_finish = vec![0i64; n];
        let mut best_prerequisite: Vec<Option<usize>> = vec![None; n];

        for &node in &graph.order {
            let mut start = 0i64;
            for &p in &graph.prerequisites[node] {
                // 并列时取依赖列表中靠前者
                if earliest_finish[p] > start {
                    start = earliest_finish[p];
                    best_prerequisite[node] = Some(p);
                }
            }
            earliest_finish[node] = start + milestone_duration_days(graph.nodes[node]);
        }

        // 终点: ef 最大者, 并列取输入顺序靠前者
        let mut terminus = 0;
        for i in 1..n {
            if earliest_finish[i] > earliest_finish[terminus] {
                terminus = i;
            }
        }

        let mut path = vec![terminus];
        let mut cursor = terminus;
        while let Some(p) = best_prerequisite[cursor] {
            path.push(p);
            cursor = p;
        }
        path.reverse();

        (path, earliest_finish[terminus])
    }

    fn collect_cycle_risks(
        &self,
        graph: &DependencyGraph<'_>,
        risk_factors: &mut Vec<String>,
        suggestions: &mut Vec<String>,
    ) {
        let locale = self.config.locale.as_str();
        for &(p, d) in &graph.excluded {
            let args = [
                ("dependent", graph.nodes[d].name.as_str()),
                ("prerequisite", graph.nodes[p].name.as_str()),
            ];
            risk_factors.push(t_in(locale, "critical_path.risk.cycle", &args));
            suggestions.push(t_in(locale, "critical_path.suggestion.review_cycle", &args));
        }
    }

    /// 关键路径节点风险 (风险与建议一一对应)
    fn collect_milestone_risks(
        &self,
        milestone: &Milestone,
        risk_factors: &mut Vec<String>,
        suggestions: &mut Vec<String>,
    ) {
        let locale = self.config.locale.as_str();
        let name = [("name", milestone.name.as_str())];

        let (is_delayed, is_active) = match milestone.status {
            MilestoneStatus::Delayed => (true, false),
            MilestoneStatus::InProgress => (false, true),
            MilestoneStatus::Upcoming | MilestoneStatus::Complete => (false, false),
        };

        if is_delayed {
            risk_factors.push(t_in(locale, "critical_path.risk.delayed", &name));
            suggestions.push(t_in(locale, "critical_path.suggestion.expedite", &name));
        }

        if milestone.delay_risk_flag {
            risk_factors.push(t_in(locale, "critical_path.risk.flagged", &name));
            suggestions.push(t_in(locale, "critical_path.suggestion.buffer", &name));
        }

        if is_active && milestone.completion_percentage < self.config.low_progress_threshold {
            let completion = milestone.completion_percentage.to_string();
            risk_factors.push(t_in(
                locale,
                "critical_path.risk.low_progress",
                &[("name", milestone.name.as_str()), ("completion", completion.as_str())],
            ));
            suggestions.push(t_in(locale, "critical_path.suggestion.resourcing", &name));
        }
    }

    /// 关键路径标记偏差: 人工标记与计算结果不一致的节点
    ///
    /// 快照中无任何人工标记时视为未维护标记, 不报告偏差
    pub fn flag_drift(milestones: &[Milestone], result: &CriticalPathResult) -> Vec<CriticalFlagDrift> {
        if !milestones.iter().any(|m| m.critical_path) {
            return Vec::new();
        }

        let critical = result.critical_ids();
        let mut seen = std::collections::HashSet::new();

        milestones
            .iter()
            .filter(|m| seen.insert(m.id.as_str()))
            .filter_map(|m| {
                let computed = critical.contains(m.id.as_str());
                (m.critical_path != computed).then(|| CriticalFlagDrift {
                    milestone_id: m.id.clone(),
                    name: m.name.clone(),
                    flagged: m.critical_path,
                    computed,
                })
            })
            .collect()
    }
}
