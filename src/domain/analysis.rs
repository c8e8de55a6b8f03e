// ==========================================
// 施工进度计划分析引擎 - 分析结果领域模型
// ==========================================
// 用途: 引擎输出的只读结果对象, 供展示层/报表消费
// 红线: 所有结果独立于 Milestone 实体返回, 不回写
// ==========================================

use crate::domain::types::RiskLevel;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ==========================================
// ResourceConflict - 资源 (工种) 冲突
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictParty {
    pub milestone_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConflict {
    pub trade: String,          // 工种分组
    pub first: ConflictParty,   // 输入顺序靠前的节点
    pub second: ConflictParty,  // 输入顺序靠后的节点
    pub overlap_days: i64,      // 重叠天数 (> 0)
    pub overlap_start: NaiveDate, // 重叠区间开始
    pub overlap_end: NaiveDate,   // 重叠区间结束 (开区间)
}

impl ResourceConflict {
    /// 是否涉及指定节点
    pub fn involves(&self, milestone_id: &str) -> bool {
        self.first.milestone_id == milestone_id || self.second.milestone_id == milestone_id
    }
}

// ==========================================
// CriticalPathResult - 关键路径分析结果
// ==========================================

/// 依赖边: prerequisite -> dependent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub prerequisite: String,
    pub dependent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResult {
    pub path: Vec<String>,              // 关键路径节点ID (执行顺序)
    pub duration_days: i64,             // 关键路径总工期
    pub risk_factors: Vec<String>,      // 风险因素
    pub suggestions: Vec<String>,       // 建议 (与 risk_factors 一一对应)
    pub excluded_edges: Vec<DependencyEdge>, // 因成环被剔除的依赖
}

impl CriticalPathResult {
    /// 关键路径节点集合
    pub fn critical_ids(&self) -> HashSet<&str> {
        self.path.iter().map(String::as_str).collect()
    }

    pub fn is_critical(&self, milestone_id: &str) -> bool {
        self.path.iter().any(|id| id == milestone_id)
    }

    pub fn has_cycles(&self) -> bool {
        !self.excluded_edges.is_empty()
    }
}

// ==========================================
// MilestoneHealth - 单节点健康度
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneHealth {
    pub milestone_id: String,
    pub name: String,
    pub score: u8,            // 0..=100
    pub level: RiskLevel,     // 分段等级
    pub reasons: Vec<String>, // 扣分原因 (可解释性)
}

// ==========================================
// ProgrammeReport - 进度计划综合报告
// ==========================================

/// 单节点校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneIssues {
    pub name: String,
    pub issues: Vec<String>,
}

/// 关键路径标记偏差: 人工标记与计算结果不一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalFlagDrift {
    pub milestone_id: String,
    pub name: String,
    pub flagged: bool,  // 人工标记
    pub computed: bool, // 计算结果
}

/// 模板缺项: 行业模板中存在但计划中缺失的节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateGap {
    pub template_name: String,
    pub milestone_name: String,
    pub category: String,
}

/// 综合报告 (相同输入 + 相同分析日期 -> 相同报告)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammeReport {
    // ===== 元数据 =====
    pub as_of: NaiveDate,
    pub milestone_count: usize,

    // ===== 核心指标 =====
    pub overall_health_percent: u8,
    pub conflicts: Vec<ResourceConflict>,
    pub critical_path: CriticalPathResult,
    pub per_milestone_issues: BTreeMap<String, MilestoneIssues>,

    // ===== 扩展指标 =====
    pub health: Vec<MilestoneHealth>,
    pub critical_flag_drift: Vec<CriticalFlagDrift>,
    pub template_gaps: Vec<TemplateGap>,
}

impl ProgrammeReport {
    /// 红色等级节点数
    pub fn red_count(&self) -> usize {
        self.health
            .iter()
            .filter(|h| h.level == RiskLevel::Red)
            .count()
    }

    /// 存在校验问题的节点数
    pub fn issue_count(&self) -> usize {
        self.per_milestone_issues
            .values()
            .map(|i| i.issues.len())
            .sum()
    }
}

// ==========================================
// IssuedReport - 对外发布的报告
// ==========================================
/// 报告发布信封: 报告ID与生成时间在发布时附加, 不进入引擎计算
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedReport {
    pub report_id: String,
    pub generated_at: NaiveDateTime,
    #[serde(flatten)]
    pub report: ProgrammeReport,
}

impl IssuedReport {
    pub fn new(report_id: impl Into<String>, generated_at: NaiveDateTime, report: ProgrammeReport) -> Self {
        Self {
            report_id: report_id.into(),
            generated_at,
            report,
        }
    }
}
