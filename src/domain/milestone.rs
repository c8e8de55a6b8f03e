// ==========================================
// 施工进度计划分析引擎 - 进度节点领域模型
// ==========================================
// 职责: 定义进度节点 (Milestone) 实体
// 红线: 引擎只读快照, 派生数据不回写实体
// ==========================================

use crate::domain::types::{MilestonePriority, MilestoneStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Milestone - 进度节点
// ==========================================
// 日期口径: 结束日期为开区间 [start, end)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    // ===== 标识 =====
    pub id: String,         // 节点ID (不透明字符串)
    pub project_id: String, // 所属项目
    pub name: String,       // 节点名称 (所有提示信息使用)

    // ===== 计划日期 =====
    #[serde(default)]
    pub planned_start: Option<NaiveDate>, // 计划开始
    #[serde(default)]
    pub planned_end: Option<NaiveDate>, // 计划结束 (开区间)
    #[serde(default)]
    pub planned_date: Option<NaiveDate>, // 单点日期 (无 planned_end 时兼作起止)
    #[serde(default)]
    pub completion_percentage: u8, // 完成度 0..=100

    // ===== 分类 =====
    pub status: MilestoneStatus,
    #[serde(default)]
    pub priority: MilestonePriority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub trade: Option<String>, // 工种 (资源冲突分组)

    // ===== 依赖图 =====
    #[serde(default)]
    pub dependencies: Vec<String>, // 前置节点ID
    #[serde(default)]
    pub critical_path: bool, // 关键路径标记 (人工或计算)
    #[serde(default)]
    pub delay_risk_flag: bool, // 延误风险标记

    // ===== 归属 =====
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl Milestone {
    /// 创建最小节点 (其余字段取默认值)
    pub fn new(id: impl Into<String>, project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            planned_start: None,
            planned_end: None,
            planned_date: None,
            completion_percentage: 0,
            status: MilestoneStatus::Upcoming,
            priority: MilestonePriority::Medium,
            category: None,
            trade: None,
            dependencies: Vec::new(),
            critical_path: false,
            delay_risk_flag: false,
            assigned_to: None,
        }
    }

    /// 生效开始日期: planned_start, 缺失时退化为 planned_date
    pub fn effective_start(&self) -> Option<NaiveDate> {
        self.planned_start.or(self.planned_date)
    }

    /// 生效结束日期: planned_end, 缺失时退化为 planned_date
    pub fn effective_end(&self) -> Option<NaiveDate> {
        self.planned_end.or(self.planned_date)
    }

    /// 截止日期 (健康度逾期判定使用)
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.planned_end.or(self.planned_date)
    }

    /// 生效起止均已知
    pub fn has_bounds(&self) -> bool {
        self.effective_start().is_some() && self.effective_end().is_some()
    }

    /// 去重后的依赖列表 (保持原顺序)
    pub fn unique_dependencies(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.dependencies
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty() && seen.insert(*d))
            .collect()
    }

    /// 工种分组键 (空白视为未指定)
    pub fn trade_key(&self) -> Option<&str> {
        self.trade.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}
