// ==========================================
// 施工进度计划分析引擎 - 行业模板目录
// ==========================================
// 职责: 行业标准节点模板 (只读配置对象)
// 红线: 通过参数注入, 不作为全局状态
// ==========================================

use crate::domain::milestone::Milestone;
use crate::domain::types::{MilestonePriority, MilestoneStatus};
use crate::engine::calendar::shift_days;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 模板节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMilestone {
    pub key: String,      // 模板内唯一键
    pub name: String,     // 节点名称
    pub category: String, // 分类
    #[serde(default)]
    pub trade: Option<String>,
    pub typical_duration_days: i64,
    #[serde(default)]
    pub depends_on: Vec<String>, // 模板内前置键
    #[serde(default)]
    pub priority: MilestonePriority,
}

// ==========================================
// TemplateCatalog - 模板目录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCatalog {
    pub name: String,
    pub milestones: Vec<TemplateMilestone>,
}

impl TemplateCatalog {
    /// 从 JSON 字符串加载
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json_str(&raw)?)
    }

    /// 住宅类项目标准模板
    pub fn standard_residential() -> Self {
        let entry = |key: &str,
                     name: &str,
                     category: &str,
                     trade: Option<&str>,
                     days: i64,
                     depends_on: &[&str],
                     priority: MilestonePriority| TemplateMilestone {
            key: key.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            trade: trade.map(str::to_string),
            typical_duration_days: days,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            priority,
        };

        Self {
            name: "Standard Residential".to_string(),
            milestones: vec![
                entry("site-setup", "Site Setup", "Preliminaries", Some("General"), 5, &[], MilestonePriority::Medium),
                entry("foundations", "Foundations", "Substructure", Some("Groundworks"), 15, &["site-setup"], MilestonePriority::High),
                entry("frame", "Frame Erection", "Superstructure", Some("Carpentry"), 20, &["foundations"], MilestonePriority::High),
                entry("roof", "Roof Weathertight", "Envelope", Some("Roofing"), 10, &["frame"], MilestonePriority::High),
                entry("first-fix", "First Fix Services", "Services", Some("Electrical"), 12, &["roof"], MilestonePriority::Medium),
                entry("plaster", "Plastering", "Finishes", Some("Plastering"), 10, &["first-fix"], MilestonePriority::Medium),
                entry("second-fix", "Second Fix Services", "Services", Some("Electrical"), 8, &["plaster"], MilestonePriority::Medium),
                entry("handover", "Practical Completion", "Handover", Some("General"), 1, &["second-fix"], MilestonePriority::High),
            ],
        }
    }

    /// 按模板为新项目生成节点
    ///
    /// 各节点按模板依赖顺次排布: 开始 = 前置最晚结束 + 1 天,
    /// 无前置则为项目开始日期
    pub fn instantiate(&self, project_id: &str, project_start: NaiveDate) -> Vec<Milestone> {
        let mut ends: std::collections::HashMap<&str, NaiveDate> = std::collections::HashMap::new();
        let mut result = Vec::with_capacity(self.milestones.len());

        for entry in &self.milestones {
            // 模板前置键可能指向尚未排布的节点, 此时忽略该约束
            let start = entry
                .depends_on
                .iter()
                .filter_map(|k| ends.get(k.as_str()).copied())
                .max()
                .map(|end| shift_days(end, 1))
                .unwrap_or(project_start);
            let end = shift_days(start, entry.typical_duration_days.max(1));
            ends.insert(entry.key.as_str(), end);

            let mut milestone = Milestone::new(
                format!("{}-{}", project_id, entry.key),
                project_id,
                entry.name.clone(),
            );
            milestone.planned_start = Some(start);
            milestone.planned_end = Some(end);
            milestone.status = MilestoneStatus::Upcoming;
            milestone.priority = entry.priority;
            milestone.category = Some(entry.category.clone());
            milestone.trade = entry.trade.clone();
            milestone.dependencies = entry
                .depends_on
                .iter()
                .map(|k| format!("{}-{}", project_id, k))
                .collect();
            result.push(milestone);
        }

        result
    }

    /// 判断计划中是否已包含模板节点 (名称忽略大小写, 或分类+工种一致)
    pub fn is_covered(entry: &TemplateMilestone, milestones: &[Milestone]) -> bool {
        let name = entry.name.trim().to_lowercase();
        milestones.iter().any(|m| {
            if m.name.trim().to_lowercase() == name {
                return true;
            }
            let same_category = m
                .category
                .as_deref()
                .map(|c| c.trim().eq_ignore_ascii_case(entry.category.trim()))
                .unwrap_or(false);
            let same_trade = match (m.trade_key(), entry.trade.as_deref()) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b.trim()),
                (None, None) => true,
                _ => false,
            };
            same_category && same_trade
        })
    }
}
