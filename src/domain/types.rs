// ==========================================
// 施工进度计划分析引擎 - 领域类型定义
// ==========================================
// 红线: 状态/优先级为封闭枚举, 所有分支必须显式处理
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 节点状态 (Milestone Status)
// ==========================================
// 序列化格式: kebab-case (与前端/存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Upcoming,   // 未开始
    InProgress, // 进行中
    Complete,   // 已完成
    Delayed,    // 已延误
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestoneStatus::Upcoming => write!(f, "upcoming"),
            MilestoneStatus::InProgress => write!(f, "in-progress"),
            MilestoneStatus::Complete => write!(f, "complete"),
            MilestoneStatus::Delayed => write!(f, "delayed"),
        }
    }
}

impl MilestoneStatus {
    /// 从字符串解析状态
    ///
    /// 兼容: 大小写 / 下划线 / 空格 / 常见别名
    /// 无法识别时返回 None (由调用方决定如何报错)
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "upcoming" | "not-started" | "planned" => Some(MilestoneStatus::Upcoming),
            "in-progress" | "inprogress" | "active" | "started" => {
                Some(MilestoneStatus::InProgress)
            }
            "complete" | "completed" | "done" => Some(MilestoneStatus::Complete),
            "delayed" | "late" | "overdue" => Some(MilestoneStatus::Delayed),
            _ => None,
        }
    }
}

// ==========================================
// 节点优先级 (Milestone Priority)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestonePriority {
    Low,    // 低
    Medium, // 中
    High,   // 高
}

impl Default for MilestonePriority {
    fn default() -> Self {
        MilestonePriority::Medium
    }
}

impl fmt::Display for MilestonePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MilestonePriority::Low => write!(f, "low"),
            MilestonePriority::Medium => write!(f, "medium"),
            MilestonePriority::High => write!(f, "high"),
        }
    }
}

impl MilestonePriority {
    /// 从字符串解析优先级
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Some(MilestonePriority::Low),
            "medium" | "med" | "normal" | "m" => Some(MilestonePriority::Medium),
            "high" | "h" | "critical" => Some(MilestonePriority::High),
            _ => None,
        }
    }
}

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 由健康度分段得出
// 顺序: Green < Yellow < Orange < Red
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Green,  // 正常
    Yellow, // 关注
    Orange, // 紧张
    Red,    // 危险
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Green => write!(f, "GREEN"),
            RiskLevel::Yellow => write!(f, "YELLOW"),
            RiskLevel::Orange => write!(f, "ORANGE"),
            RiskLevel::Red => write!(f, "RED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_aliases() {
        assert_eq!(MilestoneStatus::parse("In Progress"), Some(MilestoneStatus::InProgress));
        assert_eq!(MilestoneStatus::parse("in_progress"), Some(MilestoneStatus::InProgress));
        assert_eq!(MilestoneStatus::parse("COMPLETED"), Some(MilestoneStatus::Complete));
        assert_eq!(MilestoneStatus::parse("delayed"), Some(MilestoneStatus::Delayed));
        assert_eq!(MilestoneStatus::parse("blocked"), None);
    }

    #[test]
    fn test_status_serde_kebab_case() {
        let json = serde_json::to_string(&MilestoneStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let parsed: MilestoneStatus = serde_json::from_str("\"upcoming\"").unwrap();
        assert_eq!(parsed, MilestoneStatus::Upcoming);
    }

    #[test]
    fn test_priority_order() {
        assert!(MilestonePriority::Low < MilestonePriority::Medium);
        assert!(MilestonePriority::Medium < MilestonePriority::High);
        assert_eq!(MilestonePriority::parse(" HIGH "), Some(MilestonePriority::High));
    }

    #[test]
    fn test_risk_level_order() {
        assert!(RiskLevel::Green < RiskLevel::Red);
        assert_eq!(RiskLevel::Orange.to_string(), "ORANGE");
    }
}
