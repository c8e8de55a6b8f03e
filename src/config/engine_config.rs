// ==========================================
// 施工进度计划分析引擎 - 引擎参数
// ==========================================
// 职责: 健康度扣分 / 阈值 / 依赖缓冲 / 默认工种 / 语言
// 来源: 默认值 + config_kv 覆写 (见 ConfigManager)
// ==========================================

use crate::domain::types::RiskLevel;
use serde::{Deserialize, Serialize};

/// 健康度扣分项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDeductions {
    pub delayed: u8,      // 状态为延误
    pub risk_flag: u8,    // 延误风险标记
    pub overdue: u8,      // 截止日期已过
    pub low_progress: u8, // 进行中且完成度偏低
}

impl Default for HealthDeductions {
    fn default() -> Self {
        Self {
            delayed: 30,
            risk_flag: 20,
            overdue: 25,
            low_progress: 15,
        }
    }
}

/// 健康度分段阈值 (分数 >= 阈值即落入该等级)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthLevelThresholds {
    pub green: u8,
    pub yellow: u8,
    pub orange: u8,
}

impl Default for HealthLevelThresholds {
    fn default() -> Self {
        Self {
            green: 80,
            yellow: 60,
            orange: 40,
        }
    }
}

impl HealthLevelThresholds {
    pub fn classify(&self, score: u8) -> RiskLevel {
        if score >= self.green {
            RiskLevel::Green
        } else if score >= self.yellow {
            RiskLevel::Yellow
        } else if score >= self.orange {
            RiskLevel::Orange
        } else {
            RiskLevel::Red
        }
    }
}

// ==========================================
// EngineConfig - 引擎参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub deductions: HealthDeductions,
    pub levels: HealthLevelThresholds,
    /// 进行中节点完成度低于该值视为进度偏低
    pub low_progress_threshold: u8,
    /// 建议开始日期 = 前置最晚结束 + 缓冲天数
    pub dependency_buffer_days: i64,
    /// 未指定工种的节点归入该分组
    pub default_trade: String,
    /// 提示信息语言 ("en" / "zh-CN")
    pub locale: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deductions: HealthDeductions::default(),
            levels: HealthLevelThresholds::default(),
            low_progress_threshold: 50,
            dependency_buffer_days: 1,
            default_trade: "General".to_string(),
            locale: "en".to_string(),
        }
    }
}

impl EngineConfig {
    /// 切换提示语言
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::default();
        assert_eq!(config.deductions.delayed, 30);
        assert_eq!(config.deductions.risk_flag, 20);
        assert_eq!(config.deductions.overdue, 25);
        assert_eq!(config.deductions.low_progress, 15);
        assert_eq!(config.low_progress_threshold, 50);
        assert_eq!(config.dependency_buffer_days, 1);
        assert_eq!(config.default_trade, "General");
        assert_eq!(config.locale, "en");
    }

    #[test]
    fn test_classify_boundaries() {
        let levels = HealthLevelThresholds::default();
        assert_eq!(levels.classify(100), RiskLevel::Green);
        assert_eq!(levels.classify(80), RiskLevel::Green);
        assert_eq!(levels.classify(79), RiskLevel::Yellow);
        assert_eq!(levels.classify(60), RiskLevel::Yellow);
        assert_eq!(levels.classify(40), RiskLevel::Orange);
        assert_eq!(levels.classify(39), RiskLevel::Red);
        assert_eq!(levels.classify(0), RiskLevel::Red);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"deductions": {"delayed": 40}, "locale": "zh-CN"}"#).unwrap();
        assert_eq!(config.deductions.delayed, 40);
        assert_eq!(config.deductions.overdue, 25);
        assert_eq!(config.locale, "zh-CN");
        assert_eq!(config.default_trade, "General");
    }
}
