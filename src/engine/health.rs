// ==========================================
// 施工进度计划分析引擎 - 健康度评分引擎
// ==========================================
// 规则 (从 100 起扣, 可叠加):
// - 状态为延误        -30
// - 延误风险标记      -20
// - 截止日期已过      -25
// - 进行中且完成度<50 -15
// - 下限 0
// - 已完成: 强制 100 (优先于以上所有规则)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::analysis::MilestoneHealth;
use crate::domain::milestone::Milestone;
use crate::domain::types::{MilestoneStatus, RiskLevel};
use crate::engine::calendar::is_overdue;
use crate::i18n::t_in;
use chrono::NaiveDate;

const FULL_SCORE: i32 = 100;

// ==========================================
// HealthScorer - 健康度评分引擎
// ==========================================
pub struct HealthScorer<'a> {
    config: &'a EngineConfig,
}

impl<'a> HealthScorer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 计算健康度 (0..=100)
    pub fn score(&self, milestone: &Milestone, today: NaiveDate) -> u8 {
        self.evaluate(milestone, today).0
    }

    /// 分数对应的风险等级
    pub fn classify(&self, score: u8) -> RiskLevel {
        self.config.levels.classify(score)
    }

    /// 完整评估: 分数 + 等级 + 扣分原因
    pub fn assess(&self, milestone: &Milestone, today: NaiveDate) -> MilestoneHealth {
        let (score, reasons) = self.evaluate(milestone, today);
        MilestoneHealth {
            milestone_id: milestone.id.clone(),
            name: milestone.name.clone(),
            score,
            level: self.classify(score),
            reasons,
        }
    }

    fn evaluate(&self, milestone: &Milestone, today: NaiveDate) -> (u8, Vec<String>) {
        let locale = self.config.locale.as_str();
        let deductions = &self.config.deductions;

        let (delayed, in_progress) = match milestone.status {
            MilestoneStatus::Complete => {
                return (
                    FULL_SCORE as u8,
                    vec![t_in(locale, "health.reason.complete", &[])],
                );
            }
            MilestoneStatus::Delayed => (true, false),
            MilestoneStatus::InProgress => (false, true),
            MilestoneStatus::Upcoming => (false, false),
        };

        let mut score = FULL_SCORE;
        let mut reasons = Vec::new();

        if delayed {
            score -= i32::from(deductions.delayed);
            let points = deductions.delayed.to_string();
            reasons.push(t_in(locale, "health.reason.delayed", &[("points", points.as_str())]));
        }

        if milestone.delay_risk_flag {
            score -= i32::from(deductions.risk_flag);
            let points = deductions.risk_flag.to_string();
            reasons.push(t_in(locale, "health.reason.flagged", &[("points", points.as_str())]));
        }

        if let Some(due) = milestone.due_date().filter(|due| is_overdue(*due, today)) {
            score -= i32::from(deductions.overdue);
            let points = deductions.overdue.to_string();
            let due = due.to_string();
            reasons.push(t_in(
                locale,
                "health.reason.overdue",
                &[("due", due.as_str()), ("points", points.as_str())],
            ));
        }

        if in_progress && milestone.completion_percentage < self.config.low_progress_threshold {
            score -= i32::from(deductions.low_progress);
            let points = deductions.low_progress.to_string();
            let completion = milestone.completion_percentage.to_string();
            reasons.push(t_in(
                locale,
                "health.reason.low_progress",
                &[("completion", completion.as_str()), ("points", points.as_str())],
            ));
        }

        (score.clamp(0, FULL_SCORE) as u8, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn base() -> Milestone {
        let mut m = Milestone::new("M1", "P1", "Frame");
        m.planned_start = Some(today() - Duration::days(5));
        m.planned_end = Some(today() + Duration::days(5));
        m
    }

    #[test]
    fn test_healthy_upcoming_scores_full() {
        let config = EngineConfig::default();
        let scorer = HealthScorer::new(&config);
        assert_eq!(scorer.score(&base(), today()), 100);
    }

    #[test]
    fn test_delayed_flagged_overdue_scores_25() {
        let config = EngineConfig::default();
        let scorer = HealthScorer::new(&config);
        let mut m = base();
        m.status = MilestoneStatus::Delayed;
        m.delay_risk_flag = true;
        m.planned_end = Some(today() - Duration::days(1));

        let health = scorer.assess(&m, today());
        assert_eq!(health.score, 25);
        assert_eq!(health.level, RiskLevel::Red);
        assert_eq!(health.reasons.len(), 3);
    }

    #[test]
    fn test_planned_date_used_as_due_date() {
        let config = EngineConfig::default();
        let scorer = HealthScorer::new(&config);
        let mut m = Milestone::new("M2", "P1", "Inspection");
        m.planned_date = Some(today() - Duration::days(3));
        assert_eq!(scorer.score(&m, today()), 75);

        m.planned_date = Some(today());
        assert_eq!(scorer.score(&m, today()), 100);
    }

    #[test]
    fn test_in_progress_low_completion() {
        let config = EngineConfig::default();
        let scorer = HealthScorer::new(&config);
        let mut m = base();
        m.status = MilestoneStatus::InProgress;
        m.completion_percentage = 49;
        assert_eq!(scorer.score(&m, today()), 85);

        m.completion_percentage = 50;
        assert_eq!(scorer.score(&m, today()), 100);
    }

    #[test]
    fn test_all_deductions_clamp_at_zero() {
        let mut config = EngineConfig::default();
        config.deductions.delayed = 60;
        config.deductions.overdue = 60;
        let scorer = HealthScorer::new(&config);
        let mut m = base();
        m.status = MilestoneStatus::Delayed;
        m.delay_risk_flag = true;
        m.planned_end = Some(today() - Duration::days(1));
        assert_eq!(scorer.score(&m, today()), 0);
    }

    #[test]
    fn test_complete_overrides_everything() {
        let config = EngineConfig::default();
        let scorer = HealthScorer::new(&config);
        let mut m = base();
        m.status = MilestoneStatus::Complete;
        m.delay_risk_flag = true;
        m.completion_percentage = 10;
        m.planned_end = Some(today() - Duration::days(30));

        let health = scorer.assess(&m, today());
        assert_eq!(health.score, 100);
        assert_eq!(health.level, RiskLevel::Green);
    }

    fn arb_status() -> impl Strategy<Value = MilestoneStatus> {
        prop_oneof![
            Just(MilestoneStatus::Upcoming),
            Just(MilestoneStatus::InProgress),
            Just(MilestoneStatus::Complete),
            Just(MilestoneStatus::Delayed),
        ]
    }

    proptest! {
        #[test]
        fn prop_score_within_bounds(
            status in arb_status(),
            flag in any::<bool>(),
            completion in 0u8..=100,
            due_offset in -400i64..400,
        ) {
            let config = EngineConfig::default();
            let scorer = HealthScorer::new(&config);
            let mut m = base();
            m.status = status;
            m.delay_risk_flag = flag;
            m.completion_percentage = completion;
            m.planned_end = Some(today() + Duration::days(due_offset));

            let score = scorer.score(&m, today());
            prop_assert!(score <= 100);
            if status == MilestoneStatus::Complete {
                prop_assert_eq!(score, 100);
            }
        }
    }
}
