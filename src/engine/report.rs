// ==========================================
// 施工进度计划分析引擎 - 综合报告引擎
// ==========================================
// 职责: 汇总 校验 / 资源冲突 / 关键路径 / 健康度
// 输入: 节点快照 + 分析日期 + (可选) 行业模板
// 输出: ProgrammeReport
// 红线: 纯函数, 不缓存, 不落库; 子引擎结果原样合并
// ==========================================

use crate::config::{EngineConfig, TemplateCatalog};
use crate::domain::analysis::{MilestoneIssues, ProgrammeReport, TemplateGap};
use crate::domain::milestone::Milestone;
use crate::engine::conflict::ConflictDetector;
use crate::engine::critical_path::CriticalPathAnalyzer;
use crate::engine::dependency::{DependencyValidator, MilestoneIndex};
use crate::engine::health::HealthScorer;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// ReportEngine - 综合报告引擎
// ==========================================
pub struct ReportEngine<'a> {
    config: &'a EngineConfig,
    template: Option<&'a TemplateCatalog>,
}

impl<'a> ReportEngine<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            template: None,
        }
    }

    /// 注入行业模板 (用于缺项检查)
    pub fn with_template(mut self, template: &'a TemplateCatalog) -> Self {
        self.template = Some(template);
        self
    }

    /// 生成综合报告
    #[instrument(skip(self, milestones), fields(count = milestones.len()))]
    pub fn build_report(&self, milestones: &[Milestone], today: NaiveDate) -> ProgrammeReport {
        let validator = DependencyValidator::new(self.config);
        let scorer = HealthScorer::new(self.config);

        // 1. 单节点校验 (复用索引)
        let index = MilestoneIndex::build(milestones);
        let mut per_milestone_issues = BTreeMap::new();
        for m in milestones {
            let issues = validator.validate_with_index(m, &index);
            if !issues.is_empty() {
                per_milestone_issues
                    .entry(m.id.clone())
                    .or_insert(MilestoneIssues {
                        name: m.name.clone(),
                        issues,
                    });
            }
        }

        // 2. 资源冲突
        let conflicts = ConflictDetector::new(self.config).detect_resource_conflicts(milestones);

        // 3. 关键路径
        let critical_path = CriticalPathAnalyzer::new(self.config).analyze(milestones);
        let critical_flag_drift = CriticalPathAnalyzer::flag_drift(milestones, &critical_path);

        // 4. 健康度
        let health: Vec<_> = milestones.iter().map(|m| scorer.assess(m, today)).collect();
        let overall_health_percent = overall_health(health.iter().map(|h| h.score));

        // 5. 模板缺项
        let template_gaps = self
            .template
            .map(|catalog| template_gaps(catalog, milestones))
            .unwrap_or_default();

        tracing::info!(
            milestones = milestones.len(),
            overall_health_percent,
            conflicts = conflicts.len(),
            critical_duration_days = critical_path.duration_days,
            "进度计划报告生成完成"
        );

        ProgrammeReport {
            as_of: today,
            milestone_count: milestones.len(),
            overall_health_percent,
            conflicts,
            critical_path,
            per_milestone_issues,
            health,
            critical_flag_drift,
            template_gaps,
        }
    }
}

/// 平均健康度 (四舍五入), 空集合为 0
pub fn overall_health(scores: impl Iterator<Item = u8>) -> u8 {
    let (sum, count) = scores.fold((0u64, 0u64), |(sum, count), s| (sum + u64::from(s), count + 1));
    if count == 0 {
        return 0;
    }
    ((sum as f64 / count as f64).round()) as u8
}

/// 模板中存在但计划中缺失的节点
fn template_gaps(catalog: &TemplateCatalog, milestones: &[Milestone]) -> Vec<TemplateGap> {
    catalog
        .milestones
        .iter()
        .filter(|entry| !TemplateCatalog::is_covered(entry, milestones))
        .map(|entry| TemplateGap {
            template_name: catalog.name.clone(),
            milestone_name: entry.name.clone(),
            category: entry.category.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::MilestoneStatus;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn task(id: &str, start_offset: i64, days: i64, trade: &str, deps: &[&str]) -> Milestone {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(start_offset);
        let mut m = Milestone::new(id, "P1", format!("Task {}", id));
        m.planned_start = Some(start);
        m.planned_end = Some(start + Duration::days(days));
        m.trade = Some(trade.to_string());
        m.dependencies = deps.iter().map(|d| d.to_string()).collect();
        m
    }

    #[test]
    fn test_overall_health_rounding() {
        assert_eq!(overall_health([].into_iter()), 0);
        assert_eq!(overall_health([100, 25].into_iter()), 63);
        assert_eq!(overall_health([100, 100, 85].into_iter()), 95);
    }

    #[test]
    fn test_empty_report() {
        let config = EngineConfig::default();
        let report = ReportEngine::new(&config).build_report(&[], today());
        assert_eq!(report.overall_health_percent, 0);
        assert_eq!(report.milestone_count, 0);
        assert!(report.conflicts.is_empty());
        assert!(report.critical_path.path.is_empty());
        assert!(report.per_milestone_issues.is_empty());
    }

    #[test]
    fn test_report_combines_sub_results() {
        let config = EngineConfig::default();
        let mut a = task("A", 0, 5, "Carpentry", &[]);
        a.status = MilestoneStatus::Complete;
        let b = task("B", 3, 4, "Carpentry", &["A"]);
        let milestones = vec![a, b];

        let report = ReportEngine::new(&config).build_report(&milestones, today());

        assert_eq!(report.milestone_count, 2);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.critical_path.path, vec!["A", "B"]);
        assert_eq!(report.critical_path.duration_days, 9);

        // B 在 A 完成前开始
        assert_eq!(report.per_milestone_issues.len(), 1);
        assert_eq!(report.per_milestone_issues["B"].name, "Task B");

        // A 已完成 100, B 截止 01-08 已逾期 75 -> 88
        assert_eq!(report.health[0].score, 100);
        assert_eq!(report.health[1].score, 75);
        assert_eq!(report.overall_health_percent, 88);
    }

    #[test]
    fn test_same_input_same_report() {
        let config = EngineConfig::default();
        let milestones = vec![task("A", 0, 5, "Carpentry", &[]), task("B", 3, 4, "Carpentry", &["A"])];
        let engine = ReportEngine::new(&config);

        let first = engine.build_report(&milestones, today());
        let second = engine.build_report(&milestones, today());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_template_gaps_only_with_injected_catalog() {
        let config = EngineConfig::default();
        let catalog = TemplateCatalog::standard_residential();
        let mut m = task("F", 0, 10, "Groundworks", &[]);
        m.name = "Foundations".to_string();
        let milestones = vec![m];

        let without = ReportEngine::new(&config).build_report(&milestones, today());
        assert!(without.template_gaps.is_empty());

        let with = ReportEngine::new(&config)
            .with_template(&catalog)
            .build_report(&milestones, today());
        assert_eq!(with.template_gaps.len(), catalog.milestones.len() - 1);
        assert!(with
            .template_gaps
            .iter()
            .all(|g| g.milestone_name != "Foundations"));
    }
}
