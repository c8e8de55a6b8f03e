// ==========================================
// ProgrammeApi 集成测试
// ==========================================
// 测试目标: API 层输入校验 + 分析日期 + 模板注入 + 异步快照读取
// ==========================================

mod helpers;

use helpers::d;
use helpers::milestone_builder::MilestoneBuilder;
use programme_engine::api::{ApiError, ProgrammeApi};
use programme_engine::config::{EngineConfig, TemplateCatalog};
use programme_engine::domain::types::MilestoneStatus;
use programme_engine::repository::InMemoryMilestoneSource;
use programme_engine::Milestone;
use std::sync::Arc;

fn api() -> ProgrammeApi {
    ProgrammeApi::new(EngineConfig::default()).with_as_of(d(2024, 1, 10))
}

fn sample_programme() -> Vec<Milestone> {
    vec![
        MilestoneBuilder::new("A")
            .name("Foundations")
            .span(d(2024, 1, 1), d(2024, 1, 5))
            .trade("Carpentry")
            .status(MilestoneStatus::Complete)
            .completion(100)
            .build(),
        MilestoneBuilder::new("B")
            .name("Frame")
            .span(d(2024, 1, 3), d(2024, 1, 7))
            .trade("Carpentry")
            .depends_on(&["A"])
            .status(MilestoneStatus::Delayed)
            .build(),
        MilestoneBuilder::new("C")
            .name("Roof")
            .span(d(2024, 1, 8), d(2024, 1, 20))
            .trade("Roofing")
            .depends_on(&["B"])
            .status(MilestoneStatus::InProgress)
            .completion(30)
            .build(),
    ]
}

#[test]
fn test_validate_and_suggest_start() {
    let api = api();
    let all = sample_programme();

    let issues = api.validate_milestone_schedule(&all[1], &all).unwrap();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].contains("'Frame'"));
    assert!(issues[0].contains("'Foundations'"));

    // A 结束 01-05, 缓冲 1 天
    assert_eq!(api.calculate_optimal_start_date(&all[1], &all).unwrap(), "2024-01-06");
}

#[test]
fn test_conflicts_and_critical_path() {
    let api = api();
    let all = sample_programme();

    let conflicts = api.identify_resource_conflicts(&all).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].overlap_days, 2);

    let critical = api.calculate_critical_path(&all).unwrap();
    assert_eq!(critical.path, vec!["A", "B", "C"]);
    assert_eq!(critical.duration_days, 4 + 4 + 12);
    assert_eq!(critical.risk_factors.len(), 2);
}

#[test]
fn test_health_scores_use_as_of_date() {
    let api = api();
    let all = sample_programme();

    assert_eq!(api.get_milestone_health_score(&all[0]).unwrap(), 100);
    // 延误 -30, 01-07 已过 -25
    assert_eq!(api.get_milestone_health_score(&all[1]).unwrap(), 45);
    // 进行中 30% -15
    assert_eq!(api.get_milestone_health_score(&all[2]).unwrap(), 85);

    let report = api.build_report(&all).unwrap();
    assert_eq!(report.as_of, d(2024, 1, 10));
    // (100 + 45 + 85) / 3 = 76.67
    assert_eq!(report.overall_health_percent, 77);
}

#[test]
fn test_template_injection_reports_gaps() {
    let catalog = Arc::new(TemplateCatalog::standard_residential());
    let all = sample_programme();

    let without = api().build_report(&all).unwrap();
    assert!(without.template_gaps.is_empty());

    let with = api().with_template(catalog.clone()).build_report(&all).unwrap();
    assert!(!with.template_gaps.is_empty());
    assert!(with.template_gaps.iter().all(|g| g.template_name == catalog.name));
    assert!(with.template_gaps.iter().all(|g| g.milestone_name != "Foundations"));
}

#[test]
fn test_snapshot_programmer_errors_are_rejected() {
    let api = api();
    let mut all = sample_programme();
    all.push(MilestoneBuilder::new("A").name("Duplicate").build());

    let err = api.build_report(&all).unwrap_err();
    match err {
        ApiError::SnapshotValidationError { violations, .. } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].milestone_id, "A");
        }
        other => panic!("Expected SnapshotValidationError, got {:?}", other),
    }

    let over = MilestoneBuilder::new("Z").completion(150).build();
    assert!(matches!(
        api.get_milestone_health_score(&over),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_empty_snapshot_is_valid() {
    let report = api().build_report(&[]).unwrap();
    assert_eq!(report.milestone_count, 0);
    assert_eq!(report.overall_health_percent, 0);
    assert!(report.critical_path.path.is_empty());
}

#[tokio::test]
async fn test_report_for_project_from_source() {
    let mut milestones = sample_programme();
    milestones.push(MilestoneBuilder::new("X").project("P2").span(d(2024, 1, 1), d(2024, 1, 2)).build());
    let source = InMemoryMilestoneSource::from_milestones(milestones);

    let report = api().report_for_project(&source, "P1").await.unwrap();
    assert_eq!(report.milestone_count, 3);

    let missing = api().report_for_project(&source, "P404").await;
    assert!(matches!(missing, Err(ApiError::NotFound(_))));

    let blank = api().report_for_project(&source, " ").await;
    assert!(matches!(blank, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_report_for_projects_keeps_input_order() {
    let mut milestones = sample_programme();
    milestones.push(MilestoneBuilder::new("X").project("P2").span(d(2024, 1, 1), d(2024, 1, 2)).build());
    let source = InMemoryMilestoneSource::from_milestones(milestones);

    let ids = vec!["P2".to_string(), "P404".to_string(), "P1".to_string()];
    let results = api().report_for_projects(&source, &ids).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().milestone_count, 1);
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().milestone_count, 3);
}
