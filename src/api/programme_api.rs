// ==========================================
// 施工进度计划分析引擎 - 进度计划分析 API
// ==========================================
// 职责: 对外分析入口, 负责输入校验 + 分析日期 + 模板注入
// 红线: API 不含业务规则, 规则全部在 engine 层
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult, SnapshotViolation};
use crate::config::{EngineConfig, TemplateCatalog};
use crate::domain::analysis::{
    CriticalPathResult, IssuedReport, MilestoneHealth, ProgrammeReport, ResourceConflict,
};
use crate::domain::milestone::Milestone;
use crate::engine::{
    ConflictDetector, CriticalPathAnalyzer, DependencyValidator, HealthScorer, ReportEngine,
};
use crate::repository::MilestoneSource;

// ==========================================
// ProgrammeApi - 进度计划分析 API
// ==========================================

/// 进度计划分析API
///
/// 职责：
/// 1. 拒绝不合法的快照 (重复ID / 空ID / 完成度越界)
/// 2. 提供分析日期 (默认本地今天, 可固定)
/// 3. 调用各分析引擎并返回结果
pub struct ProgrammeApi {
    config: EngineConfig,
    template: Option<Arc<TemplateCatalog>>,
    as_of: Option<NaiveDate>,
}

impl ProgrammeApi {
    /// 创建新的ProgrammeApi实例
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            template: None,
            as_of: None,
        }
    }

    /// 注入行业模板 (报告中输出模板缺项)
    pub fn with_template(mut self, template: Arc<TemplateCatalog>) -> Self {
        self.template = Some(template);
        self
    }

    /// 固定分析日期
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 当前分析日期
    pub fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    /// 校验单个节点的排期
    ///
    /// # 返回
    /// - Ok(Vec<String>): 提示列表 (空表示通过)
    /// - Err(ApiError): 快照或目标节点不合法
    pub fn validate_milestone_schedule(
        &self,
        milestone: &Milestone,
        all: &[Milestone],
    ) -> ApiResult<Vec<String>> {
        check_target(milestone)?;
        check_snapshot(all)?;
        Ok(DependencyValidator::new(&self.config).validate(milestone, all))
    }

    /// 计算建议开始日期 (YYYY-MM-DD)
    pub fn calculate_optimal_start_date(
        &self,
        milestone: &Milestone,
        all: &[Milestone],
    ) -> ApiResult<String> {
        check_target(milestone)?;
        check_snapshot(all)?;
        let date = DependencyValidator::new(&self.config).suggest_optimal_start(
            milestone,
            all,
            self.today(),
        );
        Ok(date.format("%Y-%m-%d").to_string())
    }

    /// 识别同工种的时间重叠
    pub fn identify_resource_conflicts(&self, all: &[Milestone]) -> ApiResult<Vec<ResourceConflict>> {
        check_snapshot(all)?;
        Ok(ConflictDetector::new(&self.config).detect_resource_conflicts(all))
    }

    /// 计算关键路径
    pub fn calculate_critical_path(&self, all: &[Milestone]) -> ApiResult<CriticalPathResult> {
        check_snapshot(all)?;
        Ok(CriticalPathAnalyzer::new(&self.config).analyze(all))
    }

    /// 节点健康度 (0..=100)
    pub fn get_milestone_health_score(&self, milestone: &Milestone) -> ApiResult<u8> {
        check_target(milestone)?;
        Ok(HealthScorer::new(&self.config).score(milestone, self.today()))
    }

    /// 节点健康度详情 (分数 + 等级 + 扣分原因)
    pub fn get_milestone_health(&self, milestone: &Milestone) -> ApiResult<MilestoneHealth> {
        check_target(milestone)?;
        Ok(HealthScorer::new(&self.config).assess(milestone, self.today()))
    }

    /// 生成综合报告
    pub fn build_report(&self, all: &[Milestone]) -> ApiResult<ProgrammeReport> {
        check_snapshot(all)?;
        let engine = ReportEngine::new(&self.config);
        let engine = match self.template.as_deref() {
            Some(template) => engine.with_template(template),
            None => engine,
        };
        Ok(engine.build_report(all, self.today()))
    }

    /// 发布报告: 附加报告ID (uuid v4) 与生成时间
    pub fn issue(report: ProgrammeReport) -> IssuedReport {
        IssuedReport::new(Uuid::new_v4().to_string(), Utc::now().naive_utc(), report)
    }

    /// 从快照来源读取项目并生成报告
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 项目无任何节点
    #[instrument(skip(self, source))]
    pub async fn report_for_project<S>(
        &self,
        source: &S,
        project_id: &str,
    ) -> ApiResult<ProgrammeReport>
    where
        S: MilestoneSource + ?Sized,
    {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("项目ID不能为空".to_string()));
        }

        let snapshot = source.load_snapshot(project_id).await?;
        if snapshot.is_empty() {
            return Err(ApiError::NotFound(format!("项目(id={})无进度节点", project_id)));
        }
        debug!(count = snapshot.len(), "项目快照读取完成");

        self.build_report(&snapshot)
    }

    /// 并发生成多个项目的报告 (结果与输入顺序一致)
    pub async fn report_for_projects<S>(
        &self,
        source: &S,
        project_ids: &[String],
    ) -> Vec<ApiResult<ProgrammeReport>>
    where
        S: MilestoneSource + ?Sized,
    {
        join_all(
            project_ids
                .iter()
                .map(|project_id| self.report_for_project(source, project_id)),
        )
        .await
    }
}

// ==========================================
// 输入校验
// ==========================================

fn check_target(milestone: &Milestone) -> ApiResult<()> {
    if milestone.id.trim().is_empty() {
        return Err(ApiError::InvalidInput(format!(
            "节点ID不能为空 (name={})",
            milestone.name
        )));
    }
    if milestone.completion_percentage > 100 {
        return Err(ApiError::InvalidInput(format!(
            "节点{}完成度超出范围 [0, 100]: {}",
            milestone.id, milestone.completion_percentage
        )));
    }
    Ok(())
}

fn check_snapshot(all: &[Milestone]) -> ApiResult<()> {
    let mut seen = HashSet::with_capacity(all.len());
    let mut violations = Vec::new();

    for m in all {
        if m.id.trim().is_empty() {
            violations.push(SnapshotViolation {
                violation_type: "BLANK_ID".to_string(),
                milestone_id: m.id.clone(),
                reason: format!("节点「{}」ID为空", m.name),
            });
        } else if !seen.insert(m.id.as_str()) {
            violations.push(SnapshotViolation {
                violation_type: "DUPLICATE_ID".to_string(),
                milestone_id: m.id.clone(),
                reason: format!("节点ID重复: {}", m.id),
            });
        }

        if m.completion_percentage > 100 {
            violations.push(SnapshotViolation {
                violation_type: "COMPLETION_RANGE".to_string(),
                milestone_id: m.id.clone(),
                reason: format!("完成度超出范围 [0, 100]: {}", m.completion_percentage),
            });
        }
    }

    if violations.is_empty() {
        return Ok(());
    }

    warn!(violations = violations.len(), "节点快照被拒绝");
    Err(ApiError::SnapshotValidationError {
        reason: format!("{}处快照违规", violations.len()),
        violations,
    })
}
