// ==========================================
// 测试数据构建器 - 进度节点
// ==========================================

use chrono::NaiveDate;
use programme_engine::domain::types::{MilestonePriority, MilestoneStatus};
use programme_engine::Milestone;

pub struct MilestoneBuilder {
    milestone: Milestone,
}

impl MilestoneBuilder {
    /// 默认: 项目 P1, 名称 "Milestone {id}", 状态 upcoming
    pub fn new(id: &str) -> Self {
        Self {
            milestone: Milestone::new(id, "P1", format!("Milestone {}", id)),
        }
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.milestone.project_id = project_id.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.milestone.name = name.to_string();
        self
    }

    /// 计划区间 [start, end)
    pub fn span(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.milestone.planned_start = Some(start);
        self.milestone.planned_end = Some(end);
        self
    }

    pub fn start(mut self, start: NaiveDate) -> Self {
        self.milestone.planned_start = Some(start);
        self
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.milestone.planned_end = Some(end);
        self
    }

    /// 单点日期
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.milestone.planned_date = Some(date);
        self
    }

    pub fn status(mut self, status: MilestoneStatus) -> Self {
        self.milestone.status = status;
        self
    }

    pub fn priority(mut self, priority: MilestonePriority) -> Self {
        self.milestone.priority = priority;
        self
    }

    pub fn completion(mut self, percent: u8) -> Self {
        self.milestone.completion_percentage = percent;
        self
    }

    pub fn trade(mut self, trade: &str) -> Self {
        self.milestone.trade = Some(trade.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.milestone.category = Some(category.to_string());
        self
    }

    pub fn depends_on(mut self, deps: &[&str]) -> Self {
        self.milestone.dependencies = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn critical(mut self) -> Self {
        self.milestone.critical_path = true;
        self
    }

    pub fn at_risk(mut self) -> Self {
        self.milestone.delay_risk_flag = true;
        self
    }

    pub fn assigned_to(mut self, who: &str) -> Self {
        self.milestone.assigned_to = Some(who.to_string());
        self
    }

    pub fn build(self) -> Milestone {
        self.milestone
    }
}
