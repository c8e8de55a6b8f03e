// ==========================================
// 施工进度计划分析引擎 - 节点字段映射器
// ==========================================
// 职责: 源字段 → Milestone 映射 + 类型转换
// 列名: 不区分大小写, 空格/连字符视同下划线, 支持常见别名
// ==========================================

use crate::domain::milestone::Milestone;
use crate::domain::types::{MilestonePriority, MilestoneStatus};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::NaiveDate;
use std::collections::HashMap;

// 标准字段 -> 可接受列名
const ALIASES: &[(&str, &[&str])] = &[
    ("id", &["id", "milestone_id", "task_id"]),
    ("project_id", &["project_id", "project"]),
    ("name", &["name", "milestone", "milestone_name", "title", "task"]),
    ("planned_start", &["planned_start", "start", "start_date"]),
    ("planned_end", &["planned_end", "end", "end_date", "finish"]),
    ("planned_date", &["planned_date", "date", "due_date"]),
    (
        "completion_percentage",
        &["completion_percentage", "completion", "progress", "percent_complete"],
    ),
    ("status", &["status"]),
    ("priority", &["priority"]),
    ("category", &["category", "phase"]),
    ("trade", &["trade", "resource"]),
    ("dependencies", &["dependencies", "depends_on", "predecessors"]),
    ("critical_path", &["critical_path", "critical"]),
    ("delay_risk_flag", &["delay_risk_flag", "at_risk", "delay_risk"]),
    ("assigned_to", &["assigned_to", "owner", "assignee"]),
];

/// 节点字段映射器
#[derive(Debug, Clone, Default)]
pub struct MilestoneFieldMapper {
    default_project_id: Option<String>,
}

impl MilestoneFieldMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// 行内无 project_id 时使用的项目
    pub fn with_default_project(mut self, project_id: impl Into<String>) -> Self {
        self.default_project_id = Some(project_id.into());
        self
    }

    /// 映射一行 (row_number 从 1 起, 仅用于报错)
    pub fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<Milestone> {
        let row = normalize_headers(row);

        let id = get_string(&row, "id").ok_or(ImportError::PrimaryKeyMissing(row_number))?;
        let project_id = get_string(&row, "project_id")
            .or_else(|| self.default_project_id.clone())
            .ok_or(ImportError::ProjectMissing(row_number))?;
        let name = get_string(&row, "name").unwrap_or_else(|| id.clone());

        let mut milestone = Milestone::new(id, project_id, name);
        milestone.planned_start = parse_date(&row, "planned_start", row_number)?;
        milestone.planned_end = parse_date(&row, "planned_end", row_number)?;
        milestone.planned_date = parse_date(&row, "planned_date", row_number)?;
        milestone.completion_percentage = parse_completion(&row, row_number)?;
        milestone.status = parse_status(&row, row_number)?;
        milestone.priority = parse_priority(&row, row_number)?;
        milestone.category = get_string(&row, "category");
        milestone.trade = get_string(&row, "trade");
        milestone.dependencies = get_string(&row, "dependencies")
            .map(|raw| split_dependencies(&raw))
            .unwrap_or_default();
        milestone.critical_path = parse_flag(&row, "critical_path", row_number)?;
        milestone.delay_risk_flag = parse_flag(&row, "delay_risk_flag", row_number)?;
        milestone.assigned_to = get_string(&row, "assigned_to");

        Ok(milestone)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace([' ', '-'], "_")
}

fn normalize_headers(row: &RawRow) -> HashMap<String, String> {
    row.iter()
        .map(|(k, v)| (normalize_key(k), v.clone()))
        .collect()
}

/// 提取字符串字段 (依次尝试别名, 空值视为缺失)
fn get_string(row: &HashMap<String, String>, field: &str) -> Option<String> {
    let aliases = ALIASES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[]);

    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// 解析日期（YYYY-MM-DD 或 YYYYMMDD）
fn parse_date(
    row: &HashMap<String, String>,
    field: &str,
    row_number: usize,
) -> ImportResult<Option<NaiveDate>> {
    match get_string(row, field) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&value, "%Y%m%d"))
            .map(Some)
            .map_err(|_| ImportError::DateFormatError {
                row: row_number,
                field: field.to_string(),
                value,
            }),
    }
}

/// 完成度 (允许 "45%" / "45.0")
fn parse_completion(row: &HashMap<String, String>, row_number: usize) -> ImportResult<u8> {
    let field = "completion_percentage";
    let Some(value) = get_string(row, field) else {
        return Ok(0);
    };

    let number = value
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_err(|_| ImportError::TypeConversionError {
            row: row_number,
            field: field.to_string(),
            message: format!("无法解析为数字: {}", value),
        })?
        .round() as i64;

    if !(0..=100).contains(&number) {
        return Err(ImportError::ValueRangeError {
            row: row_number,
            field: field.to_string(),
            value: number,
            min: 0,
            max: 100,
        });
    }
    Ok(number as u8)
}

fn parse_status(row: &HashMap<String, String>, row_number: usize) -> ImportResult<MilestoneStatus> {
    match get_string(row, "status") {
        None => Ok(MilestoneStatus::Upcoming),
        Some(value) => MilestoneStatus::parse(&value).ok_or_else(|| {
            ImportError::TypeConversionError {
                row: row_number,
                field: "status".to_string(),
                message: format!("未知状态: {}", value),
            }
        }),
    }
}

fn parse_priority(
    row: &HashMap<String, String>,
    row_number: usize,
) -> ImportResult<MilestonePriority> {
    match get_string(row, "priority") {
        None => Ok(MilestonePriority::default()),
        Some(value) => MilestonePriority::parse(&value).ok_or_else(|| {
            ImportError::TypeConversionError {
                row: row_number,
                field: "priority".to_string(),
                message: format!("未知优先级: {}", value),
            }
        }),
    }
}

fn parse_flag(row: &HashMap<String, String>, field: &str, row_number: usize) -> ImportResult<bool> {
    match get_string(row, field).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(value) => match value.as_str() {
            "true" | "yes" | "y" | "1" | "x" => Ok(true),
            "false" | "no" | "n" | "0" => Ok(false),
            _ => Err(ImportError::TypeConversionError {
                row: row_number,
                field: field.to_string(),
                message: format!("无法解析为布尔值: {}", value),
            }),
        },
    }
}

/// 依赖列表: 以 ';' 或 ',' 分隔, 去空白, 丢弃空项
fn split_dependencies(raw: &str) -> Vec<String> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_basic_row() {
        let mapper = MilestoneFieldMapper::new();
        let m = mapper
            .map_row(
                &row(&[
                    ("ID", "M2"),
                    ("Project", "P1"),
                    ("Name", "Frame"),
                    ("Start Date", "2024-01-03"),
                    ("End-Date", "20240107"),
                    ("Trade", "Carpentry"),
                    ("Depends On", "M1; M0 ,"),
                    ("Status", "In Progress"),
                    ("Progress", "45%"),
                    ("At Risk", "yes"),
                ]),
                1,
            )
            .unwrap();

        assert_eq!(m.id, "M2");
        assert_eq!(m.project_id, "P1");
        assert_eq!(m.planned_start, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(m.planned_end, NaiveDate::from_ymd_opt(2024, 1, 7));
        assert_eq!(m.dependencies, vec!["M1", "M0"]);
        assert_eq!(m.status, MilestoneStatus::InProgress);
        assert_eq!(m.completion_percentage, 45);
        assert!(m.delay_risk_flag);
        assert!(!m.critical_path);
        assert_eq!(m.priority, MilestonePriority::Medium);
    }

    #[test]
    fn test_missing_id_is_error() {
        let mapper = MilestoneFieldMapper::new().with_default_project("P1");
        let result = mapper.map_row(&row(&[("name", "Frame")]), 4);
        assert!(matches!(result, Err(ImportError::PrimaryKeyMissing(4))));
    }

    #[test]
    fn test_default_project_and_name_fallback() {
        let mapper = MilestoneFieldMapper::new().with_default_project("P9");
        let m = mapper.map_row(&row(&[("id", "M1")]), 1).unwrap();
        assert_eq!(m.project_id, "P9");
        assert_eq!(m.name, "M1");
        assert_eq!(m.status, MilestoneStatus::Upcoming);

        let without_default = MilestoneFieldMapper::new().map_row(&row(&[("id", "M1")]), 1);
        assert!(matches!(without_default, Err(ImportError::ProjectMissing(1))));
    }

    #[test]
    fn test_invalid_values() {
        let mapper = MilestoneFieldMapper::new().with_default_project("P1");

        let bad_date = mapper.map_row(&row(&[("id", "M1"), ("start", "03/01/2024")]), 2);
        assert!(matches!(bad_date, Err(ImportError::DateFormatError { .. })));

        let too_high = mapper.map_row(&row(&[("id", "M1"), ("completion", "120")]), 2);
        assert!(matches!(too_high, Err(ImportError::ValueRangeError { value: 120, .. })));

        let bad_status = mapper.map_row(&row(&[("id", "M1"), ("status", "paused")]), 2);
        assert!(matches!(bad_status, Err(ImportError::TypeConversionError { .. })));

        let bad_flag = mapper.map_row(&row(&[("id", "M1"), ("critical", "maybe")]), 2);
        assert!(matches!(bad_flag, Err(ImportError::TypeConversionError { .. })));
    }
}
