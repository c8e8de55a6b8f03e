// ==========================================
// 施工进度计划分析引擎 - 进度节点数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 节点的增删改由外部系统负责, 此处仅提供本地快照库读写
// ==========================================

use crate::domain::milestone::Milestone;
use crate::domain::types::{MilestonePriority, MilestoneStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT
        milestone_id, project_id, name,
        planned_start, planned_end, planned_date,
        completion_percentage, status, priority,
        category, trade, dependencies_json,
        critical_path, delay_risk_flag, assigned_to
    FROM milestone
"#;

// ==========================================
// MilestoneRepository - 进度节点仓储
// ==========================================
/// 进度节点仓储
/// 职责: 管理 milestone 表的读写
#[derive(Clone)]
pub struct MilestoneRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MilestoneRepository {
    /// 创建新的 MilestoneRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入单个节点 (seq_no 决定快照内顺序)
    pub fn insert(&self, milestone: &Milestone, seq_no: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, milestone, seq_no)
    }

    /// 批量写入 (单事务, 按切片顺序编号)
    pub fn insert_batch(&self, milestones: &[Milestone]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for (seq_no, milestone) in milestones.iter().enumerate() {
            Self::insert_with(&tx, milestone, seq_no as i64)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(milestones.len())
    }

    fn insert_with(conn: &Connection, milestone: &Milestone, seq_no: i64) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO milestone (
                milestone_id, project_id, name,
                planned_start, planned_end, planned_date,
                completion_percentage, status, priority,
                category, trade, dependencies_json,
                critical_path, delay_risk_flag, assigned_to, seq_no
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                milestone.id,
                milestone.project_id,
                milestone.name,
                milestone.planned_start.map(|d| d.to_string()),
                milestone.planned_end.map(|d| d.to_string()),
                milestone.planned_date.map(|d| d.to_string()),
                milestone.completion_percentage,
                milestone.status.to_string(),
                milestone.priority.to_string(),
                milestone.category,
                milestone.trade,
                serde_json::to_string(&milestone.dependencies)?,
                milestone.critical_path,
                milestone.delay_risk_flag,
                milestone.assigned_to,
                seq_no,
            ],
        )?;
        Ok(())
    }

    /// 查询项目的全部节点 (快照)
    ///
    /// # 返回
    /// - Ok(Vec<Milestone>): 按 seq_no 排序的节点列表
    /// - Err: 数据库错误或字段值错误
    pub fn find_by_project(&self, project_id: &str) -> RepositoryResult<Vec<Milestone>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE project_id = ?1 ORDER BY seq_no ASC, milestone_id ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![project_id], MilestoneRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        rows.into_iter().map(MilestoneRow::into_milestone).collect()
    }

    /// 按ID查询 (节点ID在项目内唯一)
    ///
    /// # 返回
    /// - Ok(Some(Milestone)): 找到节点
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, project_id: &str, milestone_id: &str) -> RepositoryResult<Option<Milestone>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE project_id = ?1 AND milestone_id = ?2", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![project_id, milestone_id], MilestoneRow::from_row);
        match result {
            Ok(row) => Ok(Some(row.into_milestone()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 列出全部项目ID
    pub fn list_project_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT project_id FROM milestone ORDER BY project_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(ids)
    }
}

// ==========================================
// 行映射 (先取原始值, 再做类型转换)
// ==========================================
struct MilestoneRow {
    id: String,
    project_id: String,
    name: String,
    planned_start: Option<String>,
    planned_end: Option<String>,
    planned_date: Option<String>,
    completion_percentage: i64,
    status: String,
    priority: String,
    category: Option<String>,
    trade: Option<String>,
    dependencies_json: String,
    critical_path: bool,
    delay_risk_flag: bool,
    assigned_to: Option<String>,
}

impl MilestoneRow {
    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            planned_start: row.get(3)?,
            planned_end: row.get(4)?,
            planned_date: row.get(5)?,
            completion_percentage: row.get(6)?,
            status: row.get(7)?,
            priority: row.get(8)?,
            category: row.get(9)?,
            trade: row.get(10)?,
            dependencies_json: row.get(11)?,
            critical_path: row.get(12)?,
            delay_risk_flag: row.get(13)?,
            assigned_to: row.get(14)?,
        })
    }

    fn into_milestone(self) -> RepositoryResult<Milestone> {
        let status = MilestoneStatus::parse(&self.status).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知状态: {} (milestone_id={})", self.status, self.id),
            }
        })?;
        let priority = MilestonePriority::parse(&self.priority).unwrap_or_default();
        let completion_percentage = u8::try_from(self.completion_percentage)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or_else(|| RepositoryError::FieldValueError {
                field: "completion_percentage".to_string(),
                message: format!("超出范围 [0, 100]: {}", self.completion_percentage),
            })?;

        Ok(Milestone {
            planned_start: parse_date("planned_start", self.planned_start.as_deref())?,
            planned_end: parse_date("planned_end", self.planned_end.as_deref())?,
            planned_date: parse_date("planned_date", self.planned_date.as_deref())?,
            dependencies: serde_json::from_str(&self.dependencies_json)?,
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            completion_percentage,
            status,
            priority,
            category: self.category,
            trade: self.trade,
            critical_path: self.critical_path,
            delay_risk_flag: self.delay_risk_flag,
            assigned_to: self.assigned_to,
        })
    }
}

fn parse_date(field: &str, raw: Option<&str>) -> RepositoryResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| RepositoryError::FieldValueError {
                field: field.to_string(),
                message: format!("日期格式错误 {}: {}", s, e),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn test_repo() -> MilestoneRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        MilestoneRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("planned_start", None).unwrap(), None);
        assert_eq!(parse_date("planned_start", Some("  ")).unwrap(), None);
        assert!(parse_date("planned_start", Some("2024/01/01")).is_err());
    }

    #[test]
    fn test_unknown_status_is_field_error() {
        let repo = test_repo();
        {
            let conn = repo.get_conn().unwrap();
            conn.execute(
                "INSERT INTO milestone (milestone_id, project_id, name, status) VALUES ('M1', 'P1', 'Bad', 'paused')",
                [],
            )
            .unwrap();
        }

        let err = repo.find_by_project("P1").unwrap_err();
        assert!(matches!(err, RepositoryError::FieldValueError { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_same_id_in_different_projects() {
        let repo = test_repo();
        let mut a1 = Milestone::new("A", "P1", "Foundations");
        a1.planned_start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let a2 = Milestone::new("A", "P2", "Demolition");

        repo.insert(&a1, 0).unwrap();
        repo.insert(&a2, 0).unwrap();
        assert!(matches!(
            repo.insert(&a1, 1),
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));

        assert_eq!(repo.find_by_id("P1", "A").unwrap().unwrap().name, "Foundations");
        assert_eq!(repo.find_by_id("P2", "A").unwrap().unwrap().name, "Demolition");
        assert!(repo.find_by_id("P3", "A").unwrap().is_none());
        assert_eq!(repo.list_project_ids().unwrap(), vec!["P1", "P2"]);
    }
}
