// ==========================================
// 施工进度计划分析引擎 - 应用层
// ==========================================
// 职责: 组装快照库 / 配置管理 / 分析 API
// ==========================================

use crate::api::{ApiError, ApiResult, ProgrammeApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::MilestoneRepository;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PROGRAMME_ENGINE_DB_PATH";

// ==========================================
// AppContext - 应用上下文
// ==========================================
/// 应用上下文 (单库共享连接)
pub struct AppContext {
    pub db_path: String,
    pub milestone_repo: Arc<MilestoneRepository>,
    pub config_manager: Arc<ConfigManager>,
}

impl AppContext {
    /// 打开 (必要时创建) 快照库
    pub fn new(db_path: impl Into<String>) -> ApiResult<Self> {
        let db_path = db_path.into();
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;
        Self::from_connection(db_path, conn)
    }

    pub fn from_connection(db_path: impl Into<String>, conn: Connection) -> ApiResult<Self> {
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            db_path: db_path.into(),
            milestone_repo: Arc::new(MilestoneRepository::from_connection(conn.clone())),
            config_manager: Arc::new(ConfigManager::from_connection(conn)?),
        })
    }

    /// 按项目加载配置 (全局覆盖 → 项目覆盖) 并创建分析 API
    pub fn programme_api(&self, project_id: Option<&str>) -> ApiResult<ProgrammeApi> {
        let config = self.config_manager.load_engine_config(project_id)?;
        Ok(ProgrammeApi::new(config))
    }
}

/// 默认数据库路径
///
/// 优先使用环境变量 PROGRAMME_ENGINE_DB_PATH, 否则放在用户数据目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./programme_engine.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("programme-engine");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("programme_engine.db");
        }
    }

    path.to_string_lossy().to_string()
}
