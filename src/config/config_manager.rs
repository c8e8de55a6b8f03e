// ==========================================
// 施工进度计划分析引擎 - 配置管理器
// ==========================================
// 职责: 引擎参数加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 覆写顺序: 默认值 < global < 项目 scope
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 依赖缓冲天数允许范围 (约 10 年)
pub const DEPENDENCY_BUFFER_DAYS_RANGE: std::ops::RangeInclusive<i64> = 0..=3650;

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone)]
pub enum ConfigScope {
    Global,                          // 全局
    Project { project_id: String },  // 项目
}

impl ConfigScope {
    fn scope_id(&self) -> &str {
        match self {
            ConfigScope::Global => "global",
            ConfigScope::Project { project_id } => project_id.as_str(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取指定作用域的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, scope: &ConfigScope, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope.scope_id(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值 (UPSERT)
    pub fn set_config_value(&self, scope: &ConfigScope, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3",
            params![scope.scope_id(), key, value],
        )?;
        Ok(())
    }

    /// 获取作用域内所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 随报告一并记录当次分析使用的参数
    pub fn get_config_snapshot(&self, scope: &ConfigScope) -> ConfigResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![scope.scope_id()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 加载引擎参数
    ///
    /// 先应用 global 覆写, 再应用项目覆写 (若提供 project_id)
    pub fn load_engine_config(&self, project_id: Option<&str>) -> ConfigResult<EngineConfig> {
        let mut config = EngineConfig::default();
        self.apply_overrides(&ConfigScope::Global, &mut config)?;

        if let Some(project_id) = project_id {
            let scope = ConfigScope::Project {
                project_id: project_id.to_string(),
            };
            self.apply_overrides(&scope, &mut config)?;
        }

        tracing::debug!(?project_id, locale = %config.locale, "引擎参数加载完成");
        Ok(config)
    }

    fn apply_overrides(&self, scope: &ConfigScope, config: &mut EngineConfig) -> ConfigResult<()> {
        if let Some(v) = self.parsed::<u8>(scope, config_keys::DEDUCTION_DELAYED)? {
            config.deductions.delayed = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::DEDUCTION_RISK_FLAG)? {
            config.deductions.risk_flag = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::DEDUCTION_OVERDUE)? {
            config.deductions.overdue = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::DEDUCTION_LOW_PROGRESS)? {
            config.deductions.low_progress = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::LOW_PROGRESS_THRESHOLD)? {
            config.low_progress_threshold = v;
        }
        if let Some(v) = self.parsed::<i64>(scope, config_keys::DEPENDENCY_BUFFER_DAYS)? {
            if !DEPENDENCY_BUFFER_DAYS_RANGE.contains(&v) {
                return Err(ConfigError::InvalidValue {
                    key: config_keys::DEPENDENCY_BUFFER_DAYS.to_string(),
                    value: v.to_string(),
                    message: format!(
                        "超出范围 [{}, {}]",
                        DEPENDENCY_BUFFER_DAYS_RANGE.start(),
                        DEPENDENCY_BUFFER_DAYS_RANGE.end()
                    ),
                });
            }
            config.dependency_buffer_days = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::LEVEL_GREEN)? {
            config.levels.green = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::LEVEL_YELLOW)? {
            config.levels.yellow = v;
        }
        if let Some(v) = self.parsed::<u8>(scope, config_keys::LEVEL_ORANGE)? {
            config.levels.orange = v;
        }
        if let Some(v) = self.get_config_value(scope, config_keys::DEFAULT_TRADE)? {
            if !v.trim().is_empty() {
                config.default_trade = v.trim().to_string();
            }
        }
        if let Some(v) = self.get_config_value(scope, config_keys::LOCALE)? {
            if !v.trim().is_empty() {
                config.locale = v.trim().to_string();
            }
        }
        Ok(())
    }

    /// 读取并解析配置值; 格式错误直接报错, 不静默回退
    fn parsed<T>(&self, scope: &ConfigScope, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(scope, key)? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 健康度扣分
    pub const DEDUCTION_DELAYED: &str = "health_deduction_delayed";
    pub const DEDUCTION_RISK_FLAG: &str = "health_deduction_risk_flag";
    pub const DEDUCTION_OVERDUE: &str = "health_deduction_overdue";
    pub const DEDUCTION_LOW_PROGRESS: &str = "health_deduction_low_progress";
    pub const LOW_PROGRESS_THRESHOLD: &str = "low_progress_threshold";

    // 健康度分段
    pub const LEVEL_GREEN: &str = "health_level_green";
    pub const LEVEL_YELLOW: &str = "health_level_yellow";
    pub const LEVEL_ORANGE: &str = "health_level_orange";

    // 依赖
    pub const DEPENDENCY_BUFFER_DAYS: &str = "dependency_buffer_days";

    // 资源冲突
    pub const DEFAULT_TRADE: &str = "default_trade";

    // 提示语言
    pub const LOCALE: &str = "locale";
}
