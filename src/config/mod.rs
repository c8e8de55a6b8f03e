// ==========================================
// 施工进度计划分析引擎 - 配置层
// ==========================================
// 职责: 引擎参数管理,支持 global / 项目两级覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;
pub mod template_catalog;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult, ConfigScope};
pub use engine_config::{EngineConfig, HealthDeductions, HealthLevelThresholds};
pub use template_catalog::{TemplateCatalog, TemplateMilestone};
