// ==========================================
// 施工进度计划分析引擎 - 核心库
// ==========================================
// 职责: 依赖校验 / 资源冲突 / 关键路径 / 健康度 / 综合报告
// 技术栈: Rust + SQLite
// 系统定位: 决策支持 (引擎只读快照, 不回写节点)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 快照访问
pub mod repository;

// 引擎层 - 分析规则
pub mod engine;

// 导入层 - 外部进度计划文件
pub mod importer;

// 配置层 - 引擎参数与行业模板
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 分析接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MilestonePriority, MilestoneStatus, RiskLevel};

// 领域实体与分析结果
pub use domain::{
    CriticalPathResult, IssuedReport, Milestone, MilestoneHealth, ProgrammeReport,
    ResourceConflict,
};

// 引擎
pub use engine::{
    ConflictDetector, CriticalPathAnalyzer, DependencyValidator, HealthScorer, ReportEngine,
};

// 配置
pub use config::{EngineConfig, TemplateCatalog};

// API
pub use api::{ApiError, ApiResult, ProgrammeApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "施工进度计划分析引擎";
