// ==========================================
// 施工进度计划分析引擎 - 报告命令行入口
// ==========================================
// 用法:
//   programme-report <plan.csv|plan.xlsx> [选项]
//   programme-report [--db <db_path>] --project <id> [选项]
//   programme-report [--db <db_path>] --import <plan.csv|plan.xlsx>
//
// 未指定 --db 时使用默认快照库 (PROGRAMME_ENGINE_DB_PATH 或用户数据目录)
//
// 选项:
//   --project <id>      项目ID (文件缺少 project_id 列时作为默认项目)
//   --as-of <YYYY-MM-DD> 固定分析日期
//   --template <path>   行业模板 JSON, 或 "standard" 使用内置住宅模板
//   --locale <en|zh-CN> 提示文本语言
//   --json-log          JSON 格式日志
//
// 报告以 JSON 输出到 stdout, 日志输出到 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use programme_engine::app::{default_db_path, AppContext};
use programme_engine::config::TemplateCatalog;
use programme_engine::importer::{MilestoneFieldMapper, MilestoneImporter};
use programme_engine::repository::InMemoryMilestoneSource;
use programme_engine::{logging, EngineConfig, ProgrammeApi};
use std::sync::Arc;

#[derive(Debug, Default)]
struct CliArgs {
    file: Option<String>,
    db_path: Option<String>,
    project_id: Option<String>,
    import: Option<String>,
    as_of: Option<NaiveDate>,
    template: Option<String>,
    locale: Option<String>,
    json_log: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{} 需要参数值", name))
        };

        match arg.as_str() {
            "--db" => cli.db_path = Some(value("--db")?),
            "--project" => cli.project_id = Some(value("--project")?),
            "--import" => cli.import = Some(value("--import")?),
            "--template" => cli.template = Some(value("--template")?),
            "--locale" => cli.locale = Some(value("--locale")?),
            "--as-of" => {
                let raw = value("--as-of")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("--as-of 日期格式错误: {}", raw))?;
                cli.as_of = Some(date);
            }
            "--json-log" => cli.json_log = true,
            other if other.starts_with("--") => bail!("未知选项: {}", other),
            other => {
                if cli.file.replace(other.to_string()).is_some() {
                    bail!("只能指定一个计划文件");
                }
            }
        }
    }

    Ok(cli)
}

/// 运行模式
#[derive(Debug, PartialEq, Eq)]
enum RunMode<'a> {
    /// 直接分析计划文件, 不落库
    File(&'a str),
    /// 导入计划文件到快照库
    Import { db_path: String, file: &'a str },
    /// 从快照库读取项目生成报告
    Report { db_path: String, project_id: &'a str },
}

impl CliArgs {
    /// 解析运行模式; db_path 参数缺省时由 default_db 提供
    fn run_mode(&self, default_db: impl FnOnce() -> String) -> Result<RunMode<'_>> {
        if let (Some(file), None) = (self.file.as_deref(), self.db_path.as_deref()) {
            return Ok(RunMode::File(file));
        }
        if self.file.is_some() {
            bail!("快照库模式下计划文件请通过 --import 指定");
        }

        if let Some(file) = self.import.as_deref() {
            let db_path = self.db_path.clone().unwrap_or_else(default_db);
            return Ok(RunMode::Import { db_path, file });
        }

        let Some(project_id) = self.project_id.as_deref() else {
            bail!("请指定计划文件, 或使用 --project <id> / --import <file>");
        };
        let db_path = self.db_path.clone().unwrap_or_else(default_db);
        Ok(RunMode::Report { db_path, project_id })
    }
}

fn load_template(source: &str) -> Result<TemplateCatalog> {
    if source.eq_ignore_ascii_case("standard") {
        return Ok(TemplateCatalog::standard_residential());
    }
    TemplateCatalog::from_json_file(source)
}

fn configure(mut api_config: EngineConfig, cli: &CliArgs) -> Result<ProgrammeApi> {
    if let Some(locale) = &cli.locale {
        api_config = api_config.with_locale(locale.clone());
    }

    let mut api = ProgrammeApi::new(api_config);
    if let Some(as_of) = cli.as_of {
        api = api.with_as_of(as_of);
    }
    if let Some(source) = &cli.template {
        api = api.with_template(Arc::new(load_template(source)?));
    }
    Ok(api)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args()?;
    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", programme_engine::APP_NAME, programme_engine::VERSION);

    let mut mapper = MilestoneFieldMapper::new();
    if let Some(project_id) = &cli.project_id {
        mapper = mapper.with_default_project(project_id.clone());
    }
    let importer = MilestoneImporter::new(mapper);

    match cli.run_mode(default_db_path)? {
        RunMode::File(file) => {
            let milestones = importer.load_file(file)?;
            let source = InMemoryMilestoneSource::from_milestones(milestones);
            let project_ids = match &cli.project_id {
                Some(id) => vec![id.clone()],
                None => source.project_ids(),
            };

            let api = configure(EngineConfig::default(), &cli)?;
            let mut reports = Vec::with_capacity(project_ids.len());
            for result in api.report_for_projects(&source, &project_ids).await {
                reports.push(ProgrammeApi::issue(result?));
            }
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        RunMode::Import { db_path, file } => {
            let ctx = AppContext::new(db_path.clone())?;
            tracing::info!("使用数据库: {}", db_path);

            let summary = importer.import_to_repository(file, &ctx.milestone_repo)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        RunMode::Report { db_path, project_id } => {
            let ctx = AppContext::new(db_path.clone())?;
            tracing::info!("使用数据库: {}", db_path);

            let stored_config = ctx.programme_api(Some(project_id))?.config().clone();
            let api = configure(stored_config, &cli)?;
            let report = api
                .report_for_project(ctx.milestone_repo.as_ref(), project_id)
                .await?;
            println!("{}", serde_json::to_string_pretty(&ProgrammeApi::issue(report))?);
        }
    }

    Ok(())
}
