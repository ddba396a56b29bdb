// ==========================================
// 检查表报告系统 - 命令行入口
// ==========================================
// 子命令:
//   parse       检查表 → JSON
//   report      检查表/JSON → 评分报告 .xlsx
//   violations  检查表/JSON → 违规报告 .xlsx
//   run         批处理（JSON + 报告 + 违规报告）
//   monthly     已评分 JSON → 月度汇总模板 + 汇总表
// 退出码: 任一文件失败即非零
// ==========================================

use anyhow::Context;
use checklist_report::importer::JsonStore;
use checklist_report::{logging, AppConfig, MonthlyPipeline, ReportPipeline};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "checklist-report", version, about = "检查表解析、评分与报告生成")]
struct Cli {
    /// 配置文件（JSON，缺省键使用内置默认值）
    #[arg(long, global = true, value_name = "JSON")]
    config: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 解析检查表为 JSON（未指定 -o 时输出到 stdout）
    Parse {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 评分并生成检查表报告
    Report {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// 生成违规报告
    Violations {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// 批处理：逐文件输出 JSON、报告与违规报告
    Run {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// 月度汇总：录入当日得分并生成汇总表
    Monthly {
        /// 月度模板（原位更新）
        #[arg(long, value_name = "JSON")]
        template: PathBuf,

        /// 已评分检查表 JSON 所在目录
        #[arg(long, value_name = "DIR")]
        reports_dir: PathBuf,

        /// 录入日期（缺省为今天）
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,

        /// 月份 YYYY-MM（缺省为本月）
        #[arg(long)]
        month: Option<String>,

        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_json);

    info!(version = checklist_report::VERSION, "{}", checklist_report::APP_NAME);

    let config = AppConfig::load_or_default(cli.config.as_deref()).context("配置加载失败")?;
    let pipeline = ReportPipeline::from_config(&config).context("解析规则编译失败")?;

    match cli.command {
        Command::Parse { input, output } => {
            let doc = pipeline
                .load_document(&input)
                .with_context(|| format!("解析失败: {}", input.display()))?;
            match output {
                Some(path) => {
                    JsonStore::save(&doc, &path)?;
                    println!("{}", path.display());
                }
                None => println!("{}", JsonStore::to_json_string(&doc)?),
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Report { input, output } => {
            let doc = load(&pipeline, &input)?;
            let path = pipeline
                .generate_report(&doc, &output)
                .with_context(|| format!("报告生成失败: {}", input.display()))?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Violations { input, output } => {
            let doc = load(&pipeline, &input)?;
            let path = pipeline
                .generate_violation_report(&doc, &output)
                .with_context(|| format!("违规报告生成失败: {}", input.display()))?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Run { inputs, out_dir } => {
            let report = pipeline.batch_process(&inputs, &out_dir);

            for file in &report.results {
                match &file.result {
                    Ok(outcome) => println!(
                        "OK    {}  score={:.2}  violations={}",
                        file.source.display(),
                        outcome.overall_score,
                        outcome.violation_count
                    ),
                    Err(e) => println!("FAIL  {}  {}", file.source.display(), e),
                }
            }
            println!(
                "batch {}: {} succeeded, {} failed",
                report.batch_id,
                report.succeeded(),
                report.failed()
            );

            Ok(if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Monthly {
            template,
            reports_dir,
            day,
            month,
            out_dir,
        } => {
            let today = Local::now();
            let day = day.unwrap_or_else(|| today.day());
            let month = month.unwrap_or_else(|| today.format("%Y-%m").to_string());

            let outcome = MonthlyPipeline::from_config(&config)
                .update(&template, &reports_dir, day, &month, &out_dir)
                .with_context(|| format!("月度汇总失败: {}", template.display()))?;

            for applied in &outcome.applied {
                println!(
                    "OK    {}  department={}  score={}",
                    applied.source.display(),
                    applied.department_id,
                    applied.score
                );
            }
            for skipped in &outcome.skipped {
                println!("SKIP  {}  {}", skipped.source.display(), skipped.reason);
            }
            for (id, stats) in &outcome.leaf_stats {
                println!(
                    "{:<6} {}: {}/{} days ({}%), current={}, dynamics={}",
                    id,
                    stats.department,
                    stats.filled_days,
                    stats.total_days,
                    stats.completion_percentage,
                    display_score(stats.current_score),
                    display_score(stats.dynamics)
                );
            }
            println!("{}", outcome.report_path.display());

            Ok(if outcome.skipped.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn display_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| s.to_string())
}

fn load(pipeline: &ReportPipeline, input: &Path) -> anyhow::Result<checklist_report::ChecklistDocument> {
    pipeline
        .load_document(input)
        .with_context(|| format!("读取失败: {}", input.display()))
}
