// ==========================================
// 检查表报告系统 - 月度汇总流水线
// ==========================================
// 流程: 读取模板 → 扫描已评分 JSON → 部门映射 → 录入日分 → 重算
//       → 渲染汇总表 → 模板与报告一并提交
// 约定: 单个 JSON 无法使用时记录原因并继续
// 红线: 模板只在报告渲染成功后回写
// ==========================================

use crate::config::{AppConfig, MonthlyProfile};
use crate::domain::{DepartmentStats, MonthlyTemplate};
use crate::engine::MonthlyAggregator;
use crate::importer::JsonStore;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::report_pipeline::{ensure_dir, is_json};
use crate::pipeline::staged_output::StagedOutput;
use crate::report::MonthlyExcelGenerator;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// 已录入的日分
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedScore {
    pub source: PathBuf,
    pub department_id: String,
    pub score: f64,
}

/// 未录入的报告及原因
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedReport {
    pub source: PathBuf,
    pub reason: String,
}

/// 月度更新结果
#[derive(Debug, Clone)]
pub struct MonthlyOutcome {
    pub template_path: PathBuf,
    pub report_path: PathBuf,
    pub day: u32,
    pub applied: Vec<AppliedScore>,
    pub skipped: Vec<SkippedReport>,
    pub leaf_stats: Vec<(String, DepartmentStats)>, // (部门 ID, 统计)，模板顺序
}

// ==========================================
// MonthlyPipeline - 月度汇总流水线
// ==========================================
pub struct MonthlyPipeline {
    profile: MonthlyProfile,
    aggregator: MonthlyAggregator,
    generator: MonthlyExcelGenerator,
}

impl MonthlyPipeline {
    pub fn new(profile: MonthlyProfile) -> Self {
        Self {
            aggregator: MonthlyAggregator::new(profile.score_decimals),
            generator: MonthlyExcelGenerator::new(profile.clone()),
            profile,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.monthly.clone())
    }

    /// 用 reports_dir 中的已评分 JSON 更新模板，并输出汇总表
    ///
    /// # 参数
    /// - template_path: 月度模板（原位回写）
    /// - reports_dir: 已评分检查表 JSON 所在目录（不递归）
    /// - day: 录入的日期（1-31）
    /// - month: YYYY-MM，决定输出文件名
    /// - out_dir: 汇总表输出目录
    ///
    /// # 返回
    /// - Ok(MonthlyOutcome): 含逐文件录入/跳过明细
    /// - Err: 月份无效、模板不可读、目录不可读、输出失败
    #[instrument(skip(self, template_path, reports_dir, out_dir), fields(template = %template_path.display()))]
    pub fn update(
        &self,
        template_path: &Path,
        reports_dir: &Path,
        day: u32,
        month: &str,
        out_dir: &Path,
    ) -> PipelineResult<MonthlyOutcome> {
        validate_month(month)?;
        let mut template = JsonStore::load_monthly_template(template_path)?;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        for source in list_reports(reports_dir, template_path)? {
            match self.apply_report(&mut template, &source, day) {
                Ok((department_id, score)) => {
                    info!(source = %source.display(), department = %department_id, day, score, "日分已录入");
                    applied.push(AppliedScore {
                        source,
                        department_id,
                        score,
                    });
                }
                Err(reason) => {
                    warn!(source = %source.display(), reason = %reason, "报告未录入");
                    skipped.push(SkippedReport { source, reason });
                }
            }
        }

        self.aggregator.recalculate(&mut template);

        // === 先渲染，再一并提交 ===
        let summary = self.aggregator.summarize(&template);
        let buffer = self.generator.render_to_buffer(&summary)?;

        ensure_dir(out_dir)?;
        let report_path = out_dir.join(self.generator.file_name(month));
        let mut output = StagedOutput::new();
        output.stage(
            template_path.to_path_buf(),
            JsonStore::monthly_template_to_string(&template)?.into_bytes(),
        );
        output.stage(report_path.clone(), buffer);
        output.commit()?;

        let leaf_stats = template
            .departments
            .iter()
            .filter(|d| d.is_leaf())
            .filter_map(|d| {
                self.aggregator
                    .department_stats(&template, &d.id)
                    .map(|stats| (d.id.clone(), stats))
            })
            .collect();

        info!(
            applied = applied.len(),
            skipped = skipped.len(),
            report = %report_path.display(),
            "月度汇总更新完成"
        );

        Ok(MonthlyOutcome {
            template_path: template_path.to_path_buf(),
            report_path,
            day,
            applied,
            skipped,
            leaf_stats,
        })
    }

    /// 单个报告 → (部门 ID, 得分)，失败时返回原因
    fn apply_report(
        &self,
        template: &mut MonthlyTemplate,
        source: &Path,
        day: u32,
    ) -> Result<(String, f64), String> {
        let doc = JsonStore::load(source).map_err(|e| e.to_string())?;
        let score = doc
            .overall_score
            .ok_or_else(|| "报告未评分（overall_score 为空）".to_string())?;
        if doc.section_name.trim().is_empty() {
            return Err("报告缺少部门名称".to_string());
        }
        let department_id = self
            .profile
            .department_for(&doc.section_name)
            .ok_or_else(|| format!("部门未配置映射: {}", doc.section_name))?
            .to_string();

        self.aggregator
            .add_daily_score(template, &department_id, day, score)
            .map_err(|e| e.to_string())?;
        Ok((department_id, score))
    }
}

fn validate_month(month: &str) -> PipelineResult<()> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| PipelineError::InvalidMonth(month.to_string()))
}

/// 目录下的 .json 文件（按文件名排序，排除模板自身）
fn list_reports(reports_dir: &Path, template_path: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(reports_dir).map_err(|e| PipelineError::InputDir {
        path: reports_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let template = fs::canonicalize(template_path).unwrap_or_else(|_| template_path.to_path_buf());
    let mut reports: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_json(path))
        .filter(|path| fs::canonicalize(path).map_or(true, |p| p != template))
        .collect();
    reports.sort();
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2024-03").is_ok());
        assert!(matches!(validate_month("2024-13"), Err(PipelineError::InvalidMonth(_))));
        assert!(matches!(validate_month("март"), Err(PipelineError::InvalidMonth(_))));
    }

    #[test]
    fn test_list_reports_missing_dir() {
        let result = list_reports(Path::new("/nonexistent/reports"), Path::new("t.json"));
        assert!(matches!(result, Err(PipelineError::InputDir { .. })));
    }
}
