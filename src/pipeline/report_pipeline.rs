// ==========================================
// 检查表报告系统 - 报告流水线
// ==========================================
// 流程: 解析/读取 → 评分 → JSON → 检查表报告 → 违规报告（有违规时）
// 批处理: 顺序处理，单文件失败记录后继续
// 红线: 评分成功之前不写任何报告文件；单文件输出整体提交，失败不留残余
// ==========================================

use crate::config::AppConfig;
use crate::domain::{ChecklistDocument, ChecklistStats};
use crate::engine::{ScoreCalculator, ViolationAnalyzer};
use crate::importer::{ChecklistParser, JsonStore};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::staged_output::StagedOutput;
use crate::report::{ChecklistExcelGenerator, ReportGenerator, ViolationExcelGenerator};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// 单文件处理结果
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub source: PathBuf,
    pub json_path: Option<PathBuf>, // 源文件本身为 JSON 时不再写出
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub overall_score: f64,
    pub violation_count: usize,
    pub stats: ChecklistStats,
}

/// 批次中的单个文件
#[derive(Debug)]
pub struct FileResult {
    pub source: PathBuf,
    pub result: PipelineResult<ProcessOutcome>,
}

/// 批处理报告
#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: String,
    pub started_at: DateTime<Local>,
    pub elapsed_ms: u128,
    pub results: Vec<FileResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

// ==========================================
// ReportPipeline - 报告流水线
// ==========================================
pub struct ReportPipeline {
    parser: ChecklistParser,
    calculator: ScoreCalculator,
    analyzer: ViolationAnalyzer,
    report_generator: ChecklistExcelGenerator,
    violation_generator: ViolationExcelGenerator,
}

impl ReportPipeline {
    /// 按配置构建（正则在此一次性编译）
    pub fn from_config(config: &AppConfig) -> PipelineResult<Self> {
        Ok(Self {
            parser: ChecklistParser::from_profile(&config.parser)?,
            calculator: ScoreCalculator::new(),
            analyzer: ViolationAnalyzer::new(),
            report_generator: ChecklistExcelGenerator::new(config.report.clone()),
            violation_generator: ViolationExcelGenerator::new(config.report.violation.clone()),
        })
    }

    /// 读取检查表：.json 直接反序列化，其余按表格解析
    ///
    /// JSON 中的相对照片路径按源文件所在目录解析（该位置文件存在时）
    pub fn load_document(&self, source: &Path) -> PipelineResult<ChecklistDocument> {
        if is_json(source) {
            let mut doc = JsonStore::load(source)?;
            if let Some(base_dir) = source.parent() {
                resolve_photo_paths(&mut doc, base_dir);
            }
            Ok(doc)
        } else {
            Ok(self.parser.parse_file(source)?)
        }
    }

    /// 评分并生成检查表报告
    ///
    /// # 返回
    /// - Ok(PathBuf): 报告路径
    /// - Err: 评分失败（不写文件）或写入失败
    pub fn generate_report(&self, doc: &ChecklistDocument, output_path: &Path) -> PipelineResult<PathBuf> {
        let scored = self.calculator.calculate_all_scores(doc.clone())?;
        Ok(self.report_generator.generate(&scored, output_path)?)
    }

    /// 生成违规报告（无违规时返回 NoViolations）
    pub fn generate_violation_report(
        &self,
        doc: &ChecklistDocument,
        output_path: &Path,
    ) -> PipelineResult<PathBuf> {
        let violations = self.analyzer.analyze(doc)?;
        Ok(self.violation_generator.generate(&violations, output_path)?)
    }

    /// 处理单个文件
    ///
    /// # 输出（out_dir 下）
    /// - <stem>.json（源文件为 JSON 时跳过）
    /// - <stem>_report.xlsx
    /// - <stem>_violations.xlsx（有违规时）
    #[instrument(skip(self, source, out_dir), fields(source = %source.display()))]
    pub fn process_file(&self, source: &Path, out_dir: &Path) -> PipelineResult<ProcessOutcome> {
        ensure_dir(out_dir)?;

        let doc = self.load_document(source)?;
        let scored = self.calculator.calculate_all_scores(doc)?;
        let violations = self.analyzer.analyze(&scored)?;

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("checklist")
            .to_string();

        // === 步骤 1: 全部输出先在内存中渲染 ===
        let mut output = StagedOutput::new();

        let json_path = if is_json(source) {
            None
        } else {
            let path = out_dir.join(format!("{}.json", stem));
            output.stage(path.clone(), JsonStore::to_json_string(&scored)?.into_bytes());
            Some(path)
        };

        let report_path = out_dir.join(format!("{}_report.xlsx", stem));
        output.stage(report_path.clone(), self.report_generator.render_to_buffer(&scored)?);

        let violations_path = if violations.has_violations() {
            let path = out_dir.join(format!("{}_violations.xlsx", stem));
            output.stage(path.clone(), self.violation_generator.render_to_buffer(&violations)?);
            Some(path)
        } else {
            None
        };

        // === 步骤 2: 一并提交（失败时不留下任何输出） ===
        output.commit()?;

        let outcome = ProcessOutcome {
            source: source.to_path_buf(),
            json_path,
            report_path,
            violations_path,
            overall_score: scored.overall_score.unwrap_or(0.0),
            violation_count: violations.total_violations,
            stats: scored.stats(),
        };

        info!(
            overall_score = outcome.overall_score,
            violations = outcome.violation_count,
            criteria = outcome.stats.criteria,
            "文件处理完成"
        );

        Ok(outcome)
    }

    /// 批处理（顺序执行，单文件失败不中断）
    #[instrument(skip(self, files, out_dir), fields(files = files.len()))]
    pub fn batch_process(&self, files: &[PathBuf], out_dir: &Path) -> BatchReport {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Local::now();
        let start = Instant::now();

        info!(batch_id = %batch_id, out_dir = %out_dir.display(), "批处理开始");

        let mut results = Vec::with_capacity(files.len());
        for source in files {
            let result = self.process_file(source, out_dir);
            if let Err(e) = &result {
                error!(batch_id = %batch_id, source = %source.display(), error = %e, "文件处理失败");
            }
            results.push(FileResult {
                source: source.clone(),
                result,
            });
        }

        let report = BatchReport {
            batch_id,
            started_at,
            elapsed_ms: start.elapsed().as_millis(),
            results,
        };

        if report.all_succeeded() {
            info!(
                batch_id = %report.batch_id,
                succeeded = report.succeeded(),
                elapsed_ms = report.elapsed_ms as u64,
                "批处理完成"
            );
        } else {
            warn!(
                batch_id = %report.batch_id,
                succeeded = report.succeeded(),
                failed = report.failed(),
                elapsed_ms = report.elapsed_ms as u64,
                "批处理完成（存在失败文件）"
            );
        }

        report
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// 相对照片路径改写为 base_dir 下的路径（仅当该文件存在）
fn resolve_photo_paths(doc: &mut ChecklistDocument, base_dir: &Path) {
    for section in doc.sections.values_mut() {
        let subdivision_criteria = section
            .subdivisions
            .values_mut()
            .flat_map(|sub| sub.criteria.iter_mut());
        for criterion in section.criteria.iter_mut().chain(subdivision_criteria) {
            let Some(photo) = criterion.photo_path.as_deref() else {
                continue;
            };
            if Path::new(photo).is_absolute() {
                continue;
            }
            let candidate = base_dir.join(photo);
            if candidate.is_file() {
                criterion.photo_path = Some(candidate.display().to_string());
            }
        }
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> PipelineResult<()> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::OutputDir {
        path: dir.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Criterion, Section};
    use crate::engine::ScoreError;
    use tempfile::TempDir;

    fn pipeline() -> ReportPipeline {
        ReportPipeline::from_config(&AppConfig::default()).unwrap()
    }

    fn sample_document(with_violation: bool) -> ChecklistDocument {
        let mut doc = ChecklistDocument::new("sample.xlsx");
        let mut a = Section::new("Общие требования");
        a.criteria.push(Criterion::new(1, "Чистота").with_compliance(true));
        a.criteria
            .push(Criterion::new(2, "Освещение").with_compliance(!with_violation));
        doc.sections.insert("A".to_string(), a);
        doc
    }

    #[test]
    fn test_generate_report_does_not_mutate_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.xlsx");
        let doc = sample_document(false);

        let written = pipeline().generate_report(&doc, &path).unwrap();
        assert!(written.exists());
        assert_eq!(doc.overall_score, None);
    }

    #[test]
    fn test_generate_report_skips_write_on_score_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.xlsx");
        let mut doc = sample_document(false);
        if let Some(a) = doc.sections.get_mut("A") {
            a.criteria[0].does_not_comply = Some(true);
        }

        let result = pipeline().generate_report(&doc, &path);
        assert!(matches!(
            result,
            Err(PipelineError::Score(ScoreError::ContradictoryCompliance { .. }))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_process_json_source() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("upp.json");
        JsonStore::save(&sample_document(true), &source).unwrap();

        let out_dir = dir.path().join("out");
        let outcome = pipeline().process_file(&source, &out_dir).unwrap();

        assert_eq!(outcome.json_path, None);
        assert!(outcome.report_path.ends_with("upp_report.xlsx"));
        assert!(outcome.report_path.exists());
        assert_eq!(outcome.violation_count, 1);
        assert!(outcome
            .violations_path
            .as_ref()
            .is_some_and(|p| p.ends_with("upp_violations.xlsx") && p.exists()));
        assert_eq!(outcome.overall_score, 0.5);
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Path::new("a/b.JSON")));
        assert!(!is_json(Path::new("a/b.xlsx")));
        assert!(!is_json(Path::new("json")));
    }
}
