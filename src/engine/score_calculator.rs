// ==========================================
// 检查表报告系统 - 评分引擎
// ==========================================
// 输入: 已解析的 ChecklistDocument
// 输出: 各级 total_score + overall_score
// 规则:
//   - 子章节得分 = 合规数 / 检查项数（空 → 0.0）
//   - 章节得分: 有子章节 → 非空子章节得分均值（空子章节不计入分母）
//              无子章节 → 直挂检查项合规率
//   - 总分 = 全部章节得分均值（空章节以 0.0 计入）
// 红线: 除零一律得 0.0；评分前先校验合规标记，矛盾即报错且不写入任何分数
// ==========================================

use crate::domain::{ChecklistDocument, Criterion, Section, Subdivision};
use crate::engine::error::{ScoreError, ScoreResult};
use tracing::{debug, instrument};

// ==========================================
// ScoreCalculator - 评分引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreCalculator;

impl ScoreCalculator {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 单组得分
    // ==========================================

    /// 合规率（complies == true 的占比）
    pub fn compliance_rate(criteria: &[Criterion]) -> f64 {
        if criteria.is_empty() {
            return 0.0;
        }
        let compliant = criteria.iter().filter(|c| c.is_compliant()).count();
        compliant as f64 / criteria.len() as f64
    }

    pub fn subdivision_score(sub: &Subdivision) -> f64 {
        Self::compliance_rate(&sub.criteria)
    }

    /// 章节得分
    ///
    /// # 说明
    /// - 有子章节时，章节直挂检查项不参与计算
    pub fn section_score(section: &Section) -> f64 {
        if section.has_subdivisions() {
            let scores: Vec<f64> = section
                .subdivisions
                .values()
                .filter(|sub| !sub.criteria.is_empty())
                .map(Self::subdivision_score)
                .collect();
            mean(&scores)
        } else {
            Self::compliance_rate(&section.criteria)
        }
    }

    // ==========================================
    // 文档评分
    // ==========================================

    /// 校验全部检查项的合规标记
    pub fn validate(&self, doc: &ChecklistDocument) -> ScoreResult<()> {
        for location in doc.criteria_with_location() {
            if location.criterion.compliance().is_err() {
                return Err(ScoreError::ContradictoryCompliance {
                    section: location.section.to_string(),
                    subdivision: location.subdivision.map(str::to_string),
                    number: location.criterion.number,
                });
            }
        }
        Ok(())
    }

    /// 原地评分
    #[instrument(skip(self, doc), fields(file = %doc.file_name))]
    pub fn calculate_in_place(&self, doc: &mut ChecklistDocument) -> ScoreResult<()> {
        self.validate(doc)?;

        let mut section_scores = Vec::with_capacity(doc.sections.len());
        for (key, section) in doc.sections.iter_mut() {
            let score = Self::section_score(section);
            section.total_score = Some(score);
            section_scores.push(score);

            for sub in section.subdivisions.values_mut() {
                sub.total_score = Some(Self::subdivision_score(sub));
            }

            debug!(section = %key, score, "章节评分完成");
        }

        let overall = mean(&section_scores);
        doc.overall_score = Some(overall);

        debug!(
            sections = section_scores.len(),
            overall_score = overall,
            "文档评分完成"
        );
        Ok(())
    }

    /// 评分并返回文档
    pub fn calculate_all_scores(&self, mut doc: ChecklistDocument) -> ScoreResult<ChecklistDocument> {
        self.calculate_in_place(&mut doc)?;
        Ok(doc)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
