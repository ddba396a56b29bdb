// ==========================================
// 检查表报告系统 - 违规分析器
// ==========================================
// 输入: ChecklistDocument（评分与否均可）
// 输出: ViolationReport
// 规则: 合规判定为 DoesNotComply 的检查项即为违规（与说明是否为空无关）
// 顺序: 章节顺序 → 直挂检查项 → 子章节顺序
// ==========================================

use crate::domain::{ChecklistDocument, Compliance, Violation, ViolationReport};
use crate::engine::error::{ScoreError, ScoreResult};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct ViolationAnalyzer;

impl ViolationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 提取违规清单
    ///
    /// # 返回
    /// - Err(ContradictoryCompliance): 存在合规标记矛盾的检查项
    pub fn analyze(&self, doc: &ChecklistDocument) -> ScoreResult<ViolationReport> {
        let mut violations = Vec::new();

        for location in doc.criteria_with_location() {
            let compliance =
                location
                    .criterion
                    .compliance()
                    .map_err(|_| ScoreError::ContradictoryCompliance {
                        section: location.section.to_string(),
                        subdivision: location.subdivision.map(str::to_string),
                        number: location.criterion.number,
                    })?;

            if compliance != Compliance::DoesNotComply {
                continue;
            }

            let Some(section) = doc.sections.get(location.section) else {
                continue;
            };

            let subsection_name = location
                .subdivision
                .and_then(|key| section.subdivisions.get(key).map(|sub| (key, sub)))
                .filter(|(_, sub)| !sub.description.is_empty())
                .map(|(key, sub)| label(key, &sub.description));

            violations.push(Violation {
                section_name: label(location.section, &section.description),
                subsection_name,
                criterion_number: location.criterion.number,
                criterion_description: location.criterion.description.clone(),
                comment: location.criterion.comment.clone(),
                photo_path: location.criterion.photo_path.clone(),
            });
        }

        debug!(
            file = %doc.file_name,
            violations = violations.len(),
            "违规分析完成"
        );

        Ok(ViolationReport {
            original_report_name: doc.file_name.clone(),
            inspection_date: doc.inspection_date.clone(),
            section_name: doc.section_name.clone(),
            inspector: doc.inspector.clone(),
            total_violations: violations.len(),
            violations,
        })
    }
}

/// "键. 描述"
fn label(key: &str, description: &str) -> String {
    format!("{}. {}", key, description)
}
