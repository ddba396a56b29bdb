// ==========================================
// 检查表报告系统 - 结构解析器（状态机）
// ==========================================
// 状态: NoSection → InSection ⇄ InSubsection
// 输入: 逐行 RowKind（由 RowClassifier 产出）
// 输出: 章节树 + overall_score = None
// 约定: 不报错；无法挂载的行计入 dropped
// 红线: 章节/子章节标题关闭上一上下文（含续行目标）
// ==========================================

use crate::config::{ConfigResult, ParserProfile};
use crate::domain::{Criterion, Section, SectionMap, Subdivision};
use crate::importer::grid_reader::CellGrid;
use crate::importer::row_classifier::{RowClassifier, RowKind};
use serde::Serialize;
use tracing::debug;

/// 解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    NoSection,
    InSection,
    InSubsection,
}

/// 解析结果（尚未评分）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedStructure {
    pub sections: SectionMap,
    pub overall_score: Option<f64>,
}

/// 解析统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    pub rows_seen: usize,
    pub sections: usize,
    pub subsections: usize,
    pub criteria: usize,
    pub score_markers: usize,
    pub continuations: usize,
    pub ignored: usize,
    pub dropped: usize, // 分类成功但无可挂载的上下文
}

/// 续行目标（按键定位，不持有引用）
#[derive(Debug, Clone)]
struct CriterionRef {
    section: String,
    subsection: Option<String>,
    index: usize,
}

/// 解析游标
#[derive(Debug, Default)]
struct Cursor {
    section: Option<String>,
    subsection: Option<String>,
    last_criterion: Option<CriterionRef>,
}

impl Cursor {
    fn state(&self) -> ParserState {
        match (&self.section, &self.subsection) {
            (None, _) => ParserState::NoSection,
            (Some(_), None) => ParserState::InSection,
            (Some(_), Some(_)) => ParserState::InSubsection,
        }
    }
}

// ==========================================
// StructureParser - 结构解析器
// ==========================================
pub struct StructureParser {
    classifier: RowClassifier,
}

impl StructureParser {
    pub fn new(classifier: RowClassifier) -> Self {
        Self { classifier }
    }

    pub fn from_profile(profile: &ParserProfile) -> ConfigResult<Self> {
        Ok(Self::new(RowClassifier::from_profile(profile)?))
    }

    /// 解析网格为章节树
    pub fn parse(&self, grid: &CellGrid) -> ParsedStructure {
        self.parse_with_summary(grid).0
    }

    /// 解析网格为章节树，并返回逐类统计
    pub fn parse_with_summary(&self, grid: &CellGrid) -> (ParsedStructure, ParseSummary) {
        let mut sections = SectionMap::new();
        let mut cursor = Cursor::default();
        let mut summary = ParseSummary::default();

        for row in grid.rows() {
            summary.rows_seen += 1;
            let kind = self.classifier.classify_row(row);
            apply_row(&mut sections, &mut cursor, &mut summary, kind);
        }

        debug!(
            rows = summary.rows_seen,
            sections = summary.sections,
            subsections = summary.subsections,
            criteria = summary.criteria,
            continuations = summary.continuations,
            ignored = summary.ignored,
            dropped = summary.dropped,
            final_state = ?cursor.state(),
            "结构解析完成"
        );

        (
            ParsedStructure {
                sections,
                overall_score: None,
            },
            summary,
        )
    }
}

/// 状态转移（单行）
fn apply_row(
    sections: &mut SectionMap,
    cursor: &mut Cursor,
    summary: &mut ParseSummary,
    kind: RowKind,
) {
    match kind {
        RowKind::Ignored(_) => summary.ignored += 1,

        RowKind::SectionHeader { key, description } => {
            // 重复键：原位置替换
            sections.insert(key.clone(), Section::new(description));
            cursor.section = Some(key);
            cursor.subsection = None;
            // 续行目标随标题清空：标题之后的无键文本不并入上一组的检查项
            cursor.last_criterion = None;
            summary.sections += 1;
        }

        RowKind::SubsectionHeader { key, description } => {
            let Some(section) = current_section(sections, cursor) else {
                summary.dropped += 1;
                return;
            };
            section
                .subdivisions
                .insert(key.clone(), Subdivision::new(description));
            cursor.subsection = Some(key);
            // 同上，子章节标题同样关闭续行
            cursor.last_criterion = None;
            summary.subsections += 1;
        }

        RowKind::Criterion {
            number,
            description,
        } => {
            let Some(section_key) = cursor.section.clone() else {
                summary.dropped += 1;
                return;
            };
            let Some(section) = sections.get_mut(&section_key) else {
                summary.dropped += 1;
                return;
            };
            let criteria = match cursor.subsection.as_ref() {
                Some(sub_key) => match section.subdivisions.get_mut(sub_key) {
                    Some(sub) => &mut sub.criteria,
                    None => {
                        summary.dropped += 1;
                        return;
                    }
                },
                None => &mut section.criteria,
            };
            criteria.push(Criterion::new(number, description));
            cursor.last_criterion = Some(CriterionRef {
                section: section_key,
                subsection: cursor.subsection.clone(),
                index: criteria.len() - 1,
            });
            summary.criteria += 1;
        }

        RowKind::ScoreMarker => {
            let Some(section) = current_section(sections, cursor) else {
                summary.dropped += 1;
                return;
            };
            match cursor
                .subsection
                .as_ref()
                .and_then(|k| section.subdivisions.get_mut(k))
            {
                Some(sub) => sub.total_score = None,
                None => section.total_score = None,
            }
            summary.score_markers += 1;
        }

        RowKind::Continuation { text } => {
            let target = match cursor.last_criterion.as_ref() {
                Some(target) => resolve_criterion(sections, target),
                None => None,
            };
            match target {
                Some(criterion) => {
                    criterion.description.push(' ');
                    criterion.description.push_str(&text);
                    summary.continuations += 1;
                }
                None => summary.dropped += 1,
            }
        }
    }
}

fn current_section<'a>(sections: &'a mut SectionMap, cursor: &Cursor) -> Option<&'a mut Section> {
    sections.get_mut(cursor.section.as_deref()?)
}

fn resolve_criterion<'a>(
    sections: &'a mut SectionMap,
    target: &CriterionRef,
) -> Option<&'a mut Criterion> {
    let section = sections.get_mut(&target.section)?;
    let criteria = match &target.subsection {
        Some(sub_key) => &mut section.subdivisions.get_mut(sub_key)?.criteria,
        None => &mut section.criteria,
    };
    criteria.get_mut(target.index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> StructureParser {
        StructureParser::from_profile(&ParserProfile::default()).unwrap()
    }

    #[test]
    fn test_section_without_criteria() {
        let grid = CellGrid::from_rows(vec![vec!["A", "Safety criteria"]]);
        let parsed = parser().parse(&grid);

        let section = &parsed.sections["A"];
        assert_eq!(section.description, "Safety criteria");
        assert!(section.criteria.is_empty());
        assert!(section.subdivisions.is_empty());
        assert_eq!(parsed.overall_score, None);
    }

    #[test]
    fn test_continuation_appends_to_last_criterion() {
        let grid = CellGrid::from_rows(vec![
            vec!["A", "Общие требования"],
            vec!["1", "Чистота"],
            vec!["", "continued description"],
        ]);
        let parsed = parser().parse(&grid);

        assert_eq!(
            parsed.sections["A"].criteria[0].description,
            "Чистота continued description"
        );
    }

    #[test]
    fn test_criteria_go_to_active_subsection() {
        let grid = CellGrid::from_rows(vec![
            vec!["B", "Оборудование"],
            vec!["B1", "Станки"],
            vec!["1", "Ограждения"],
            vec!["2", "Заземление"],
            vec!["B2", "Прессы"],
            vec!["1", "Кнопка аварийной остановки"],
        ]);
        let (parsed, summary) = parser().parse_with_summary(&grid);

        let b = &parsed.sections["B"];
        assert!(b.criteria.is_empty());
        assert_eq!(b.subdivisions["B1"].criteria.len(), 2);
        assert_eq!(b.subdivisions["B2"].criteria.len(), 1);
        assert_eq!(summary.subsections, 2);
        assert_eq!(summary.criteria, 3);
    }

    #[test]
    fn test_header_closes_continuation_target() {
        let grid = CellGrid::from_rows(vec![
            vec!["A", "Общие требования"],
            vec!["1", "Чистота"],
            vec!["B", "Оборудование"],
            vec!["", "осиротевший текст"],
        ]);
        let (parsed, summary) = parser().parse_with_summary(&grid);

        assert_eq!(parsed.sections["A"].criteria[0].description, "Чистота");
        assert_eq!(parsed.sections["B"].description, "Оборудование");
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_subsection_header_closes_continuation_target() {
        let grid = CellGrid::from_rows(vec![
            vec!["B", "Оборудование"],
            vec!["B1", "Станки"],
            vec!["1", "Ограждения"],
            vec!["B2", "Прессы"],
            vec!["", "текст после заголовка"],
            vec!["1", "Маркировка"],
            vec!["", "шкафов"],
        ]);
        let (parsed, summary) = parser().parse_with_summary(&grid);

        let b = &parsed.sections["B"];
        assert_eq!(b.subdivisions["B1"].criteria[0].description, "Ограждения");
        assert_eq!(b.subdivisions["B2"].criteria[0].description, "Маркировка шкафов");
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.continuations, 1);
    }

    #[test]
    fn test_rows_before_first_section_dropped() {
        let grid = CellGrid::from_rows(vec![
            vec!["УПП", "", "Дата проведения проверки 01.02.2024"],
            vec!["1", "без раздела"],
            vec!["A1", "без раздела"],
            vec!["A", "Общие требования"],
        ]);
        let (parsed, summary) = parser().parse_with_summary(&grid);

        assert_eq!(parsed.sections.len(), 1);
        assert!(parsed.sections["A"].criteria.is_empty());
        assert_eq!(summary.dropped, 3);
    }

    #[test]
    fn test_ignored_rows_keep_state() {
        let grid = CellGrid::from_rows(vec![
            vec!["A", "Общие требования"],
            vec!["1", "Чистота"],
            vec!["", "Страница 1 из 2"],
            vec!["", "хвост"],
        ]);
        let parsed = parser().parse(&grid);

        assert_eq!(parsed.sections["A"].criteria[0].description, "Чистота хвост");
    }

    #[test]
    fn test_duplicate_section_replaced_in_place() {
        let grid = CellGrid::from_rows(vec![
            vec!["A", "первый"],
            vec!["1", "x"],
            vec!["B", "второй"],
            vec!["A", "повтор"],
        ]);
        let parsed = parser().parse(&grid);

        let keys: Vec<&str> = parsed.sections.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(parsed.sections["A"].description, "повтор");
        assert!(parsed.sections["A"].criteria.is_empty());
    }

    #[test]
    fn test_score_marker_keeps_scores_null() {
        let grid = CellGrid::from_rows(vec![
            vec!["A", "Общие требования"],
            vec!["1", "Чистота"],
            vec!["", "Общий балл за раздел A", "0.5"],
            vec!["", "хвост"],
        ]);
        let (parsed, summary) = parser().parse_with_summary(&grid);

        assert_eq!(parsed.sections["A"].total_score, None);
        assert_eq!(summary.score_markers, 1);
        // 总分行之后仍可续写上一检查项
        assert_eq!(parsed.sections["A"].criteria[0].description, "Чистота хвост");
    }

    #[test]
    fn test_empty_grid() {
        let parsed = parser().parse(&CellGrid::default());
        assert!(parsed.sections.is_empty());
        assert_eq!(parsed.overall_score, None);
    }
}
