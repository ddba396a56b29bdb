// ==========================================
// 检查表报告系统 - 检查表 Excel 报告生成器
// ==========================================
// 输入: 已评分的 ChecklistDocument（只读）
// 输出: 单工作表 .xlsx（已存在则覆盖）
// 版式（行号从 1 开始，A-E 列）:
//   1 版本日期 / 2 部门 + 检查日期 / 3 检查人
//   5 标题 / 6-7 表头 / 8 起 章节 → 子章节 → 检查项 → 本组总分
//   末尾 总评分 → 空一行 → 签字栏 → 脚注
// ==========================================

use crate::config::ReportProfile;
use crate::domain::{ChecklistDocument, Criterion, Section};
use crate::report::error::{ReportError, ReportResult};
use crate::report::formats::{round2, ReportFormats};
use crate::report::report_generator_trait::ReportGenerator;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

const COL_NUMBER: u16 = 0;
const COL_DESCRIPTION: u16 = 1;
const COL_COMPLIES: u16 = 2;
const COL_NOT_COMPLIES: u16 = 3;
const COL_COMMENT: u16 = 4;

const FIRST_DATA_ROW: u32 = 7; // 第 8 行

// ==========================================
// ChecklistExcelGenerator - 检查表报告生成器
// ==========================================
pub struct ChecklistExcelGenerator {
    profile: ReportProfile,
}

impl ChecklistExcelGenerator {
    pub fn new(profile: ReportProfile) -> Self {
        Self { profile }
    }

    /// 构建工作簿（不落盘）
    pub fn build_workbook(&self, doc: &ChecklistDocument) -> ReportResult<Workbook> {
        let formats = ReportFormats::new();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.profile.sheet_name)?;

        self.setup_columns(sheet)?;
        self.write_header(sheet, doc, &formats)?;
        self.write_table_header(sheet, &formats)?;

        let mut row = FIRST_DATA_ROW;
        for (key, section) in &doc.sections {
            row = self.write_section(sheet, key, section, row, &formats)?;
        }

        row = self.write_overall(sheet, doc.overall_score, row, &formats)?;
        self.write_signature(sheet, row + 2, &formats)?;

        Ok(workbook)
    }

    /// 生成报告到内存
    pub fn render_to_buffer(&self, doc: &ChecklistDocument) -> ReportResult<Vec<u8>> {
        let mut workbook = self.build_workbook(doc)?;
        Ok(workbook.save_to_buffer()?)
    }

    // ==========================================
    // 版式
    // ==========================================

    fn setup_columns(&self, sheet: &mut Worksheet) -> ReportResult<()> {
        sheet.set_column_width(COL_NUMBER, 8)?;
        sheet.set_column_width(COL_DESCRIPTION, 60)?;
        sheet.set_column_width(COL_COMPLIES, 14)?;
        sheet.set_column_width(COL_NOT_COMPLIES, 14)?;
        sheet.set_column_width(COL_COMMENT, 50)?;
        Ok(())
    }

    /// 第 1-3 行：版本日期、部门、检查日期、检查人
    fn write_header(
        &self,
        sheet: &mut Worksheet,
        doc: &ChecklistDocument,
        formats: &ReportFormats,
    ) -> ReportResult<()> {
        let p = &self.profile;

        if !doc.revision_date.is_empty() {
            sheet.write_string(0, 0, join_label(&p.revision_prefix, &doc.revision_date))?;
        }

        write_text(sheet, 1, 0, &doc.section_name, &formats.bold)?;
        sheet.write_string(
            1,
            COL_COMPLIES,
            join_label(&p.inspection_date_label, &doc.inspection_date),
        )?;

        if !doc.inspector.is_empty() {
            sheet.write_string(2, 0, join_label(&p.inspector_label, &doc.inspector))?;
        }

        Ok(())
    }

    /// 第 5-7 行：标题与两级表头
    fn write_table_header(&self, sheet: &mut Worksheet, formats: &ReportFormats) -> ReportResult<()> {
        let p = &self.profile;

        sheet.write_string_with_format(4, 0, &p.title, &formats.bold)?;

        for (col, header) in p.column_headers.iter().enumerate() {
            write_text(sheet, 5, col as u16, header, &formats.header)?;
        }

        sheet.write_blank(6, COL_NUMBER, &formats.header)?;
        sheet.write_blank(6, COL_DESCRIPTION, &formats.header)?;
        write_text(sheet, 6, COL_COMPLIES, &p.complies_label, &formats.header)?;
        write_text(sheet, 6, COL_NOT_COMPLIES, &p.does_not_comply_label, &formats.header)?;
        sheet.write_blank(6, COL_COMMENT, &formats.header)?;

        Ok(())
    }

    /// 章节块，返回下一可用行
    ///
    /// # 说明
    /// - 有子章节时只输出子章节及其检查项
    fn write_section(
        &self,
        sheet: &mut Worksheet,
        key: &str,
        section: &Section,
        mut row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<u32> {
        write_text(sheet, row, COL_NUMBER, key, &formats.bold)?;
        write_text(sheet, row, COL_DESCRIPTION, &section.description, &formats.bold)?;
        row += 1;

        if section.has_subdivisions() {
            for (sub_key, sub) in &section.subdivisions {
                write_text(sheet, row, COL_NUMBER, sub_key, &formats.bold)?;
                write_text(sheet, row, COL_DESCRIPTION, &sub.description, &formats.bold)?;
                row += 1;

                row = self.write_criteria(sheet, &sub.criteria, row, formats)?;
                row = self.write_group_total(sheet, sub_key, sub.total_score, row, formats)?;
            }
        } else {
            row = self.write_criteria(sheet, &section.criteria, row, formats)?;
        }

        self.write_group_total(sheet, key, section.total_score, row, formats)
    }

    fn write_criteria(
        &self,
        sheet: &mut Worksheet,
        criteria: &[Criterion],
        mut row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<u32> {
        for criterion in criteria {
            sheet.write_number_with_format(row, COL_NUMBER, criterion.number, &formats.centered)?;
            write_text(sheet, row, COL_DESCRIPTION, &criterion.description, &formats.cell)?;
            write_flag(sheet, row, COL_COMPLIES, criterion.complies, formats)?;
            write_flag(sheet, row, COL_NOT_COMPLIES, criterion.does_not_comply, formats)?;
            write_text(sheet, row, COL_COMMENT, &criterion.comment, &formats.cell)?;
            row += 1;
        }
        Ok(row)
    }

    /// 本组总分行（未评分则不输出），其后空一行
    fn write_group_total(
        &self,
        sheet: &mut Worksheet,
        key: &str,
        score: Option<f64>,
        row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<u32> {
        let Some(score) = score else {
            return Ok(row);
        };

        sheet.write_string_with_format(
            row,
            COL_DESCRIPTION,
            join_label(&self.profile.section_total_label, key),
            &formats.bold,
        )?;
        sheet.write_number_with_format(row, COL_COMPLIES, round2(score), &formats.score)?;
        Ok(row + 2)
    }

    fn write_overall(
        &self,
        sheet: &mut Worksheet,
        overall: Option<f64>,
        row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<u32> {
        sheet.write_string_with_format(row, COL_DESCRIPTION, &self.profile.overall_label, &formats.bold)?;
        sheet.write_number_with_format(
            row,
            COL_COMPLIES,
            overall.map(round2).unwrap_or(0.0),
            &formats.score,
        )?;
        Ok(row)
    }

    /// 签字栏 + 脚注
    fn write_signature(&self, sheet: &mut Worksheet, mut row: u32, formats: &ReportFormats) -> ReportResult<()> {
        for line in &self.profile.signature_lines {
            write_text(sheet, row, COL_NUMBER, line, &formats.text)?;
            row += 1;
        }
        for note in &self.profile.footnotes {
            write_text(sheet, row, COL_NUMBER, note, &formats.note)?;
            row += 1;
        }
        Ok(())
    }
}

impl ReportGenerator for ChecklistExcelGenerator {
    type Input = ChecklistDocument;

    fn generate(&self, doc: &ChecklistDocument, output_path: &Path) -> ReportResult<PathBuf> {
        let mut workbook = self.build_workbook(doc)?;
        workbook
            .save(output_path)
            .map_err(|e| ReportError::WriteFailure {
                path: output_path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            file = %doc.file_name,
            output = %output_path.display(),
            sections = doc.sections.len(),
            "检查表报告生成完成"
        );

        Ok(output_path.to_path_buf())
    }
}

/// "标签 值"（值为空时只保留标签）
pub(crate) fn join_label(label: &str, value: &str) -> String {
    if value.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", label, value)
    }
}

/// 非空文本才写入，空文本写带样式的空白单元格
pub(crate) fn write_text(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &rust_xlsxwriter::Format,
) -> ReportResult<()> {
    if text.is_empty() {
        sheet.write_blank(row, col, format)?;
    } else {
        sheet.write_string_with_format(row, col, text, format)?;
    }
    Ok(())
}

/// 合规标记：true → 1，false → 0，未检查 → 空白
fn write_flag(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    flag: Option<bool>,
    formats: &ReportFormats,
) -> ReportResult<()> {
    match flag {
        Some(value) => {
            sheet.write_number_with_format(row, col, u8::from(value), &formats.centered)?;
        }
        None => {
            sheet.write_blank(row, col, &formats.centered)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Subdivision;
    use crate::engine::ScoreCalculator;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::TempDir;

    fn scored_document() -> ChecklistDocument {
        let mut doc = ChecklistDocument::new("form.xlsx");
        doc.revision_date = "01.01.2024".to_string();
        doc.inspection_date = "15.03.2024".to_string();
        doc.section_name = "УПП".to_string();
        doc.inspector = "Иванов".to_string();

        let mut a = Section::new("Общие требования");
        a.criteria.push(Criterion::new(1, "Чистота").with_compliance(true));
        a.criteria.push(Criterion::new(2, "Освещение").with_compliance(true));
        a.criteria
            .push(Criterion::new(3, "Проходы").with_compliance(false).with_comment("загромождены"));
        doc.sections.insert("A".to_string(), a);

        let mut b = Section::new("Оборудование");
        let mut b1 = Subdivision::new("Станки");
        b1.criteria.push(Criterion::new(1, "Ограждения").with_compliance(true));
        b1.criteria.push(Criterion::new(2, "Заземление"));
        b.subdivisions.insert("B1".to_string(), b1);
        doc.sections.insert("B".to_string(), b);

        ScoreCalculator::new().calculate_all_scores(doc).unwrap()
    }

    fn cell(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
        range
            .get_value((row, col))
            .map(|d| d.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_generate_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let doc = scored_document();

        let generator = ChecklistExcelGenerator::new(ReportProfile::default());
        let written = generator.generate(&doc, &path).unwrap();
        assert_eq!(written, path);

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Лист1").unwrap();

        assert_eq!(cell(&range, 0, 0), "Редакция от 01.01.2024");
        assert_eq!(cell(&range, 1, 0), "УПП");
        assert_eq!(cell(&range, 1, 2), "Дата проведения проверки 15.03.2024");
        assert_eq!(cell(&range, 2, 0), "Проверку проводил Иванов");
        assert_eq!(cell(&range, 5, 0), "№ п/п");
        assert_eq!(cell(&range, 6, 2), "соответствует");
        assert_eq!(cell(&range, 6, 3), "не соответствует");

        // 第 8 行起：章节 A
        assert_eq!(cell(&range, 7, 0), "A");
        assert_eq!(cell(&range, 7, 1), "Общие требования");
        assert_eq!(cell(&range, 8, 0), "1");
        assert_eq!(cell(&range, 8, 2), "1");
        assert_eq!(cell(&range, 8, 3), "0");
        assert_eq!(cell(&range, 10, 4), "загромождены");
        assert_eq!(cell(&range, 11, 1), "Общий балл за раздел A");
        assert_eq!(cell(&range, 11, 2), "0.67");

        // 空一行后：章节 B / 子章节 B1
        assert_eq!(cell(&range, 13, 0), "B");
        assert_eq!(cell(&range, 14, 0), "B1");
        assert_eq!(cell(&range, 16, 2), "");
        assert_eq!(cell(&range, 17, 1), "Общий балл за раздел B1");
        assert_eq!(cell(&range, 17, 2), "0.5");
        assert_eq!(cell(&range, 19, 1), "Общий балл за раздел B");

        // 总评分：(2/3 + 1/2) / 2
        assert_eq!(cell(&range, 21, 1), "Итоговая оценка структурному подразделению");
        assert_eq!(cell(&range, 21, 2), "0.58");
        assert!(cell(&range, 23, 0).starts_with("Проверку проводил ____"));
        assert_eq!(cell(&range, 24, 0), "должность подпись расшифровка подпись");
    }

    #[test]
    fn test_unscored_document_writes_zero_overall() {
        let mut doc = ChecklistDocument::new("raw.xlsx");
        doc.sections
            .insert("A".to_string(), Section::new("Общие требования"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.xlsx");
        ChecklistExcelGenerator::new(ReportProfile::default())
            .generate(&doc, &path)
            .unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Лист1").unwrap();
        // 无总分行：章节标题后直接是总评分
        assert_eq!(cell(&range, 7, 0), "A");
        assert_eq!(cell(&range, 8, 1), "Итоговая оценка структурному подразделению");
        assert_eq!(cell(&range, 8, 2), "0");
        // 文档本身未被修改
        assert_eq!(doc.overall_score, None);
    }

    #[test]
    fn test_footnotes_follow_signature() {
        let profile = ReportProfile {
            footnotes: vec!["* оценка 1 - соответствует".to_string()],
            ..ReportProfile::default()
        };
        let doc = ScoreCalculator::new()
            .calculate_all_scores(ChecklistDocument::new("empty.xlsx"))
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.xlsx");
        ChecklistExcelGenerator::new(profile).generate(&doc, &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Лист1").unwrap();
        // 总评分在第 8 行，签字栏第 10-11 行，脚注第 12 行
        assert_eq!(cell(&range, 7, 2), "0");
        assert_eq!(cell(&range, 11, 0), "* оценка 1 - соответствует");
    }

    #[test]
    fn test_write_failure_reports_path() {
        let doc = ChecklistDocument::new("x.xlsx");
        let result = ChecklistExcelGenerator::new(ReportProfile::default())
            .generate(&doc, Path::new("/nonexistent/dir/report.xlsx"));
        assert!(matches!(result, Err(ReportError::WriteFailure { .. })));
    }

    #[test]
    fn test_render_to_buffer() {
        let bytes = ChecklistExcelGenerator::new(ReportProfile::default())
            .render_to_buffer(&scored_document())
            .unwrap();
        // xlsx 为 zip 容器
        assert_eq!(&bytes[..2], b"PK");
    }
}
