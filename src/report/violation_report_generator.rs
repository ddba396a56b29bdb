// ==========================================
// 检查表报告系统 - 违规报告生成器
// ==========================================
// 输入: ViolationReport（至少一条违规）
// 输出: 单工作表 .xlsx（"Отчет о нарушениях"）
// 版式（行号从 1 开始，A-F 列）:
//   1 合并标题 / 2-5 部门、检查日期、检查人、源报告
//   7 表格标题 / 8 表头 / 9 起 每条违规一行
//   表格后空两行 → 汇总 → 空一行 → 签字栏
// ==========================================

use crate::config::ViolationReportProfile;
use crate::domain::{Violation, ViolationReport};
use crate::report::error::{ReportError, ReportResult};
use crate::report::excel_generator::write_text;
use crate::report::formats::ReportFormats;
use crate::report::report_generator_trait::ReportGenerator;
use rust_xlsxwriter::{Format, Image, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const LAST_COL: u16 = 5;
const TABLE_TITLE_ROW: u32 = 6; // 第 7 行
const PHOTO_ROW_HEIGHT: f64 = 80.0;

// ==========================================
// ViolationExcelGenerator - 违规报告生成器
// ==========================================
pub struct ViolationExcelGenerator {
    profile: ViolationReportProfile,
}

impl ViolationExcelGenerator {
    pub fn new(profile: ViolationReportProfile) -> Self {
        Self { profile }
    }

    /// 构建工作簿（不落盘）
    ///
    /// # 返回
    /// - Err(NoViolations): 违规清单为空
    pub fn build_workbook(&self, report: &ViolationReport) -> ReportResult<Workbook> {
        if !report.has_violations() {
            return Err(ReportError::NoViolations(report.original_report_name.clone()));
        }

        let formats = ReportFormats::new();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.profile.sheet_name)?;

        self.setup_columns(sheet)?;
        self.write_header(sheet, report, &formats)?;
        let first_data_row = self.write_table_header(sheet, &formats)?;
        let next_row = self.write_violations(sheet, &report.violations, first_data_row, &formats)?;
        self.write_summary(sheet, report.total_violations, next_row + 2, &formats)?;

        Ok(workbook)
    }

    /// 渲染到内存（由调用方决定何时落盘）
    pub fn render_to_buffer(&self, report: &ViolationReport) -> ReportResult<Vec<u8>> {
        let mut workbook = self.build_workbook(report)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn setup_columns(&self, sheet: &mut Worksheet) -> ReportResult<()> {
        for (col, width) in [8, 25, 25, 15, 50, 30].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width)?;
        }
        Ok(())
    }

    /// 第 1-5 行
    fn write_header(
        &self,
        sheet: &mut Worksheet,
        report: &ViolationReport,
        formats: &ReportFormats,
    ) -> ReportResult<()> {
        let p = &self.profile;

        sheet.merge_range(0, 0, 0, LAST_COL, &p.title, &formats.title)?;

        sheet.write_string_with_format(
            1,
            0,
            field_line(&p.department_label, &report.section_name, ""),
            &formats.label,
        )?;
        sheet.write_string_with_format(
            2,
            0,
            field_line(
                &p.inspection_date_label,
                &report.inspection_date,
                &p.inspection_date_missing,
            ),
            &formats.label,
        )?;
        sheet.write_string_with_format(
            3,
            0,
            field_line(&p.inspector_label, &report.inspector, &p.inspector_missing),
            &formats.label,
        )?;
        sheet.write_string_with_format(
            4,
            0,
            field_line(&p.source_label, &report.original_report_name, ""),
            &formats.note,
        )?;

        Ok(())
    }

    /// 第 7-8 行，返回首个数据行
    fn write_table_header(&self, sheet: &mut Worksheet, formats: &ReportFormats) -> ReportResult<u32> {
        sheet.merge_range(
            TABLE_TITLE_ROW,
            0,
            TABLE_TITLE_ROW,
            LAST_COL,
            &self.profile.table_title,
            &formats.subtitle,
        )?;

        let header_row = TABLE_TITLE_ROW + 1;
        let header_format = formats.shaded_header();
        for (col, header) in self.profile.column_headers.iter().enumerate() {
            write_text(sheet, header_row, col as u16, header, &header_format)?;
        }

        Ok(header_row + 1)
    }

    /// 违规明细，返回表格后的首个空行
    fn write_violations(
        &self,
        sheet: &mut Worksheet,
        violations: &[Violation],
        mut row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<u32> {
        for (i, violation) in violations.iter().enumerate() {
            let (cell, center) = if row % 2 == 1 {
                // 1-based 偶数行
                (&formats.zebra_cell, &formats.zebra_center)
            } else {
                (&formats.cell, &formats.centered)
            };

            sheet.write_number_with_format(row, 0, (i + 1) as f64, center)?;
            write_text(sheet, row, 1, &violation.section_name, cell)?;
            write_text(
                sheet,
                row,
                2,
                violation
                    .subsection_name
                    .as_deref()
                    .unwrap_or(self.profile.no_subsection.as_str()),
                cell,
            )?;
            sheet.write_number_with_format(row, 3, violation.criterion_number, center)?;
            write_text(sheet, row, 4, &violation.comment, cell)?;
            self.write_photo(sheet, row, 5, violation.photo_path.as_deref(), formats)?;
            sheet.set_row_height(row, PHOTO_ROW_HEIGHT)?;

            row += 1;
        }
        Ok(row)
    }

    /// 照片列：文件存在则嵌入缩放后的图片，否则写占位文本
    fn write_photo(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        col: u16,
        photo_path: Option<&str>,
        formats: &ReportFormats,
    ) -> ReportResult<()> {
        let Some(path) = photo_path.map(Path::new).filter(|p| p.exists()) else {
            sheet.write_string_with_format(row, col, &self.profile.photo_placeholder, &formats.placeholder)?;
            return Ok(());
        };

        let inserted = Image::new(path).and_then(|image| {
            sheet.insert_image_fit_to_cell(row, col, &image, true)?;
            Ok(())
        });

        if let Err(e) = inserted {
            warn!(photo = %path.display(), error = %e, "违规照片插入失败");
            sheet.write_string_with_format(
                row,
                col,
                format!("[{}: {}]", self.profile.photo_error_label, e),
                &formats.error_note,
            )?;
        }
        Ok(())
    }

    /// 汇总 + 签字栏
    fn write_summary(
        &self,
        sheet: &mut Worksheet,
        total: usize,
        summary_row: u32,
        formats: &ReportFormats,
    ) -> ReportResult<()> {
        let summary_format = formats.label.clone().set_align(rust_xlsxwriter::FormatAlign::Center);
        sheet.merge_range(
            summary_row,
            0,
            summary_row,
            LAST_COL,
            &format!("{}: {}", self.profile.total_label, total),
            &summary_format,
        )?;

        let signature_format = Format::new().set_align(rust_xlsxwriter::FormatAlign::VerticalCenter);
        let mut row = summary_row + 2;
        for line in &self.profile.signature_lines {
            sheet.merge_range(row, 0, row, LAST_COL, line, &signature_format)?;
            sheet.set_row_height(row, 25)?;
            row += 1;
        }
        Ok(())
    }
}

impl ReportGenerator for ViolationExcelGenerator {
    type Input = ViolationReport;

    fn generate(&self, report: &ViolationReport, output_path: &Path) -> ReportResult<PathBuf> {
        let mut workbook = self.build_workbook(report)?;
        workbook
            .save(output_path)
            .map_err(|e| ReportError::WriteFailure {
                path: output_path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            source = %report.original_report_name,
            output = %output_path.display(),
            violations = report.total_violations,
            "违规报告生成完成"
        );

        Ok(output_path.to_path_buf())
    }
}

/// "标签: 值"，值为空时使用缺省文本
fn field_line(label: &str, value: &str, missing: &str) -> String {
    let value = if value.is_empty() { missing } else { value };
    format!("{}: {}", label, value)
}
