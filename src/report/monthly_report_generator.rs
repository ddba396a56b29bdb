// ==========================================
// 检查表报告系统 - 月度汇总报告生成器
// ==========================================
// 输入: MonthlySummary（由 MonthlyAggregator 计算，只读）
// 输出: 单工作表 .xlsx（"Сводная аналитика"）
// 版式（行号从 1 开始）:
//   1 合并标题
//   3-5 表头: A-D 固定列（纵向合并）/ 日分列组（组标题、副标题、日期）
//             / 月度得分列组（组标题、三列子表头纵向合并）
//   6 起 每个部门一行 → 空两行 → 备注（整行合并）
// 规则: 变化量 > 0 绿底，< 0 红底
// ==========================================

use crate::config::MonthlyProfile;
use crate::domain::{MonthlyRow, MonthlySummary};
use crate::report::error::{ReportError, ReportResult};
use crate::report::excel_generator::write_text;
use crate::report::formats::ReportFormats;
use crate::report::report_generator_trait::ReportGenerator;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::info;

const FIXED_COLS: u16 = 4; // A-D
const HEADER_ROW: u32 = 2; // 第 3 行
const DAY_ROW: u32 = 4; // 第 5 行
const FIRST_DATA_ROW: u32 = 5; // 第 6 行

const GAIN_COLOR: u32 = 0xC6EFCE;
const LOSS_COLOR: u32 = 0xFFC7CE;

/// 列布局（由日期数决定）
#[derive(Debug, Clone, Copy)]
struct Columns {
    day_count: u16,
}

impl Columns {
    fn day(&self, index: usize) -> u16 {
        FIXED_COLS + index as u16
    }

    fn total(&self, index: u16) -> u16 {
        FIXED_COLS + self.day_count + index
    }

    fn last(&self) -> u16 {
        self.total(2)
    }
}

/// 月度汇总专用样式
struct MonthlyFormats {
    base: ReportFormats,
    header: Format,
    score: Format,
    gain: Format,
    loss: Format,
    note: Format,
}

impl MonthlyFormats {
    fn new(decimals: u32) -> Self {
        let base = ReportFormats::new();
        let num_format = number_format(decimals);
        let score = base.centered.clone().set_num_format(&num_format);
        Self {
            header: base.shaded_header(),
            gain: score.clone().set_background_color(GAIN_COLOR),
            loss: score.clone().set_background_color(LOSS_COLOR),
            score,
            note: Format::new().set_text_wrap().set_align(FormatAlign::Left),
            base,
        }
    }
}

// ==========================================
// MonthlyExcelGenerator - 月度汇总报告生成器
// ==========================================
pub struct MonthlyExcelGenerator {
    profile: MonthlyProfile,
}

impl MonthlyExcelGenerator {
    pub fn new(profile: MonthlyProfile) -> Self {
        Self { profile }
    }

    /// 输出文件名：<前缀>_<YYYY-MM>.xlsx
    pub fn file_name(&self, month: &str) -> String {
        format!("{}_{}.xlsx", self.profile.file_prefix, month)
    }

    /// 构建工作簿（不落盘）
    pub fn build_workbook(&self, summary: &MonthlySummary) -> ReportResult<Workbook> {
        let formats = MonthlyFormats::new(self.profile.score_decimals);
        let columns = Columns {
            day_count: summary.days.len() as u16,
        };

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.profile.sheet_name)?;

        self.setup_columns(sheet, columns)?;
        sheet.merge_range(0, 0, 0, columns.last(), &summary.title, &formats.base.title)?;
        self.write_table_header(sheet, summary, columns, &formats)?;

        let mut row = FIRST_DATA_ROW;
        for data in &summary.rows {
            self.write_row(sheet, data, row, columns, &formats)?;
            row += 1;
        }

        row += 2;
        for note in &summary.notes {
            sheet.merge_range(row, 0, row, columns.last(), note, &formats.note)?;
            row += 1;
        }

        Ok(workbook)
    }

    /// 渲染到内存
    pub fn render_to_buffer(&self, summary: &MonthlySummary) -> ReportResult<Vec<u8>> {
        let mut workbook = self.build_workbook(summary)?;
        Ok(workbook.save_to_buffer()?)
    }

    fn setup_columns(&self, sheet: &mut Worksheet, columns: Columns) -> ReportResult<()> {
        for (col, width) in [(0u16, 8), (1, 25), (2, 15), (3, 40)] {
            sheet.set_column_width(col, width)?;
        }
        for index in 0..columns.day_count as usize {
            sheet.set_column_width(columns.day(index), 8)?;
        }
        sheet.set_column_width(columns.total(0), 15)?;
        sheet.set_column_width(columns.total(1), 15)?;
        sheet.set_column_width(columns.total(2), 12)?;
        Ok(())
    }

    fn write_table_header(
        &self,
        sheet: &mut Worksheet,
        summary: &MonthlySummary,
        columns: Columns,
        formats: &MonthlyFormats,
    ) -> ReportResult<()> {
        let header = &formats.header;

        for (col, text) in self.profile.column_headers.iter().enumerate() {
            let col = col as u16;
            sheet.merge_range(HEADER_ROW, col, DAY_ROW, col, text, header)?;
        }

        if columns.day_count > 0 {
            let first = columns.day(0);
            let last = columns.day(summary.days.len() - 1);
            merge_or_write(sheet, HEADER_ROW, first, HEADER_ROW, last, &self.profile.daily_header, header)?;
            merge_or_write(sheet, HEADER_ROW + 1, first, HEADER_ROW + 1, last, &self.profile.day_subheader, header)?;
            for (index, day) in summary.days.iter().enumerate() {
                sheet.write_number_with_format(DAY_ROW, columns.day(index), *day, header)?;
            }
        }

        sheet.merge_range(
            HEADER_ROW,
            columns.total(0),
            HEADER_ROW,
            columns.last(),
            &self.profile.total_header,
            header,
        )?;
        for (index, text) in self.profile.total_subheaders.iter().enumerate() {
            let col = columns.total(index as u16);
            sheet.merge_range(HEADER_ROW + 1, col, DAY_ROW, col, text, header)?;
        }
        Ok(())
    }

    fn write_row(
        &self,
        sheet: &mut Worksheet,
        data: &MonthlyRow,
        row: u32,
        columns: Columns,
        formats: &MonthlyFormats,
    ) -> ReportResult<()> {
        let cell = &formats.base.cell;
        write_text(sheet, row, 0, &data.id, &formats.base.centered)?;
        write_text(sheet, row, 1, &data.name, cell)?;
        write_text(sheet, row, 2, &data.form_type, cell)?;
        write_text(sheet, row, 3, &data.description, cell)?;

        for (index, score) in data.day_scores.iter().enumerate() {
            write_score(sheet, row, columns.day(index), *score, &formats.score)?;
        }

        write_score(sheet, row, columns.total(0), data.score.current, &formats.score)?;
        write_score(sheet, row, columns.total(1), data.score.previous, &formats.score)?;
        let dynamics_format = match data.score.dynamics {
            Some(d) if d > 0.0 => &formats.gain,
            Some(d) if d < 0.0 => &formats.loss,
            _ => &formats.score,
        };
        write_score(sheet, row, columns.total(2), data.score.dynamics, dynamics_format)?;
        Ok(())
    }
}

impl ReportGenerator for MonthlyExcelGenerator {
    type Input = MonthlySummary;

    fn generate(&self, summary: &MonthlySummary, output_path: &Path) -> ReportResult<PathBuf> {
        let mut workbook = self.build_workbook(summary)?;
        workbook
            .save(output_path)
            .map_err(|e| ReportError::WriteFailure {
                path: output_path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            output = %output_path.display(),
            departments = summary.rows.len(),
            days = summary.days.len(),
            "月度汇总报告生成完成"
        );

        Ok(output_path.to_path_buf())
    }
}

/// 单格区域不能合并，改为直接写入
fn merge_or_write(
    sheet: &mut Worksheet,
    first_row: u32,
    first_col: u16,
    last_row: u32,
    last_col: u16,
    text: &str,
    format: &Format,
) -> ReportResult<()> {
    if first_row == last_row && first_col == last_col {
        sheet.write_string_with_format(first_row, first_col, text, format)?;
    } else {
        sheet.merge_range(first_row, first_col, last_row, last_col, text, format)?;
    }
    Ok(())
}

fn write_score(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    score: Option<f64>,
    format: &Format,
) -> ReportResult<()> {
    match score {
        Some(value) => sheet.write_number_with_format(row, col, value, format)?,
        None => sheet.write_blank(row, col, format)?,
    };
    Ok(())
}

/// "0" / "0.0" / "0.00" ...
fn number_format(decimals: u32) -> String {
    if decimals == 0 {
        "0".to_string()
    } else {
        format!("0.{}", "0".repeat(decimals as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthlyScore;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::TempDir;

    fn sample_summary(days: Vec<u32>) -> MonthlySummary {
        let day_count = days.len();
        MonthlySummary {
            title: "Сводная аналитика по культуре производства".to_string(),
            days,
            rows: vec![
                MonthlyRow {
                    id: "1".to_string(),
                    name: "УПП".to_string(),
                    form_type: String::new(),
                    description: "сводно".to_string(),
                    day_scores: vec![Some(0.7); day_count],
                    score: MonthlyScore {
                        current: Some(0.7),
                        previous: Some(0.9),
                        dynamics: Some(-0.2),
                    },
                },
                MonthlyRow {
                    id: "1.1".to_string(),
                    name: "Отделение раздува".to_string(),
                    form_type: "ЧЛ-1".to_string(),
                    description: String::new(),
                    day_scores: vec![None; day_count],
                    score: MonthlyScore::default(),
                },
            ],
            notes: vec!["* динамика относительно предыдущего месяца".to_string()],
        }
    }

    fn cell(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
        range
            .get_value((row, col))
            .map(|d| d.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_layout_aligns_days_and_totals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("monthly.xlsx");

        MonthlyExcelGenerator::new(MonthlyProfile::default())
            .generate(&sample_summary(vec![1, 2, 3]), &path)
            .unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range("Сводная аналитика").unwrap();

        assert_eq!(cell(&range, 0, 0), "Сводная аналитика по культуре производства");
        assert_eq!(cell(&range, 2, 0), "№ п/п");
        assert_eq!(cell(&range, 2, 3), "ПОЯСНЕНИЯ");
        // 日分列组从 E 列开始
        assert_eq!(cell(&range, 2, 4), "ОЦЕНКА ЗА ДЕНЬ");
        assert_eq!(cell(&range, 3, 4), "Число месяца");
        assert_eq!(cell(&range, 4, 4), "1");
        assert_eq!(cell(&range, 4, 6), "3");
        // 月度得分列组紧随日期列
        assert_eq!(cell(&range, 2, 7), "ИТОГОВАЯ ОЦЕНКА ЗА МЕСЯЦ (ДИНАМИКА)");
        assert_eq!(cell(&range, 3, 7), "за текущий месяц");
        assert_eq!(cell(&range, 3, 8), "за предыдущий месяц");
        assert_eq!(cell(&range, 3, 9), "динамика");

        assert_eq!(cell(&range, 5, 0), "1");
        assert_eq!(cell(&range, 5, 1), "УПП");
        assert_eq!(cell(&range, 5, 4), "0.7");
        assert_eq!(cell(&range, 5, 7), "0.7");
        assert_eq!(cell(&range, 5, 8), "0.9");
        assert_eq!(cell(&range, 5, 9), "-0.2");
        assert_eq!(cell(&range, 6, 2), "ЧЛ-1");
        assert_eq!(cell(&range, 6, 4), "");
        assert_eq!(cell(&range, 6, 7), "");

        // 数据后空两行为备注
        assert_eq!(cell(&range, 9, 0), "* динамика относительно предыдущего месяца");
    }

    #[test]
    fn test_single_day_template() {
        let generator = MonthlyExcelGenerator::new(MonthlyProfile::default());
        let buffer = generator.render_to_buffer(&sample_summary(vec![15])).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_template_without_days() {
        let generator = MonthlyExcelGenerator::new(MonthlyProfile::default());
        assert!(generator.render_to_buffer(&sample_summary(Vec::new())).is_ok());
    }

    #[test]
    fn test_file_name() {
        let generator = MonthlyExcelGenerator::new(MonthlyProfile::default());
        assert_eq!(generator.file_name("2024-03"), "сводный_отчет_2024-03.xlsx");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number_format(0), "0");
        assert_eq!(number_format(1), "0.0");
        assert_eq!(number_format(2), "0.00");
    }
}
