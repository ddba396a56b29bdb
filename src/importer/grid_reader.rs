// ==========================================
// 检查表报告系统 - 单元格网格读取器
// ==========================================
// 职责: 表格来源 → 行序列（保留列位置，空单元格不入文本）
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv) / 内存网格
// ==========================================

use crate::importer::checklist_importer_trait::GridSource;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

// ==========================================
// 网格数据结构
// ==========================================

/// 非空单元格（列号从 0 开始，值已去除首尾空白）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub column: usize,
    pub value: String,
}

/// 一行非空单元格（按列号递增）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridRow {
    pub index: usize, // 源行号（从 0 开始）
    pub cells: Vec<GridCell>,
}

impl GridRow {
    /// 由 (列号, 原始文本) 构造，空白单元格被丢弃
    pub fn from_values<I, S>(index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: AsRef<str>,
    {
        let cells = values
            .into_iter()
            .filter_map(|(column, raw)| {
                let value = raw.as_ref().trim();
                if value.is_empty() {
                    None
                } else {
                    Some(GridCell {
                        column,
                        value: value.to_string(),
                    })
                }
            })
            .collect();

        Self { index, cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 指定列的单元格
    pub fn cell_at(&self, column: usize) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.column == column)
    }

    /// 全部单元格文本（单空格连接）
    pub fn joined_text(&self) -> String {
        join_values(self.cells.iter())
    }

    /// 除指定列以外的单元格文本（单空格连接）
    pub fn text_excluding(&self, column: usize) -> String {
        join_values(self.cells.iter().filter(|c| c.column != column))
    }
}

fn join_values<'a>(cells: impl Iterator<Item = &'a GridCell>) -> String {
    cells
        .map(|c| c.value.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 单元格网格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    rows: Vec<GridRow>,
}

impl CellGrid {
    pub fn new(rows: Vec<GridRow>) -> Self {
        Self { rows }
    }

    /// 由字符串矩阵构造（列号取矩阵下标，空字符串视为空单元格）
    ///
    /// # 示例
    /// ```
    /// use checklist_report::importer::CellGrid;
    /// let grid = CellGrid::from_rows(vec![vec!["A", "Общие требования"], vec!["1", "Чистота"]]);
    /// assert_eq!(grid.len(), 2);
    /// ```
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| GridRow::from_values(index, row.into_iter().enumerate()))
            .collect();
        Self { rows }
    }

    /// 行序列（惰性迭代，不复制）
    pub fn rows(&self) -> impl Iterator<Item = &GridRow> + '_ {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 全文：每行非空单元格以空格连接，行之间以换行连接（空行跳过）
    pub fn full_text(&self) -> String {
        self.rows
            .iter()
            .filter(|r| !r.is_empty())
            .map(GridRow::joined_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ==========================================
// Excel Reader 实现
// ==========================================
pub struct ExcelGridReader;

impl ExcelGridReader {
    const EXTENSIONS: [&'static str; 4] = ["xlsx", "xlsm", "xls", "ods"];
}

impl GridSource for ExcelGridReader {
    fn read_grid(&self, file_path: &Path) -> ImportResult<CellGrid> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if !Self::EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开工作簿
        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet（活动工作表）
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 区域起点（已用区域可能不从 A1 开始）
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let rows = range
            .rows()
            .enumerate()
            .map(|(row_offset, data_row)| {
                GridRow::from_values(
                    start_row + row_offset,
                    data_row
                        .iter()
                        .enumerate()
                        .filter(|(_, cell)| !matches!(cell, Data::Empty))
                        .map(|(col_offset, cell)| (start_col + col_offset, cell_text(cell))),
                )
            })
            .collect::<Vec<_>>();

        debug!(
            sheet = %sheet_name,
            rows = rows.len(),
            "Excel 工作表读取完成"
        );

        Ok(CellGrid::new(rows))
    }
}

// ==========================================
// CSV Reader 实现
// ==========================================
// 无表头，允许行长度不一致
pub struct CsvGridReader;

impl GridSource for CsvGridReader {
    fn read_grid(&self, file_path: &Path) -> ImportResult<CellGrid> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            rows.push(GridRow::from_values(row_idx, record.iter().enumerate()));
        }

        debug!(rows = rows.len(), "CSV 读取完成");

        Ok(CellGrid::new(rows))
    }
}

// ==========================================
// 通用读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalGridReader;

impl GridSource for UniversalGridReader {
    fn read_grid(&self, file_path: &Path) -> ImportResult<CellGrid> {
        match extension_of(file_path).as_str() {
            "csv" => CsvGridReader.read_grid(file_path),
            "xlsx" | "xlsm" | "xls" | "ods" => ExcelGridReader.read_grid(file_path),
            other => {
                if !file_path.exists() {
                    return Err(ImportError::FileNotFound(file_path.display().to_string()));
                }
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

/// 单元格显示文本（日期型单元格按 DD.MM.YYYY 输出，而非序列号）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
