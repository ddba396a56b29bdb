// ==========================================
// 检查表报告系统 - 导入接口 Trait
// ==========================================
// 职责: 定义表格来源读取接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::grid_reader::CellGrid;
use std::path::Path;

// ==========================================
// GridSource Trait
// ==========================================
// 用途: 表格来源读取（阶段 0）
// 实现者: ExcelGridReader, CsvGridReader, UniversalGridReader
pub trait GridSource: Send + Sync {
    /// 读取文件为单元格网格
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(CellGrid): 行序列（空单元格不计入文本，但保留列位置）
    /// - Err: 文件不存在、格式不支持、解析失败
    ///
    /// # 说明
    /// - 只读，不修改源文件
    fn read_grid(&self, file_path: &Path) -> ImportResult<CellGrid>;
}
