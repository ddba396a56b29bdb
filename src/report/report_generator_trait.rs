// ==========================================
// 检查表报告系统 - 报告生成接口 Trait
// ==========================================
// 职责: 定义报告输出接口（不包含实现）
// 实现者: ChecklistExcelGenerator, ViolationExcelGenerator, MonthlyExcelGenerator
// ==========================================

use crate::report::error::ReportResult;
use std::path::{Path, PathBuf};

pub trait ReportGenerator: Send + Sync {
    /// 报告输入数据
    type Input;

    /// 生成报告文件
    ///
    /// # 参数
    /// - input: 报告数据（只读，不修改）
    /// - output_path: 输出路径（已存在则覆盖）
    ///
    /// # 返回
    /// - Ok(PathBuf): 实际写出的路径
    /// - Err: 写入失败、无可输出内容
    fn generate(&self, input: &Self::Input, output_path: &Path) -> ReportResult<PathBuf>;
}
