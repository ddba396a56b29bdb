// ==========================================
// 检查表报告系统 - 报告层
// ==========================================
// 职责: 已评分数据 → Excel 报告（检查表报告 / 违规报告 / 月度汇总）
// 红线: 只读输入数据，不做评分
// ==========================================

pub mod error;
pub mod excel_generator;
pub mod formats;
pub mod monthly_report_generator;
pub mod report_generator_trait;
pub mod violation_report_generator;

// 重导出核心类型
pub use error::{ReportError, ReportResult};
pub use excel_generator::ChecklistExcelGenerator;
pub use formats::{round2, ReportFormats};
pub use monthly_report_generator::MonthlyExcelGenerator;
pub use violation_report_generator::ViolationExcelGenerator;

// 重导出 Trait 接口
pub use report_generator_trait::ReportGenerator;
