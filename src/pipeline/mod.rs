// ==========================================
// 检查表报告系统 - 流水线层
// ==========================================
// 职责: 串联导入/评分/报告，提供单文件、批处理与月度汇总入口
// ==========================================

pub mod error;
pub mod monthly_pipeline;
pub mod report_pipeline;
pub mod staged_output;

// 重导出核心类型
pub use error::{PipelineError, PipelineResult};
pub use monthly_pipeline::{AppliedScore, MonthlyOutcome, MonthlyPipeline, SkippedReport};
pub use report_pipeline::{BatchReport, FileResult, ProcessOutcome, ReportPipeline};
pub use staged_output::StagedOutput;
