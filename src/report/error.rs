// ==========================================
// 检查表报告系统 - 报告层错误类型
// ==========================================

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// 报告生成错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("报告写入失败 ({path}): {message}")]
    WriteFailure { path: String, message: String },

    #[error("Excel 生成失败: {0}")]
    XlsxError(String),

    #[error("无违规项，不生成违规报告: {0}")]
    NoViolations(String),
}

// 实现 From<XlsxError>
impl From<XlsxError> for ReportError {
    fn from(err: XlsxError) -> Self {
        ReportError::XlsxError(err.to_string())
    }
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
