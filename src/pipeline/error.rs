// ==========================================
// 检查表报告系统 - 流水线错误类型
// ==========================================
// 职责: 汇聚各层错误，单文件失败不影响批次
// ==========================================

use crate::config::ConfigError;
use crate::engine::ScoreError;
use crate::importer::ImportError;
use crate::report::ReportError;
use thiserror::Error;

/// 流水线错误类型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("评分失败: {0}")]
    Score(#[from] ScoreError),

    #[error("报告生成失败: {0}")]
    Report(#[from] ReportError),

    #[error("输出目录不可用 ({path}): {message}")]
    OutputDir { path: String, message: String },

    #[error("输入目录不可读 ({path}): {message}")]
    InputDir { path: String, message: String },

    #[error("月份格式无效（应为 YYYY-MM）: {0}")]
    InvalidMonth(String),

    #[error("输出写入失败 ({path}): {message}")]
    OutputWrite { path: String, message: String },
}

/// Result 类型别名
pub type PipelineResult<T> = Result<T, PipelineError>;
