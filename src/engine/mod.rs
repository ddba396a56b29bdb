// ==========================================
// 检查表报告系统 - 引擎层
// ==========================================
// 职责: 评分计算、违规分析、月度汇总（纯计算，不做 IO）
// 红线: 评分只写 total_score / overall_score，不修改检查项
// ==========================================

pub mod error;
pub mod monthly_aggregator;
pub mod score_calculator;
pub mod violation_analyzer;

// 重导出核心引擎
pub use error::{MonthlyError, MonthlyResult, ScoreError, ScoreResult};
pub use monthly_aggregator::MonthlyAggregator;
pub use score_calculator::ScoreCalculator;
pub use violation_analyzer::ViolationAnalyzer;
