// ==========================================
// 检查表报告系统 - 核心库
// ==========================================
// 职责: 检查表解析 → 评分 → Excel 报告 / 违规报告 → 月度汇总
// 技术栈: calamine + rust_xlsxwriter + serde
// 系统定位: 批处理工具（单线程、逐文件独立）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 检查表树与违规记录
pub mod domain;

// 配置层 - 解析规则与报告文案
pub mod config;

// 导入层 - 表格读取与结构解析
pub mod importer;

// 引擎层 - 评分与违规分析
pub mod engine;

// 报告层 - Excel 输出
pub mod report;

// 流水线 - 单文件/批处理入口
pub mod pipeline;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ChecklistDocument, Compliance, Criterion, MonthlyTemplate, Section, Subdivision, Violation,
    ViolationReport,
};

// 配置
pub use config::{AppConfig, MonthlyProfile, ParserProfile, ReportProfile};

// 导入
pub use importer::{ChecklistParser, JsonStore};

// 引擎
pub use engine::{MonthlyAggregator, ScoreCalculator, ViolationAnalyzer};

// 报告
pub use report::{
    ChecklistExcelGenerator, MonthlyExcelGenerator, ReportGenerator, ViolationExcelGenerator,
};

// 流水线
pub use pipeline::{
    BatchReport, MonthlyOutcome, MonthlyPipeline, PipelineError, ProcessOutcome, ReportPipeline,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "检查表报告系统";
