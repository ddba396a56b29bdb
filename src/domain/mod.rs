// ==========================================
// 检查表报告系统 - 领域层
// ==========================================
// 职责: 检查表树形模型、合规判定、违规记录、月度汇总
// ==========================================

pub mod checklist;
pub mod monthly;
pub mod types;
pub mod violation;

// 重导出核心类型
pub use checklist::{
    ChecklistDocument, ChecklistStats, Criterion, CriterionLocation, Section, SectionMap,
    Subdivision, SubdivisionMap,
};
pub use monthly::{
    Department, DepartmentKind, DepartmentStats, MonthlyRow, MonthlyScore, MonthlySummary,
    MonthlyTemplate,
};
pub use types::{Compliance, ContradictoryFlags};
pub use violation::{Violation, ViolationReport};
