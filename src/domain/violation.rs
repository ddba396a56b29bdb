// ==========================================
// 检查表报告系统 - 违规领域模型
// ==========================================
// 用途: 违规分析器输出，违规报告生成器输入
// ==========================================

use serde::{Deserialize, Serialize};

/// 单条违规记录（不符合的检查项）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub section_name: String,            // "A. 章节描述"
    pub subsection_name: Option<String>, // "A1. 子章节描述"，无子章节为 None
    pub criterion_number: u32,
    pub criterion_description: String,
    pub comment: String,

    #[serde(default)]
    pub photo_path: Option<String>, // 来自检查项；报告中文件不存在时写占位文本
}

/// 违规报告数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub original_report_name: String,
    pub inspection_date: String,
    pub section_name: String,
    pub inspector: String,
    pub violations: Vec<Violation>,
    pub total_violations: usize,
}

impl ViolationReport {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}
