// ==========================================
// 检查表报告系统 - 评分引擎错误类型
// ==========================================

use thiserror::Error;

/// 评分引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error(
        "检查项合规标记矛盾: 章节 {section}{}, 序号 {number}（complies 与 does_not_comply 同时为 true）",
        subdivision_label(.subdivision)
    )]
    ContradictoryCompliance {
        section: String,
        subdivision: Option<String>,
        number: u32,
    },
}

fn subdivision_label(subdivision: &Option<String>) -> String {
    subdivision
        .as_ref()
        .map(|s| format!(" / 子章节 {}", s))
        .unwrap_or_default()
}

/// Result 类型别名
pub type ScoreResult<T> = Result<T, ScoreError>;

/// 月度汇总错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonthlyError {
    #[error("模板中不存在部门: {0}")]
    UnknownDepartment(String),

    #[error("部门 {0} 为聚合部门，不接受日分")]
    NotLeaf(String),

    #[error("部门 {department} 的模板未列出日期 {day}")]
    DayNotInTemplate { department: String, day: u32 },

    #[error("部门 {department} 的日分无效: {score}")]
    InvalidScore { department: String, score: f64 },
}

pub type MonthlyResult<T> = Result<T, MonthlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_location() {
        let err = ScoreError::ContradictoryCompliance {
            section: "B".to_string(),
            subdivision: Some("B1".to_string()),
            number: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("章节 B"));
        assert!(msg.contains("子章节 B1"));
        assert!(msg.contains("序号 3"));

        let err = ScoreError::ContradictoryCompliance {
            section: "A".to_string(),
            subdivision: None,
            number: 1,
        };
        assert!(!err.to_string().contains("子章节"));
    }
}
