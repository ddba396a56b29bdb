// ==========================================
// 检查表报告系统 - 月度汇总模型
// ==========================================
// 模板: 标题 + 月内日期列 + 部门列表（叶子 / 聚合）+ 备注
// 叶子部门: 按日录入得分（仅模板已列出的日期）
// 聚合部门: 由 aggregated_from 所列部门的月度得分求均值
// 存储: JSON（daily_scores 键为日期字符串 "1".."31"）
// ==========================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 部门类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepartmentKind {
    Leaf,
    Aggregated,
}

/// 月度得分（本月 / 上月 / 变化量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyScore {
    #[serde(default)]
    pub current: Option<f64>,

    #[serde(default)]
    pub previous: Option<f64>,

    #[serde(default)]
    pub dynamics: Option<f64>, // current - previous，任一缺失则为 null
}

// ==========================================
// Department - 部门
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: String, // "1"、"1.1" 等
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DepartmentKind,

    #[serde(default)]
    pub form_type: Option<String>, // 适用的检查表表单

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub daily_scores: IndexMap<u32, Option<f64>>,

    #[serde(default)]
    pub aggregated_from: Vec<String>,

    #[serde(default)]
    pub monthly_score: MonthlyScore,
}

impl Department {
    pub fn is_leaf(&self) -> bool {
        self.kind == DepartmentKind::Leaf
    }

    /// 已录入的日分（按模板日期顺序）
    pub fn filled_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.daily_scores.values().filter_map(|s| *s)
    }
}

// ==========================================
// MonthlyTemplate - 月度汇总模板（根）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTemplate {
    pub title: String,

    #[serde(default)]
    pub days: Vec<u32>,

    #[serde(default)]
    pub departments: Vec<Department>,

    #[serde(default)]
    pub notes: Vec<String>,
}

impl MonthlyTemplate {
    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    pub fn department_mut(&mut self, id: &str) -> Option<&mut Department> {
        self.departments.iter_mut().find(|d| d.id == id)
    }
}

/// 部门填报统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub filled_days: usize,
    pub total_days: usize,
    pub completion_percentage: f64, // 0.0 - 100.0，一位小数
    pub current_score: Option<f64>,
    pub previous_score: Option<f64>,
    pub dynamics: Option<f64>,
}

// ==========================================
// 报告视图（由引擎计算，报告层只读）
// ==========================================

/// 汇总表单行
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRow {
    pub id: String,
    pub name: String,
    pub form_type: String,
    pub description: String,
    pub day_scores: Vec<Option<f64>>, // 与 MonthlySummary::days 一一对应
    pub score: MonthlyScore,
}

/// 汇总表
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub title: String,
    pub days: Vec<u32>,
    pub rows: Vec<MonthlyRow>,
    pub notes: Vec<String>,
}
