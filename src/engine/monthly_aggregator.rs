// ==========================================
// 检查表报告系统 - 月度汇总引擎
// ==========================================
// 输入: MonthlyTemplate（可变）+ 按日录入的部门得分
// 规则:
//   - 叶子部门本月得分 = 已录入日分均值（无日分时保留原值）
//   - 聚合部门本月得分 = aggregated_from 中已有本月得分的部门均值
//   - 聚合部门按模板顺序计算，引用前序聚合部门时取其本轮结果
//   - 变化量 = 本月 - 上月，任一缺失为 None
//   - 聚合部门的日分: 模板未填时取子部门当日得分均值（仅用于展示）
// 红线: 得分与变化量统一按 decimals 取整；不做 IO
// ==========================================

use crate::domain::{
    Department, DepartmentStats, MonthlyRow, MonthlyScore, MonthlySummary, MonthlyTemplate,
};
use crate::engine::error::{MonthlyError, MonthlyResult};
use tracing::debug;

// ==========================================
// MonthlyAggregator - 月度汇总引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct MonthlyAggregator {
    decimals: u32,
}

impl Default for MonthlyAggregator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl MonthlyAggregator {
    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.decimals)
    }

    /// 录入叶子部门某日得分并重算
    ///
    /// # 返回
    /// - Err(UnknownDepartment / NotLeaf / DayNotInTemplate / InvalidScore): 模板不变
    pub fn add_daily_score(
        &self,
        template: &mut MonthlyTemplate,
        department_id: &str,
        day: u32,
        score: f64,
    ) -> MonthlyResult<()> {
        if !score.is_finite() {
            return Err(MonthlyError::InvalidScore {
                department: department_id.to_string(),
                score,
            });
        }

        let department = template
            .department_mut(department_id)
            .ok_or_else(|| MonthlyError::UnknownDepartment(department_id.to_string()))?;
        if !department.is_leaf() {
            return Err(MonthlyError::NotLeaf(department_id.to_string()));
        }
        let slot = department
            .daily_scores
            .get_mut(&day)
            .ok_or_else(|| MonthlyError::DayNotInTemplate {
                department: department_id.to_string(),
                day,
            })?;
        *slot = Some(score);

        debug!(department = department_id, day, score, "日分已录入");
        self.recalculate(template);
        Ok(())
    }

    /// 重算全部部门的本月得分与变化量
    pub fn recalculate(&self, template: &mut MonthlyTemplate) {
        // === 叶子部门 ===
        for department in template.departments.iter_mut().filter(|d| d.is_leaf()) {
            let scores: Vec<f64> = department.filled_scores().collect();
            if let Some(avg) = mean(&scores) {
                self.set_current(&mut department.monthly_score, avg);
            }
        }

        // === 聚合部门（模板顺序） ===
        for index in 0..template.departments.len() {
            if template.departments[index].is_leaf() {
                continue;
            }
            let child_scores: Vec<f64> = template.departments[index]
                .aggregated_from
                .iter()
                .filter_map(|id| template.department(id))
                .filter_map(|child| child.monthly_score.current)
                .collect();
            if let Some(avg) = mean(&child_scores) {
                self.set_current(&mut template.departments[index].monthly_score, avg);
            }
        }
    }

    /// 部门某日的展示得分
    pub fn daily_score(&self, template: &MonthlyTemplate, department: &Department, day: u32) -> Option<f64> {
        let own = department.daily_scores.get(&day).copied().flatten();
        if own.is_some() || department.is_leaf() {
            return own;
        }

        let child_scores: Vec<f64> = department
            .aggregated_from
            .iter()
            .filter_map(|id| template.department(id))
            .filter_map(|child| child.daily_scores.get(&day).copied().flatten())
            .collect();
        mean(&child_scores).map(|avg| self.round(avg))
    }

    /// 部门填报统计（部门不存在时为 None）
    pub fn department_stats(&self, template: &MonthlyTemplate, department_id: &str) -> Option<DepartmentStats> {
        let department = template.department(department_id)?;
        let filled_days = department.filled_scores().count();
        let total_days = department.daily_scores.len();
        let completion_percentage = if total_days > 0 {
            round_to(filled_days as f64 / total_days as f64 * 100.0, 1)
        } else {
            0.0
        };

        Some(DepartmentStats {
            department: department.name.clone(),
            filled_days,
            total_days,
            completion_percentage,
            current_score: department.monthly_score.current,
            previous_score: department.monthly_score.previous,
            dynamics: department.monthly_score.dynamics,
        })
    }

    /// 生成报告视图（只读）
    pub fn summarize(&self, template: &MonthlyTemplate) -> MonthlySummary {
        let rows = template
            .departments
            .iter()
            .map(|department| MonthlyRow {
                id: department.id.clone(),
                name: department.name.clone(),
                form_type: department.form_type.clone().unwrap_or_default(),
                description: department.description.clone(),
                day_scores: template
                    .days
                    .iter()
                    .map(|day| self.daily_score(template, department, *day))
                    .collect(),
                score: department.monthly_score,
            })
            .collect();

        MonthlySummary {
            title: template.title.clone(),
            days: template.days.clone(),
            rows,
            notes: template.notes.clone(),
        }
    }

    fn set_current(&self, score: &mut MonthlyScore, avg: f64) {
        let current = self.round(avg);
        score.current = Some(current);
        score.dynamics = score.previous.map(|previous| self.round(current - previous));
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
