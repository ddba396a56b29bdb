use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 月度汇总配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyProfile {
    /// 部门名称（检查表 section_name）→ 模板部门 ID
    pub department_mapping: IndexMap<String, String>,

    /// 月度得分保留的小数位
    pub score_decimals: u32,

    /// 工作表名称
    pub sheet_name: String,

    /// 输出文件名前缀，后接 _YYYY-MM.xlsx
    pub file_prefix: String,

    /// 固定列表头（A-D）
    pub column_headers: Vec<String>,

    /// 日分列组标题
    pub daily_header: String,

    /// 日分列组副标题（日期行之上）
    pub day_subheader: String,

    /// 月度得分列组标题
    pub total_header: String,

    /// 月度得分三列：本月 / 上月 / 变化量
    pub total_subheaders: Vec<String>,
}

impl Default for MonthlyProfile {
    fn default() -> Self {
        Self {
            department_mapping: default_department_mapping(),
            score_decimals: 1,
            sheet_name: "Сводная аналитика".to_string(),
            file_prefix: "сводный_отчет".to_string(),
            column_headers: vec![
                "№ п/п".to_string(),
                "Структурное подразделение".to_string(),
                "ФОРМА ЧЕК-ЛИСТА".to_string(),
                "ПОЯСНЕНИЯ".to_string(),
            ],
            daily_header: "ОЦЕНКА ЗА ДЕНЬ".to_string(),
            day_subheader: "Число месяца".to_string(),
            total_header: "ИТОГОВАЯ ОЦЕНКА ЗА МЕСЯЦ (ДИНАМИКА)".to_string(),
            total_subheaders: vec![
                "за текущий месяц".to_string(),
                "за предыдущий месяц".to_string(),
                "динамика".to_string(),
            ],
        }
    }
}

impl MonthlyProfile {
    /// 按部门名称查找模板部门 ID
    pub fn department_for(&self, section_name: &str) -> Option<&str> {
        self.department_mapping
            .get(section_name.trim())
            .map(String::as_str)
    }
}

fn default_department_mapping() -> IndexMap<String, String> {
    [
        ("УПП", "1"),
        ("Отделение раздува", "1.1"),
        ("Отделение литья", "1.2"),
        ("Дробильное отделение", "1.3"),
        ("Помещение централизованной подачи материала", "1.4"),
        ("Сборочный участок", "2"),
        ("Участок производства СКПГ", "3"),
        ("Инструментальный участок", "5"),
        ("ЭМО", "6"),
        ("Помещения ЭМО", "6.1"),
        ("Состояние оборудования на участках", "6.2"),
    ]
    .into_iter()
    .map(|(name, id)| (name.to_string(), id.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_for() {
        let profile = MonthlyProfile::default();
        assert_eq!(profile.department_for("Дробильное отделение"), Some("1.3"));
        assert_eq!(profile.department_for(" ЭМО "), Some("6"));
        assert_eq!(profile.department_for("Склад"), None);
    }
}
