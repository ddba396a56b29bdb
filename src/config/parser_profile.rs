use serde::{Deserialize, Serialize};

/// 解析规则配置（元数据正则、部门词表、噪声过滤、评分标记）
///
/// 所有字段均有默认值，JSON 配置文件只需覆写需要调整的键。
/// 默认值对应现行检查表模板（俄文表单）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserProfile {
    /// 版本日期正则（第 1 捕获组为取值）
    pub revision_date_pattern: String,

    /// 检查日期正则
    pub inspection_date_pattern: String,

    /// 检查人正则（取到行尾）
    pub inspector_pattern: String,

    /// 部门名称封闭词表（按顺序组成候选，首个匹配生效）
    pub section_vocabulary: Vec<String>,

    /// 噪声关键字（小写子串匹配，页码残留等）
    pub noise_keywords: Vec<String>,

    /// 忽略行正则（签字栏提示、下划线串）
    pub ignore_patterns: Vec<String>,

    /// "本组总分" 标记短语
    pub score_marker_phrases: Vec<String>,

    /// 检查项序号下限（含）
    pub criterion_number_min: u32,

    /// 检查项序号上限（含）
    pub criterion_number_max: u32,

    /// 键列（章节字母/序号所在列，0 = A 列）
    pub key_column: usize,
}

impl Default for ParserProfile {
    fn default() -> Self {
        Self {
            revision_date_pattern: r"Редакция от\s+(\d{2}\.\d{2}\.\d{4})".to_string(),
            inspection_date_pattern: r"Дата проведения проверки\s*([\d\.]+)".to_string(),
            inspector_pattern: r"Проверку проводил\s*(.+)".to_string(),
            section_vocabulary: vec![
                "УПП".to_string(),
                "ЭМО".to_string(),
                "Инструментальный участок".to_string(),
                "Дробильное отделение".to_string(),
                "Помещение централизованной подачи материалов".to_string(),
            ],
            noise_keywords: vec![
                "???".to_string(),
                "старонка".to_string(),
                "страница".to_string(),
            ],
            ignore_patterns: vec![
                "Проверку проводил".to_string(),
                "должность.*подпись.*расшифровка".to_string(),
                "[_]{5,}".to_string(),
            ],
            score_marker_phrases: vec![
                "Общий балл".to_string(),
                "Общая оценка".to_string(),
                "Итоговая оценка".to_string(),
            ],
            criterion_number_min: 1,
            criterion_number_max: 100,
            key_column: 0,
        }
    }
}
