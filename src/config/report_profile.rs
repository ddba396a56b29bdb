use serde::{Deserialize, Serialize};

/// 检查表报告文案与版式配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportProfile {
    /// 工作表名称
    pub sheet_name: String,

    /// 版本日期前缀（A1）
    pub revision_prefix: String,

    /// 检查日期标签（C2）
    pub inspection_date_label: String,

    /// 检查人标签（A3）
    pub inspector_label: String,

    /// 表格标题（A5）
    pub title: String,

    /// 表头五列（A6:E6）
    pub column_headers: Vec<String>,

    /// "符合" 子表头（C7）
    pub complies_label: String,

    /// "不符合" 子表头（D7）
    pub does_not_comply_label: String,

    /// 章节/子章节总分行前缀，后接章节键
    pub section_total_label: String,

    /// 总评分行文案
    pub overall_label: String,

    /// 签字栏（两行）
    pub signature_lines: Vec<String>,

    /// 脚注（签字栏之后逐行输出）
    pub footnotes: Vec<String>,

    /// 违规报告文案
    pub violation: ViolationReportProfile,
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self {
            sheet_name: "Лист1".to_string(),
            revision_prefix: "Редакция от".to_string(),
            inspection_date_label: "Дата проведения проверки".to_string(),
            inspector_label: "Проверку проводил".to_string(),
            title: "Чек-лист оценки состояния оборудования и рабочего пространства рабочего персонала"
                .to_string(),
            column_headers: vec![
                "№ п/п".to_string(),
                "Критерий оценки".to_string(),
                "Оценка".to_string(),
                String::new(),
                "Краткий комментарий с указанием номера единицы оборудования, где выявлено несоответствие, и фото несоответствия"
                    .to_string(),
            ],
            complies_label: "соответствует".to_string(),
            does_not_comply_label: "не соответствует".to_string(),
            section_total_label: "Общий балл за раздел".to_string(),
            overall_label: "Итоговая оценка структурному подразделению".to_string(),
            signature_lines: default_signature_lines(),
            footnotes: Vec::new(),
            violation: ViolationReportProfile::default(),
        }
    }
}

/// 违规报告文案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViolationReportProfile {
    pub sheet_name: String,
    pub title: String,
    pub department_label: String,
    pub inspection_date_label: String,
    pub inspection_date_missing: String,
    pub inspector_label: String,
    pub inspector_missing: String,
    pub source_label: String,
    pub table_title: String,
    pub column_headers: Vec<String>,
    pub no_subsection: String,
    pub photo_placeholder: String,
    pub photo_error_label: String,
    pub total_label: String,
    pub signature_lines: Vec<String>,
}

impl Default for ViolationReportProfile {
    fn default() -> Self {
        Self {
            sheet_name: "Отчет о нарушениях".to_string(),
            title: "ОТЧЕТ О ВЫЯВЛЕННЫХ НАРУШЕНИЯХ".to_string(),
            department_label: "Структурное подразделение".to_string(),
            inspection_date_label: "Дата проведения проверки".to_string(),
            inspection_date_missing: "не указана".to_string(),
            inspector_label: "Проверяющий".to_string(),
            inspector_missing: "не указан".to_string(),
            source_label: "Исходный отчет".to_string(),
            table_title: "Перечень выявленных нарушений".to_string(),
            column_headers: vec![
                "№ п/п".to_string(),
                "Раздел".to_string(),
                "Подраздел".to_string(),
                "№ нарушения".to_string(),
                "Комментарий".to_string(),
                "Фотография нарушения".to_string(),
            ],
            no_subsection: "-".to_string(),
            photo_placeholder: "[Фото отсутствует]".to_string(),
            photo_error_label: "Ошибка загрузки фото".to_string(),
            total_label: "Всего выявлено нарушений".to_string(),
            signature_lines: default_signature_lines(),
        }
    }
}

fn default_signature_lines() -> Vec<String> {
    vec![
        "Проверку проводил _____________________ ______________ _______________________"
            .to_string(),
        "должность подпись расшифровка подпись".to_string(),
    ]
}
