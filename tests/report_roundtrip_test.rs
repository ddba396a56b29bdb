// ==========================================
// 报告输出 集成测试
// ==========================================
// 测试目标:
// - JSON 持久化往返
// - 检查表报告可被解析器重新读回同一结构
// - 违规报告版式与照片列
// ==========================================


use calamine::{open_workbook, Data, Reader, Xlsx};
use checklist_report::config::{ParserProfile, ReportProfile};
use checklist_report::importer::{ChecklistParser, JsonStore};
use checklist_report::report::{ChecklistExcelGenerator, ReportError, ReportGenerator, ViolationExcelGenerator};
use checklist_report::{ScoreCalculator, ViolationAnalyzer};
use std::path::Path;
use tempfile::TempDir;
use test_helpers::{sample_checklist_rows, write_checklist_xlsx, write_text_file, ChecklistBuilder};

const Y: Option<bool> = Some(true);
const N: Option<bool> = Some(false);

fn cell(path: &Path, row: u32, col: u32) -> String {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .get_value((row, col))
        .map(Data::to_string)
        .unwrap_or_default()
}

#[test]
fn test_json_round_trip_keeps_order_and_scores() {
    let doc = ChecklistBuilder::new("upp.xlsx")
        .metadata("УПП", "15.03.2024", "Петров П.П.")
        .section("C", "Последний по алфавиту, первый по порядку", &[Y])
        .subdivision("A", "A2", "Вторая", &[N, Y])
        .subdivision("A", "A1", "Первая", &[])
        .build();
    let scored = ScoreCalculator::new().calculate_all_scores(doc).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("upp.json");
    JsonStore::save(&scored, &path).unwrap();
    let loaded = JsonStore::load(&path).unwrap();

    assert_eq!(loaded, scored);
    let keys: Vec<&str> = loaded.sections.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["C", "A"]);
    let sub_keys: Vec<&str> = loaded.sections["A"].subdivisions.keys().map(String::as_str).collect();
    assert_eq!(sub_keys, vec!["A2", "A1"]);
}

#[test]
fn test_json_accepts_unscored_document() {
    let raw = r#"{
        "file_name": "manual.xlsx",
        "sections": {
            "A": {
                "description": "Общие требования",
                "criteria": [
                    {"number": 1, "description": "Чистота", "complies": true, "does_not_comply": false, "comment": ""},
                    {"number": 2, "description": "Освещение", "complies": null, "does_not_comply": null, "comment": ""}
                ]
            }
        }
    }"#;

    let doc = JsonStore::from_json_str(raw).unwrap();
    assert_eq!(doc.overall_score, None);
    assert_eq!(doc.inspector, "");
    assert_eq!(doc.sections["A"].criteria.len(), 2);
    assert_eq!(doc.sections["A"].total_score, None);
}

#[test]
fn test_rendered_report_parses_back_to_same_tree() {
    let dir = TempDir::new().unwrap();
    let source = write_checklist_xlsx(dir.path(), "crushing.xlsx", &sample_checklist_rows()).unwrap();

    let parser = ChecklistParser::from_profile(&ParserProfile::default()).unwrap();
    let original = parser.parse_file(&source).unwrap();
    let scored = ScoreCalculator::new().calculate_all_scores(original.clone()).unwrap();

    let report_path = dir.path().join("crushing_report.xlsx");
    ChecklistExcelGenerator::new(ReportProfile::default())
        .generate(&scored, &report_path)
        .unwrap();

    let reparsed = parser.parse_file(&report_path).unwrap();

    assert_eq!(reparsed.revision_date, original.revision_date);
    assert_eq!(reparsed.inspection_date, original.inspection_date);
    assert_eq!(reparsed.section_name, original.section_name);
    assert_eq!(reparsed.inspector, original.inspector);
    // 未检查、无说明的检查项在报告中只有序号与描述，结构完全一致
    assert_eq!(reparsed.sections, original.sections);
}

#[test]
fn test_report_overall_row_for_scored_sample() {
    let dir = TempDir::new().unwrap();
    // A = 2/3，B = mean(B1 = 1/2) = 0.5，总分 = 7/12
    let doc = ChecklistBuilder::new("s.xlsx")
        .section("A", "Общие требования", &[Y, N, Y])
        .subdivision("B", "B1", "Станки", &[Y, N])
        .subdivision("B", "B2", "Прессы", &[])
        .build();
    let scored = ScoreCalculator::new().calculate_all_scores(doc).unwrap();

    let path = dir.path().join("s_report.xlsx");
    ChecklistExcelGenerator::new(ReportProfile::default())
        .generate(&scored, &path)
        .unwrap();

    // 行 7 A，8-10 检查项，11 本组总分，13 B，14 B1，15-16 检查项，17 B1 总分，
    // 19 B2，20 B2 总分，22 B 总分，24 总评分
    assert_eq!(cell(&path, 7, 0), "A");
    assert_eq!(cell(&path, 11, 2), "0.67");
    assert_eq!(cell(&path, 14, 0), "B1");
    assert_eq!(cell(&path, 19, 0), "B2");
    assert_eq!(cell(&path, 20, 2), "0");
    assert_eq!(cell(&path, 22, 1), "Общий балл за раздел B");
    assert_eq!(cell(&path, 22, 2), "0.5");
    assert_eq!(cell(&path, 24, 1), "Итоговая оценка структурному подразделению");
    assert_eq!(cell(&path, 24, 2), "0.58");
}

#[test]
fn test_violation_report_layout_and_photo_column() {
    let dir = TempDir::new().unwrap();
    let not_an_image = write_text_file(dir.path(), "photo.png", "not a png").unwrap();

    let doc = ChecklistBuilder::new("upp.xlsx")
        .metadata("УПП", "", "Петров П.П.")
        .section("A", "Общие требования", &[N, Y, N])
        .build();
    let mut report = ViolationAnalyzer::new().analyze(&doc).unwrap();
    report.violations[1].photo_path = Some(not_an_image.display().to_string());

    let path = dir.path().join("upp_violations.xlsx");
    ViolationExcelGenerator::new(ReportProfile::default().violation)
        .generate(&report, &path)
        .unwrap();

    assert_eq!(cell(&path, 0, 0), "ОТЧЕТ О ВЫЯВЛЕННЫХ НАРУШЕНИЯХ");
    assert_eq!(cell(&path, 1, 0), "Структурное подразделение: УПП");
    assert_eq!(cell(&path, 2, 0), "Дата проведения проверки: не указана");
    assert_eq!(cell(&path, 3, 0), "Проверяющий: Петров П.П.");
    assert_eq!(cell(&path, 4, 0), "Исходный отчет: upp.xlsx");

    // 数据从第 9 行开始
    assert_eq!(cell(&path, 8, 0), "1");
    assert_eq!(cell(&path, 8, 1), "A. Общие требования");
    assert_eq!(cell(&path, 8, 2), "-");
    assert_eq!(cell(&path, 8, 3), "1");
    assert_eq!(cell(&path, 8, 5), "[Фото отсутствует]");
    assert_eq!(cell(&path, 9, 3), "3");
    assert!(cell(&path, 9, 5).starts_with("[Ошибка загрузки фото: "));

    // 表格后空两行为汇总
    assert_eq!(cell(&path, 12, 0), "Всего выявлено нарушений: 2");
}

#[test]
fn test_violation_report_refused_without_violations() {
    let dir = TempDir::new().unwrap();
    let doc = ChecklistBuilder::new("clean.xlsx")
        .section("A", "Общие требования", &[Y, Y])
        .build();
    let report = ViolationAnalyzer::new().analyze(&doc).unwrap();

    let path = dir.path().join("clean_violations.xlsx");
    let result = ViolationExcelGenerator::new(ReportProfile::default().violation).generate(&report, &path);

    assert!(matches!(result, Err(ReportError::NoViolations(_))));
    assert!(!path.exists());
}
