// ==========================================
// 检查表报告系统 - JSON 存储
// ==========================================
// 职责: ChecklistDocument / MonthlyTemplate ⇄ JSON 文件（UTF-8，格式化输出）
// 兼容: 合规标记读入 true/false/0/1/null，写出 true/false/null
// ==========================================

use crate::domain::{ChecklistDocument, MonthlyTemplate};
use crate::importer::error::{ImportError, ImportResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct JsonStore;

impl JsonStore {
    /// 读取 JSON 文件
    pub fn load(path: &Path) -> ImportResult<ChecklistDocument> {
        let doc: ChecklistDocument = read_json(path)?;

        debug!(
            file = %path.display(),
            sections = doc.sections.len(),
            "JSON 读取完成"
        );
        Ok(doc)
    }

    pub fn from_json_str(content: &str) -> ImportResult<ChecklistDocument> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_string(doc: &ChecklistDocument) -> ImportResult<String> {
        Ok(serde_json::to_string_pretty(doc)?)
    }

    /// 写出 JSON 文件（已存在则覆盖）
    pub fn save(doc: &ChecklistDocument, path: &Path) -> ImportResult<()> {
        write_json(doc, path)
    }

    // ==========================================
    // 月度汇总模板
    // ==========================================

    pub fn load_monthly_template(path: &Path) -> ImportResult<MonthlyTemplate> {
        let template: MonthlyTemplate = read_json(path)?;

        debug!(
            file = %path.display(),
            departments = template.departments.len(),
            days = template.days.len(),
            "月度模板读取完成"
        );
        Ok(template)
    }

    pub fn monthly_template_to_string(template: &MonthlyTemplate) -> ImportResult<String> {
        Ok(serde_json::to_string_pretty(template)?)
    }

    pub fn save_monthly_template(template: &MonthlyTemplate, path: &Path) -> ImportResult<()> {
        write_json(template, path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ImportResult<T> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> ImportResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| ImportError::FileWriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    debug!(file = %path.display(), "JSON 写出完成");
    Ok(())
}
