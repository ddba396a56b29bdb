// ==========================================
// 检查表报告系统 - 元数据提取器
// ==========================================
// 职责: 全文正则扫描表头字段（版本日期/检查日期/部门/检查人）
// 规则: 各正则独立、不锚定、大小写不敏感，首个匹配生效
// 约定: 四个字段恒定存在，未匹配为空字符串（非错误）
// ==========================================

use crate::config::{ConfigError, ConfigResult, ParserProfile};
use crate::importer::grid_reader::CellGrid;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 表头元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistMetadata {
    pub revision_date: String,
    pub inspection_date: String,
    pub section_name: String,
    pub inspector: String,
}

/// 元数据字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    RevisionDate,
    InspectionDate,
    SectionName,
    Inspector,
}

/// 已编译的元数据正则（固定顺序）
#[derive(Debug, Clone)]
pub struct MetadataRules {
    patterns: Vec<(MetadataField, Option<Regex>)>,
}

impl MetadataRules {
    /// 从解析配置编译正则
    ///
    /// # 说明
    /// - 部门词表逐项转义后以 `|` 组合为一个捕获组
    /// - 词表为空时该字段恒为空字符串
    pub fn compile(profile: &ParserProfile) -> ConfigResult<Self> {
        let vocabulary = if profile.section_vocabulary.is_empty() {
            None
        } else {
            let alternatives = profile
                .section_vocabulary
                .iter()
                .map(|name| regex::escape(name.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(build_regex("section_vocabulary", &format!("({})", alternatives))?)
        };

        Ok(Self {
            patterns: vec![
                (
                    MetadataField::RevisionDate,
                    Some(build_regex(
                        "revision_date_pattern",
                        &profile.revision_date_pattern,
                    )?),
                ),
                (
                    MetadataField::InspectionDate,
                    Some(build_regex(
                        "inspection_date_pattern",
                        &profile.inspection_date_pattern,
                    )?),
                ),
                (MetadataField::SectionName, vocabulary),
                (
                    MetadataField::Inspector,
                    Some(build_regex("inspector_pattern", &profile.inspector_pattern)?),
                ),
            ],
        })
    }
}

/// 大小写不敏感正则
pub(crate) fn build_regex(name: &str, pattern: &str) -> ConfigResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            name: name.to_string(),
            message: e.to_string(),
        })
}

// ==========================================
// MetadataExtractor - 元数据提取器
// ==========================================
pub struct MetadataExtractor {
    rules: MetadataRules,
}

impl MetadataExtractor {
    pub fn new(rules: MetadataRules) -> Self {
        Self { rules }
    }

    pub fn from_profile(profile: &ParserProfile) -> ConfigResult<Self> {
        Ok(Self::new(MetadataRules::compile(profile)?))
    }

    /// 从网格提取（全文 = 行内空格连接，行间换行连接）
    pub fn extract_from_grid(&self, grid: &CellGrid) -> ChecklistMetadata {
        self.extract(&grid.full_text())
    }

    /// 从全文提取
    pub fn extract(&self, full_text: &str) -> ChecklistMetadata {
        let mut meta = ChecklistMetadata::default();

        for (field, pattern) in &self.rules.patterns {
            let value = pattern
                .as_ref()
                .and_then(|re| re.captures(full_text))
                .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            match field {
                MetadataField::RevisionDate => meta.revision_date = value,
                MetadataField::InspectionDate => meta.inspection_date = value,
                MetadataField::SectionName => meta.section_name = value,
                MetadataField::Inspector => meta.inspector = value,
            }
        }

        debug!(
            revision_date = %meta.revision_date,
            inspection_date = %meta.inspection_date,
            section_name = %meta.section_name,
            inspector = %meta.inspector,
            "元数据提取完成"
        );

        meta
    }
}
