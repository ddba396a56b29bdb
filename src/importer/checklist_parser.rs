// ==========================================
// 检查表报告系统 - 检查表解析器（门面）
// ==========================================
// 流程: 读取网格 → 元数据提取 → 结构解析 → ChecklistDocument
// 说明: 结果未评分（各 total_score / overall_score 为 None）
// ==========================================

use crate::config::{ConfigResult, ParserProfile};
use crate::domain::ChecklistDocument;
use crate::importer::checklist_importer_trait::GridSource;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::grid_reader::{CellGrid, UniversalGridReader};
use crate::importer::metadata_extractor::MetadataExtractor;
use crate::importer::structure_parser::StructureParser;
use std::path::Path;
use tracing::{info, instrument, warn};

pub struct ChecklistParser {
    grid_source: Box<dyn GridSource>,
    metadata_extractor: MetadataExtractor,
    structure_parser: StructureParser,
}

impl ChecklistParser {
    /// 创建解析器
    ///
    /// # 参数
    /// - grid_source: 表格来源（Excel / CSV / 自定义）
    /// - metadata_extractor: 元数据提取器
    /// - structure_parser: 结构解析器
    pub fn new(
        grid_source: Box<dyn GridSource>,
        metadata_extractor: MetadataExtractor,
        structure_parser: StructureParser,
    ) -> Self {
        Self {
            grid_source,
            metadata_extractor,
            structure_parser,
        }
    }

    /// 按解析配置构建（按扩展名自动选择读取器）
    pub fn from_profile(profile: &ParserProfile) -> ConfigResult<Self> {
        Ok(Self::new(
            Box::new(UniversalGridReader),
            MetadataExtractor::from_profile(profile)?,
            StructureParser::from_profile(profile)?,
        ))
    }

    /// 解析检查表文件
    ///
    /// # 返回
    /// - Ok(ChecklistDocument): file_name 为文件名（不含目录）
    /// - Err: 文件不存在、格式不支持、读取失败
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn parse_file(&self, file_path: &Path) -> ImportResult<ChecklistDocument> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let grid = self.grid_source.read_grid(file_path)?;
        Ok(self.parse_grid(file_name, &grid))
    }

    /// 解析内存网格
    pub fn parse_grid(&self, file_name: impl Into<String>, grid: &CellGrid) -> ChecklistDocument {
        let meta = self.metadata_extractor.extract_from_grid(grid);
        let (structure, summary) = self.structure_parser.parse_with_summary(grid);

        let mut doc = ChecklistDocument::new(file_name);
        doc.revision_date = meta.revision_date;
        doc.inspection_date = meta.inspection_date;
        doc.section_name = meta.section_name;
        doc.inspector = meta.inspector;
        doc.sections = structure.sections;
        doc.overall_score = structure.overall_score;

        // 版本日期只做格式匹配，日历有效性在此核对
        if !doc.revision_date.is_empty() && doc.revision_date_parsed().is_none() {
            warn!(
                file = %doc.file_name,
                revision_date = %doc.revision_date,
                "版本日期不是有效的日历日期，按原文保留"
            );
        }

        info!(
            file = %doc.file_name,
            section_name = %doc.section_name,
            sections = summary.sections,
            criteria = summary.criteria,
            dropped = summary.dropped,
            "检查表解析完成"
        );

        doc
    }
}
