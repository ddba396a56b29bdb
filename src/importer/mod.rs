// ==========================================
// 检查表报告系统 - 导入层
// ==========================================
// 职责: 外部表格 → ChecklistDocument（未评分）
// 支持: Excel, CSV, JSON（已解析数据）
// 流程: 网格读取 → 元数据提取 → 行分类 → 结构解析
// ==========================================

// 模块声明
pub mod checklist_importer_trait;
pub mod checklist_parser;
pub mod error;
pub mod grid_reader;
pub mod json_store;
pub mod metadata_extractor;
pub mod row_classifier;
pub mod structure_parser;

// 重导出核心类型
pub use checklist_parser::ChecklistParser;
pub use error::{ImportError, ImportResult};
pub use grid_reader::{CellGrid, CsvGridReader, ExcelGridReader, GridCell, GridRow, UniversalGridReader};
pub use json_store::JsonStore;
pub use metadata_extractor::{ChecklistMetadata, MetadataExtractor, MetadataRules};
pub use row_classifier::{ClassifierRules, IgnoreReason, RowClassifier, RowKind, RowText};
pub use structure_parser::{ParseSummary, ParsedStructure, ParserState, StructureParser};

// 重导出 Trait 接口
pub use checklist_importer_trait::GridSource;
