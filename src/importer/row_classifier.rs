// ==========================================
// 检查表报告系统 - 行分类器
// ==========================================
// 职责: 单行 → RowKind（纯函数，不持有解析状态）
// 规则顺序（固定，先匹配先生效）:
//   1. 忽略过滤（噪声关键字 / 签字栏 / 下划线串 / 空行）
//   2. 章节标题（键列为单个字母）
//   3. 子章节标题（键列为字母 + 一位数字）
//   4. 检查项（键列为范围内整数）
//   5. 本组总分标记
//   6. 续行（其余列文本非空）
// ==========================================

use crate::config::{ConfigResult, ParserProfile};
use crate::importer::grid_reader::GridRow;
use crate::importer::metadata_extractor::build_regex;
use regex::Regex;

/// 行文本拆分：键列文本 + 其余列文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowText {
    pub first: String, // 键列单元格（已 trim，缺失为空）
    pub rest: String,  // 其余非空单元格按列序以单空格连接
}

impl RowText {
    pub fn from_row(row: &GridRow, key_column: usize) -> Self {
        Self {
            first: row
                .cell_at(key_column)
                .map(|c| c.value.clone())
                .unwrap_or_default(),
            rest: row.text_excluding(key_column),
        }
    }
}

/// 忽略原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    EmptyRow,
    NoiseKeyword,
    IgnorePattern,
    Unclassified, // 无任何规则命中且无续行文本
}

/// 行分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Ignored(IgnoreReason),
    SectionHeader { key: String, description: String },
    SubsectionHeader { key: String, description: String },
    Criterion { number: u32, description: String },
    ScoreMarker,
    Continuation { text: String },
}

/// 已编译的分类规则
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    noise_keywords: Vec<String>, // 小写
    ignore_patterns: Vec<Regex>,
    score_marker: Option<Regex>,
    number_min: u32,
    number_max: u32,
    key_column: usize,
}

impl ClassifierRules {
    pub fn compile(profile: &ParserProfile) -> ConfigResult<Self> {
        let ignore_patterns = profile
            .ignore_patterns
            .iter()
            .map(|p| build_regex("ignore_patterns", p))
            .collect::<ConfigResult<Vec<_>>>()?;

        let score_marker = if profile.score_marker_phrases.is_empty() {
            None
        } else {
            let alternatives = profile
                .score_marker_phrases
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            Some(build_regex("score_marker_phrases", &alternatives)?)
        };

        Ok(Self {
            noise_keywords: profile
                .noise_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            ignore_patterns,
            score_marker,
            number_min: profile.criterion_number_min,
            number_max: profile.criterion_number_max,
            key_column: profile.key_column,
        })
    }
}

// ==========================================
// RowClassifier - 行分类器
// ==========================================
pub struct RowClassifier {
    rules: ClassifierRules,
}

impl RowClassifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    pub fn from_profile(profile: &ParserProfile) -> ConfigResult<Self> {
        Ok(Self::new(ClassifierRules::compile(profile)?))
    }

    pub fn key_column(&self) -> usize {
        self.rules.key_column
    }

    /// 分类一行
    pub fn classify_row(&self, row: &GridRow) -> RowKind {
        if row.is_empty() {
            return RowKind::Ignored(IgnoreReason::EmptyRow);
        }
        self.classify(&RowText::from_row(row, self.rules.key_column))
    }

    /// 分类已拆分的行文本
    ///
    /// # 说明
    /// - 忽略过滤只看其余列文本
    /// - 章节/子章节/检查项只看键列文本
    pub fn classify(&self, text: &RowText) -> RowKind {
        let first = text.first.trim();
        let rest = text.rest.trim();

        if first.is_empty() && rest.is_empty() {
            return RowKind::Ignored(IgnoreReason::EmptyRow);
        }

        // 1. 忽略过滤
        let rest_lower = rest.to_lowercase();
        if self
            .rules
            .noise_keywords
            .iter()
            .any(|k| rest_lower.contains(k.as_str()))
        {
            return RowKind::Ignored(IgnoreReason::NoiseKeyword);
        }
        if self.rules.ignore_patterns.iter().any(|p| p.is_match(rest)) {
            return RowKind::Ignored(IgnoreReason::IgnorePattern);
        }

        let key = first.to_uppercase();

        // 2. 章节标题
        if is_section_key(&key) {
            return RowKind::SectionHeader {
                key,
                description: rest.to_string(),
            };
        }

        // 3. 子章节标题
        if is_subsection_key(&key) {
            return RowKind::SubsectionHeader {
                key,
                description: rest.to_string(),
            };
        }

        // 4. 检查项
        if let Some(number) = self.criterion_number(first) {
            return RowKind::Criterion {
                number,
                description: rest.to_string(),
            };
        }

        // 5. 本组总分标记
        if self
            .rules
            .score_marker
            .as_ref()
            .is_some_and(|re| re.is_match(rest))
        {
            return RowKind::ScoreMarker;
        }

        // 6. 续行
        if !rest.is_empty() {
            return RowKind::Continuation {
                text: rest.to_string(),
            };
        }

        RowKind::Ignored(IgnoreReason::Unclassified)
    }

    fn criterion_number(&self, first: &str) -> Option<u32> {
        let value: i64 = first.parse().ok()?;
        if value < i64::from(self.rules.number_min) || value > i64::from(self.rules.number_max) {
            return None;
        }
        u32::try_from(value).ok()
    }
}

fn is_key_letter(c: char) -> bool {
    c.is_ascii_uppercase() || ('А'..='Я').contains(&c)
}

/// 单个字母（A-Z / А-Я）
fn is_section_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_key_letter(c))
}

/// 字母 + 一位数字（如 "B1"）
fn is_subsection_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some(d), None) if is_key_letter(c) && d.is_ascii_digit()
    )
}
