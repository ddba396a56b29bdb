// ==========================================
// 检查表报告系统 - 检查表领域模型
// ==========================================
// 结构: ChecklistDocument → Section → (Subdivision →) Criterion
// 红线: 树形所有权自上而下，无共享/循环引用
// 用途: 解析层创建，评分引擎只写 total_score / overall_score，报告层只读
// 对齐: 与机器人侧 JSON 结构逐字段一致
// ==========================================

use crate::domain::types::{Compliance, ContradictoryFlags};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// 章节映射（按出现顺序）
pub type SectionMap = IndexMap<String, Section>;

/// 子章节映射（按出现顺序）
pub type SubdivisionMap = IndexMap<String, Subdivision>;

// ==========================================
// Criterion - 检查项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub number: u32,         // 序号（容器内唯一，1..=100）
    pub description: String, // 检查项描述（可跨多行拼接）

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub complies: Option<bool>, // 符合

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub does_not_comply: Option<bool>, // 不符合

    #[serde(default)]
    pub comment: String, // 简要说明

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>, // 违规照片（采集端写入，相对路径以检查表文件所在目录为基准）
}

impl Criterion {
    /// 创建未检查的检查项
    pub fn new(number: u32, description: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
            complies: None,
            does_not_comply: None,
            comment: String::new(),
            photo_path: None,
        }
    }

    /// 解析合规判定
    pub fn compliance(&self) -> Result<Compliance, ContradictoryFlags> {
        Compliance::from_flags(self.complies, self.does_not_comply)
    }

    /// 设置合规判定，两个标记始终互为取反
    pub fn set_compliance(&mut self, complies: bool) {
        let compliance = if complies {
            Compliance::Complies
        } else {
            Compliance::DoesNotComply
        };
        (self.complies, self.does_not_comply) = compliance.to_flags();
    }

    pub fn with_compliance(mut self, complies: bool) -> Self {
        self.set_compliance(complies);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_photo(mut self, photo_path: impl Into<String>) -> Self {
        self.photo_path = Some(photo_path.into());
        self
    }

    /// 是否计入合规数（complies == true）
    pub fn is_compliant(&self) -> bool {
        self.complies == Some(true)
    }
}

// ==========================================
// Subdivision - 子章节（如 "B1"）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    pub description: String,

    #[serde(default)]
    pub criteria: Vec<Criterion>,

    #[serde(default)]
    pub total_score: Option<f64>,
}

impl Subdivision {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            criteria: Vec::new(),
            total_score: None,
        }
    }
}

// ==========================================
// Section - 章节（单个字母，如 "A"）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub description: String,

    // 无子章节时直接挂载的检查项
    #[serde(default)]
    pub criteria: Vec<Criterion>,

    #[serde(default)]
    pub subdivisions: SubdivisionMap,

    #[serde(default)]
    pub total_score: Option<f64>,
}

impl Section {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            criteria: Vec::new(),
            subdivisions: SubdivisionMap::new(),
            total_score: None,
        }
    }

    pub fn has_subdivisions(&self) -> bool {
        !self.subdivisions.is_empty()
    }

    /// 章节下全部检查项数量（含子章节）
    pub fn criteria_count(&self) -> usize {
        self.criteria.len()
            + self
                .subdivisions
                .values()
                .map(|s| s.criteria.len())
                .sum::<usize>()
    }
}

// ==========================================
// ChecklistDocument - 检查表文档（根）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistDocument {
    pub file_name: String,

    #[serde(default)]
    pub revision_date: String, // 版本日期 DD.MM.YYYY 或空

    #[serde(default)]
    pub inspection_date: String, // 检查日期（自由文本）

    #[serde(default)]
    pub section_name: String, // 部门名称

    #[serde(default)]
    pub inspector: String, // 检查人

    #[serde(default)]
    pub sections: SectionMap,

    #[serde(default)]
    pub overall_score: Option<f64>,
}

/// 检查项位置（章节键 + 可选子章节键）
#[derive(Debug, Clone, Copy)]
pub struct CriterionLocation<'a> {
    pub section: &'a str,
    pub subdivision: Option<&'a str>,
    pub criterion: &'a Criterion,
}

/// 文档统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistStats {
    pub sections: usize,
    pub subdivisions: usize,
    pub criteria: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub unknown: usize,
    pub contradictory: usize,
}

impl ChecklistDocument {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            revision_date: String::new(),
            inspection_date: String::new(),
            section_name: String::new(),
            inspector: String::new(),
            sections: SectionMap::new(),
            overall_score: None,
        }
    }

    /// 版本日期（DD.MM.YYYY）解析为日历日期
    pub fn revision_date_parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.revision_date.trim(), "%d.%m.%Y").ok()
    }

    /// 按树顺序遍历全部检查项（章节直挂项在前，子章节项在后）
    pub fn criteria_with_location(&self) -> impl Iterator<Item = CriterionLocation<'_>> + '_ {
        self.sections.iter().flat_map(|(section_key, section)| {
            let section_key = section_key.as_str();
            let direct = section.criteria.iter().map(move |criterion| CriterionLocation {
                section: section_key,
                subdivision: None,
                criterion,
            });
            let nested = section.subdivisions.iter().flat_map(move |(sub_key, sub)| {
                let sub_key = sub_key.as_str();
                sub.criteria.iter().map(move |criterion| CriterionLocation {
                    section: section_key,
                    subdivision: Some(sub_key),
                    criterion,
                })
            });
            direct.chain(nested)
        })
    }

    /// 统计检查项合规分布
    pub fn stats(&self) -> ChecklistStats {
        let mut stats = ChecklistStats {
            sections: self.sections.len(),
            subdivisions: self.sections.values().map(|s| s.subdivisions.len()).sum(),
            ..Default::default()
        };

        for location in self.criteria_with_location() {
            stats.criteria += 1;
            match location.criterion.compliance() {
                Ok(Compliance::Complies) => stats.compliant += 1,
                Ok(Compliance::DoesNotComply) => stats.non_compliant += 1,
                Ok(Compliance::Unknown) => stats.unknown += 1,
                Err(_) => stats.contradictory += 1,
            }
        }

        stats
    }
}

// ==========================================
// 合规标记反序列化
// ==========================================
// 解析结果写入 true/false，旧版报告数据为 1/0
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<FlagRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagRepr::Bool(b)) => Ok(Some(b)),
        Some(FlagRepr::Int(0)) => Ok(Some(false)),
        Some(FlagRepr::Int(1)) => Ok(Some(true)),
        Some(FlagRepr::Int(other)) => Err(serde::de::Error::custom(format!(
            "合规标记只允许 0/1/true/false/null，实际: {}",
            other
        ))),
    }
}
