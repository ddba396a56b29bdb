// ==========================================
// 检查表报告系统 - 领域类型定义
// ==========================================
// 职责: 合规判定三态 + 标记矛盾错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// 合规判定 (Compliance)
// ==========================================
// 由 complies / does_not_comply 两个标记解析得到
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compliance {
    Complies,      // 符合
    DoesNotComply, // 不符合
    Unknown,       // 未检查
}

impl Compliance {
    /// 从两个可空标记解析合规判定
    ///
    /// # 规则
    /// - complies = true 且 does_not_comply 非 true → Complies
    /// - does_not_comply = true 且 complies 非 true → DoesNotComply
    /// - complies = false（does_not_comply 为空）→ DoesNotComply
    /// - 两者均为空，或 complies 为空且 does_not_comply = false → Unknown
    /// - 两者同时为 true → Err(ContradictoryFlags)
    pub fn from_flags(
        complies: Option<bool>,
        does_not_comply: Option<bool>,
    ) -> Result<Self, ContradictoryFlags> {
        match (complies, does_not_comply) {
            (Some(true), Some(true)) => Err(ContradictoryFlags),
            (Some(true), _) => Ok(Compliance::Complies),
            (_, Some(true)) => Ok(Compliance::DoesNotComply),
            (Some(false), _) => Ok(Compliance::DoesNotComply),
            (None, _) => Ok(Compliance::Unknown),
        }
    }

    /// 转换回 (complies, does_not_comply) 标记对
    pub fn to_flags(self) -> (Option<bool>, Option<bool>) {
        match self {
            Compliance::Complies => (Some(true), Some(false)),
            Compliance::DoesNotComply => (Some(false), Some(true)),
            Compliance::Unknown => (None, None),
        }
    }
}

impl fmt::Display for Compliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compliance::Complies => write!(f, "COMPLIES"),
            Compliance::DoesNotComply => write!(f, "DOES_NOT_COMPLY"),
            Compliance::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// complies 与 does_not_comply 同时为 true
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("合规标记矛盾: complies 与 does_not_comply 同时为 true")]
pub struct ContradictoryFlags;
