// ==========================================
// 检查表报告系统 - 应用配置
// ==========================================
// 职责: 配置加载（JSON 文件，可缺省）+ 基础校验
// 存储: 单个 JSON 文件 { "parser": {...}, "report": {...}, "monthly": {...} }
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::monthly_profile::MonthlyProfile;
use crate::config::parser_profile::ParserProfile;
use crate::config::report_profile::ReportProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: ParserProfile,
    pub report: ReportProfile,
    pub monthly: MonthlyProfile,
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 返回
    /// - Ok(AppConfig): 缺失的键回落到默认值
    /// - Err: 文件不可读、JSON 格式错误、校验失败
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "配置文件加载完成");
        Ok(config)
    }

    /// 可选路径加载：None 时使用默认配置
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                debug!("未指定配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 从 JSON 字符串解析配置
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置值
    ///
    /// # 校验规则
    /// 1. 检查项序号下限 >= 1 且不大于上限
    /// 2. 检查表表头恰好 5 列
    /// 3. 违规报告表头恰好 6 列
    /// 4. 月度汇总固定列表头 4 列、得分子表头 3 列，小数位 <= 6
    pub fn validate(&self) -> ConfigResult<()> {
        let parser = &self.parser;
        if parser.criterion_number_min == 0 {
            return Err(ConfigError::InvalidValue {
                key: "parser.criterion_number_min".to_string(),
                message: "序号下限必须 >= 1".to_string(),
            });
        }
        if parser.criterion_number_min > parser.criterion_number_max {
            return Err(ConfigError::InvalidValue {
                key: "parser.criterion_number_max".to_string(),
                message: format!(
                    "序号范围无效: [{}, {}]",
                    parser.criterion_number_min, parser.criterion_number_max
                ),
            });
        }

        if self.report.column_headers.len() != 5 {
            return Err(ConfigError::InvalidValue {
                key: "report.column_headers".to_string(),
                message: format!("表头必须为 5 列，实际 {}", self.report.column_headers.len()),
            });
        }

        if self.report.violation.column_headers.len() != 6 {
            return Err(ConfigError::InvalidValue {
                key: "report.violation.column_headers".to_string(),
                message: format!(
                    "违规表头必须为 6 列，实际 {}",
                    self.report.violation.column_headers.len()
                ),
            });
        }

        let monthly = &self.monthly;
        if monthly.column_headers.len() != 4 {
            return Err(ConfigError::InvalidValue {
                key: "monthly.column_headers".to_string(),
                message: format!("表头必须为 4 列，实际 {}", monthly.column_headers.len()),
            });
        }
        if monthly.total_subheaders.len() != 3 {
            return Err(ConfigError::InvalidValue {
                key: "monthly.total_subheaders".to_string(),
                message: format!("得分子表头必须为 3 列，实际 {}", monthly.total_subheaders.len()),
            });
        }
        if monthly.score_decimals > 6 {
            return Err(ConfigError::InvalidValue {
                key: "monthly.score_decimals".to_string(),
                message: format!("小数位必须 <= 6，实际 {}", monthly.score_decimals),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "parser": { "section_vocabulary": ["Сборочный участок"] } }"#,
        )
        .unwrap();

        assert_eq!(config.parser.section_vocabulary, vec!["Сборочный участок"]);
        assert_eq!(config.parser.criterion_number_max, 100);
        assert_eq!(config.report, ReportProfile::default());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = AppConfig::from_json_str(
            r#"{ "parser": { "criterion_number_min": 10, "criterion_number_max": 5 } }"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{ "report": {{ "footnotes": ["* примечание"] }} }}"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.report.footnotes, vec!["* примечание"]);
    }

    #[test]
    fn test_report_section_without_footnotes_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{ "report": { "title": "X" } }"#).unwrap();

        assert_eq!(config.report.title, "X");
        assert!(config.report.footnotes.is_empty());
        assert_eq!(
            config.report.signature_lines,
            ReportProfile::default().signature_lines
        );
    }

    #[test]
    fn test_monthly_section_overrides_mapping() {
        let config = AppConfig::from_json_str(
            r#"{ "monthly": { "department_mapping": { "Склад": "7" }, "score_decimals": 2 } }"#,
        )
        .unwrap();

        assert_eq!(config.monthly.department_for("Склад"), Some("7"));
        assert_eq!(config.monthly.department_for("УПП"), None);
        assert_eq!(config.monthly.score_decimals, 2);
        assert_eq!(config.monthly.sheet_name, "Сводная аналитика");
    }

    #[test]
    fn test_invalid_monthly_subheaders_rejected() {
        let result = AppConfig::from_json_str(r#"{ "monthly": { "total_subheaders": ["a"] } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "monthly.total_subheaders"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load_from_file("non_existent_config.json");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(AppConfig::load_or_default(None).unwrap(), AppConfig::default());
    }
}
