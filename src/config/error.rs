// ==========================================
// 检查表报告系统 - 配置错误类型
// ==========================================

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误: {0}")]
    ParseError(String),

    #[error("正则配置无效 (key: {name}): {message}")]
    InvalidPattern { name: String, message: String },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
