// ==========================================
// 检查表报告系统 - 配置层
// ==========================================
// 职责: 解析规则表、报告文案，以参数形式注入各组件
// 存储: 可选 JSON 配置文件，缺省键使用内置默认值
// ==========================================

pub mod app_config;
pub mod error;
pub mod monthly_profile;
pub mod parser_profile;
pub mod report_profile;

// 重导出核心配置类型
pub use app_config::AppConfig;
pub use error::{ConfigError, ConfigResult};
pub use monthly_profile::MonthlyProfile;
pub use parser_profile::ParserProfile;
pub use report_profile::{ReportProfile, ViolationReportProfile};
