// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别，可选 JSON 输出
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=checklist_report=trace
///
/// # 示例
/// ```no_run
/// use checklist_report::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with_format(false);
}

/// 初始化日志系统（json = true 时输出单行 JSON，便于日志采集）
///
/// 日志写到 stderr，stdout 留给命令输出
pub fn init_with_format(json: bool) {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // 重复初始化时保留已有订阅者
    if let Err(e) = result {
        eprintln!("日志系统已初始化: {}", e);
    }
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
