// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 缺省只放行本系统的 info 级别,依赖库压到 warn
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 缺省日志过滤器: 本系统 info,其余 warn
pub const DEFAULT_LOG_FILTER: &str = "warn,model_governance=info";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: [`DEFAULT_LOG_FILTER`]）
///   例如: RUST_LOG=debug 或 RUST_LOG=model_governance=trace
///
/// # 示例
/// ```no_run
/// use model_governance::logging;
/// logging::init();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，缺省只看本系统
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // 配置日志格式
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 放行本系统的 debug 级别,便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("model_governance=debug"))
        .with_test_writer()
        .try_init();
}
