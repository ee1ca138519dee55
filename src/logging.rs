// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use tracing_subscriber::EnvFilter;

/// 初始化日志: 默认 info 级别, 可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 重复初始化 (例如测试中) 时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
