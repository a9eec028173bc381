//! 日志初始化
//!
//! 库内部只使用`tracing`的宏输出日志，是否输出、输出到哪里由调用方（如命令行工具）决定。

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// 初始化全局日志订阅者
///
/// 默认级别为`info`，可通过环境变量`RUST_LOG`覆盖（如`RUST_LOG=only_seg=debug`）。
/// 重复调用时直接忽略（例如测试中多次初始化）。
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
