//! 日志工具模块
//!
//! 提供日志初始化和各类横幅输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::outcome::BatchState;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - PDF 订单报表提取");
    info!("🤖 后端: {:?}，模型: {}", config.backend, config.model_name);
    info!("🌐 接口地址: {}", config.base_url());
    info!("📂 输出目录: {}", config.output_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录文件接收情况
///
/// # 参数
/// - `accepted`: 接收的 PDF 数量
/// - `selected`: 用户选择的文件总数
pub fn log_files_accepted(accepted: usize, selected: usize) {
    info!("✓ 共选择 {} 个文件，接收 {} 个 PDF", selected, accepted);
    if accepted < selected {
        info!("💡 {} 个非 PDF 文件已忽略", selected - accepted);
    }
    info!("📋 将逐个发送到提取服务\n");
}

/// 打印最终统计信息
pub fn print_final_stats(state: &BatchState, exported: &[String]) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", state.success_count(), state.outcomes().len());
    info!("❌ 失败: {}", state.error_count());
    info!("🧾 订单总数: {}", state.total_orders());
    info!("{}", "=".repeat(60));
    for path in exported {
        info!("报表已保存至: {}", path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Almada Fórum", 20), "Almada Fórum");
        assert_eq!(truncate_text("Almada Fórum", 6), "Almada...");
        assert_eq!(truncate_text("", 3), "");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
