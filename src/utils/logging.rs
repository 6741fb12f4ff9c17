/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::GenerateAllReport;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 菜单拍照模式");
    info!("📷 默认风格: {} | 分辨率: {}", config.default_style, config.default_size);
    info!("📊 最大并发数: {}", describe_limit(config.max_concurrent_generations));
    info!("{}", "=".repeat(60));
}

/// 记录批量生成开始
pub fn log_generate_all_start(requested: usize, skipped: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量生成: {} 道菜品", requested);
    if skipped > 0 {
        info!("⏭️ 跳过 {} 道已有图片或正在处理的菜品", skipped);
    }
    info!("{}", "=".repeat(60));
}

/// 打印批量生成统计
pub fn log_generate_all_complete(report: &GenerateAllReport) {
    info!("\n{}", "─".repeat(60));
    info!("📊 批量生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", report.succeeded, report.requested);
    info!("❌ 失败: {}", report.failed);
    info!("{}", "─".repeat(60));
}

fn describe_limit(limit: usize) -> String {
    if limit == 0 {
        "不限制".to_string()
    } else {
        limit.to_string()
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
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
        assert_eq!(truncate_text("汉堡包套餐", 2), "汉堡...");
        assert_eq!(truncate_text("Soup", 10), "Soup");
    }

    #[test]
    fn test_describe_limit() {
        assert_eq!(describe_limit(0), "不限制");
        assert_eq!(describe_limit(4), "4");
    }
}
