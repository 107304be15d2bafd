/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use crate::config::Config;
use crate::crawl::{CrawlReport, TerminalStatus};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；未设置时根据 `verbose` 选择 debug 或 info。
/// 重复调用不会报错（测试里会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},chromiumoxide=warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 职位增量抓取");
    info!("🔍 关键词: {}", config.search_query);
    info!("📍 地点: {}", config.search_location);
    info!("📊 本次最多处理: {} 个职位", config.max_jobs);
    info!("💾 记录文件: {}", config.store_path);
    info!("{}", "=".repeat(60));
}

/// 记录开始处理某一页
pub fn log_page_start(page_number: usize, card_count: usize, processed: usize, cap: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📄 第 {} 页: {} 张卡片 (已处理 {}/{})",
        page_number, card_count, processed, cap
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 本次运行的统计
/// - `total_records`: 保存后记录文件中的职位总数
/// - `store_path`: 记录文件路径
pub fn print_final_stats(report: &CrawlReport, total_records: usize, store_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 抓取完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match report.status {
        TerminalStatus::CapReached => info!("🏁 结束原因: 达到数量上限"),
        TerminalStatus::PaginationExhausted => info!("🏁 结束原因: 没有更多页面"),
        TerminalStatus::DriverFault => info!(
            "🏁 结束原因: 页面驱动出错 ({})",
            report.fault.as_deref().unwrap_or("未知")
        ),
    }
    info!("📄 访问页数: {}", report.pages_visited);
    info!("✅ 处理: {}", report.processed);
    info!("🆕 新职位: {}", report.created);
    info!("🔁 追加快照: {}", report.appended);
    info!("♻️ 本次重复: {}", report.duplicates);
    info!("⚠️ 跳过卡片: {}", report.skipped);
    info!("{}", "=".repeat(60));
    info!("\n共 {} 个职位，已保存至: {}", total_records, store_path);
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
