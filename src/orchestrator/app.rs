//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **资源管理**：启动/连接浏览器，持有 Browser 和页面驱动
//! 2. **会话**：运行前加载 Cookie，运行后保存
//! 3. **增量抓取**：加载记录 → 运行状态机 → 保存记录
//! 4. **导出与统计**：可选的 CSV 汇总，输出最终统计
//!
//! 需要登录或记录文件读写出错时整次失败，旧文件保持原样；
//! 翻页途中驱动出错时照常保存已处理的结果。

use crate::browser;
use crate::config::Config;
use crate::crawl::{CrawlOutcome, CrawlParams, CrawlReport, Crawler};
use crate::driver::{ChromiumDriver, PageDriver, PageSelectors};
use crate::error::{AppError, AppResult, CrawlError};
use crate::export::export_csv;
use crate::infrastructure::JsExecutor;
use crate::store::{load_store, save_store};
use crate::utils::logging::{log_startup, print_final_stats};
use chromiumoxide::Browser;
use std::path::Path;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    driver: ChromiumDriver,
}

impl App {
    /// 初始化应用：启动或连接浏览器，加载 Cookie
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port).await,
            None => browser::launch_browser(&config).await,
        }
        .map_err(AppError::browser)?;

        if let Err(e) = browser::load_cookies(&page, Path::new(&config.cookies_file)).await {
            warn!("⚠️ 加载 Cookie 失败，继续运行: {:#}", e);
        }

        let executor = JsExecutor::new(page, config.interaction_timeout());
        let driver = ChromiumDriver::new(
            executor,
            PageSelectors::default(),
            config.settle_policy(),
        );

        Ok(Self {
            config,
            browser,
            driver,
        })
    }

    /// 运行一次增量抓取
    pub async fn run(&self) -> AppResult<CrawlReport> {
        let store_path = self.config.store_path();
        let url = self.config.search_url()?;

        info!("🔍 正在打开: {}", url);
        self.driver
            .open_listing(url.as_str(), self.config.interaction_timeout())
            .await
            .map_err(CrawlError::from)?;

        let outcome = crawl_and_save(&self.driver, self.config.crawl_params(), &store_path).await?;

        if let Some(csv_path) = &self.config.csv_export_path {
            export_csv(Path::new(csv_path), &outcome.store)?;
        }

        if let Err(e) =
            browser::save_cookies(self.driver.executor().page(), Path::new(&self.config.cookies_file)).await
        {
            warn!("⚠️ 保存 Cookie 失败: {:#}", e);
        }

        print_final_stats(&outcome.report, outcome.store.len(), &self.config.store_path);
        Ok(outcome.report)
    }

    /// 关闭自行启动的浏览器；连接的外部浏览器保持运行
    pub async fn shutdown(mut self) {
        if self.config.browser_debug_port.is_some() {
            return;
        }
        if let Err(e) = self.browser.close().await {
            error!("关闭浏览器失败: {}", e);
            return;
        }
        if let Err(e) = self.browser.wait().await {
            error!("等待浏览器退出失败: {}", e);
        }
    }
}

/// 加载记录、运行抓取、保存记录
///
/// 抓取失败时直接返回错误，不写文件
pub async fn crawl_and_save<D>(
    driver: &D,
    params: CrawlParams,
    store_path: &Path,
) -> AppResult<CrawlOutcome>
where
    D: PageDriver + ?Sized,
{
    let store = load_store(store_path).await?;
    let outcome = Crawler::new(driver).run(params, store).await?;
    save_store(store_path, &outcome.store).await?;
    Ok(outcome)
}
