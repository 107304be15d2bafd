//! # Job Snapshot Crawler
//!
//! 通过浏览器会话抓取分页的职位列表，跨多次运行维护去重后的职位记录，
//! 并记录申请人数等易变字段随时间的变化
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供带超时的 eval() / goto()
//!
//! ### ② 页面能力层（Driver）
//! - `driver/` - `PageDriver` 描述"页面能做什么"：登录检查、列卡片、点击、读字段、翻页、等待
//! - `ChromiumDriver` - 基于 chromiumoxide 的实现
//! - `SettlePolicy` - 可替换的页面稳定策略
//!
//! ### ③ 流程层（Crawl）
//! - `crawl/` - 单次运行的状态机与单张卡片的处理
//! - `CrawlSession` - 本次运行的已处理集合和计数
//! - `Crawler` - Init → PageReady → CardLoop → PageAdvance / Terminate
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 浏览器生命周期、Cookie、记录文件读写、CSV 导出
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod crawl;
pub mod driver;
pub mod error;
pub mod export;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod store;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use crawl::{CrawlOutcome, CrawlParams, CrawlReport, Crawler, TerminalStatus};
pub use driver::{CardField, CardHandle, PageDriver};
pub use error::{AppError, AppResult};
pub use models::{PostingRecord, PostingStore, Snapshot};
pub use orchestrator::{crawl_and_save, App};
