//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (浏览器资源、Cookie、记录文件)
//!     ↓
//! crawl::Crawler (翻页状态机，处理单次运行)
//!     ↓
//! crawl::{extractor, identity, merge} (单张卡片)
//!     ↓
//! driver::PageDriver (页面能力)
//!     ↓
//! infrastructure::JsExecutor (唯一持有 Page)
//! ```
//!
//! 只有编排层持有 Browser；状态机只依赖 `PageDriver`。

pub mod app;

pub use app::{crawl_and_save, App};
