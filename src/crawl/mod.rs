//! 抓取流程层
//!
//! - `date` / `identity` - 纯函数：相对日期、职位标识
//! - `extractor` - 单张卡片的字段提取
//! - `merge` - 去重与快照合并
//! - `session` - 单次运行的状态（已处理集合、计数）
//! - `controller` - 翻页遍历状态机

pub mod controller;
pub mod date;
pub mod extractor;
pub mod identity;
pub mod merge;
pub mod session;

pub use controller::{CardOutcome, Clock, CrawlOutcome, CrawlReport, Crawler, TerminalStatus};
pub use date::{format_date, resolve_relative_date, TimeUnit};
pub use extractor::{extract_card, parse_meta, MetaInfo};
pub use identity::{normalize_link, resolve_job_id};
pub use merge::{merge_observation, MergeOutcome};
pub use session::{CrawlParams, CrawlSession};
