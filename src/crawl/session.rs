//! 单次运行的抓取会话
//!
//! 封装"本次运行处理过哪些职位、处理了多少个"，只在内存中存在。

use std::collections::HashSet;
use std::fmt;

/// 抓取参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlParams {
    pub query: String,
    pub location: String,
    /// 本次运行最多处理的职位数
    pub cap: usize,
}

/// 抓取会话
#[derive(Debug)]
pub struct CrawlSession {
    params: CrawlParams,
    seen_in_run: HashSet<String>,
    processed_count: usize,
}

impl CrawlSession {
    pub fn new(params: CrawlParams) -> Self {
        Self {
            params,
            seen_in_run: HashSet::new(),
            processed_count: 0,
        }
    }

    pub fn params(&self) -> &CrawlParams {
        &self.params
    }

    pub fn cap(&self) -> usize {
        self.params.cap
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// 是否已达上限
    pub fn is_capped(&self) -> bool {
        self.processed_count >= self.params.cap
    }

    pub fn has_seen(&self, job_id: &str) -> bool {
        self.seen_in_run.contains(job_id)
    }

    /// 标记为本次已处理；已标记过则返回 false
    pub fn mark_seen(&mut self, job_id: &str) -> bool {
        if self.seen_in_run.contains(job_id) {
            return false;
        }
        self.seen_in_run.insert(job_id.to_string())
    }

    /// 计数加一，达到上限后不再增加
    pub fn record_processed(&mut self) {
        debug_assert!(!self.is_capped(), "processed_count 超过上限");
        if !self.is_capped() {
            self.processed_count += 1;
        }
    }

    /// 本次运行处理过的职位数量
    pub fn seen_count(&self) -> usize {
        self.seen_in_run.len()
    }
}

impl fmt::Display for CrawlSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} @ {} {}/{}]",
            self.params.query, self.params.location, self.processed_count, self.params.cap
        )
    }
}
