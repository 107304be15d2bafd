//! 翻页遍历状态机 - 流程层
//!
//! ## 状态
//!
//! ```text
//! Init → PageReady → CardLoop → PageAdvance → PageReady ...
//!                        ↓            ↓
//!                    Terminate ← (达到上限 / 没有下一页)
//! ```
//!
//! - 单张卡片出错只跳过该卡片，不重试
//! - 列出卡片、翻页出错则提前结束，已合并的结果照常返回
//! - 只有登录检查失败（需要登录或驱动出错）使整次运行失败

use super::extractor::extract_card;
use super::identity::resolve_job_id;
use super::merge::{merge_observation, MergeOutcome};
use super::session::{CrawlParams, CrawlSession};
use crate::driver::{CardHandle, PageDriver};
use crate::error::{CardExtractionError, CrawlError, DriverError};
use crate::models::PostingStore;
use crate::utils::logging::{log_page_start, truncate_text};
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

/// 观测时间来源
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// 正常结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalStatus {
    /// 达到数量上限
    #[default]
    CapReached,
    /// 没有下一页，结果可能少于上限
    PaginationExhausted,
    /// 列出卡片或翻页时驱动出错，结果可能少于上限
    DriverFault,
}

/// 单次运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub status: TerminalStatus,
    pub pages_visited: usize,
    pub processed: usize,
    pub created: usize,
    pub appended: usize,
    pub duplicates: usize,
    pub skipped: usize,
    /// 提前结束时的驱动错误
    pub fault: Option<String>,
}

/// 运行结果：更新后的记录和统计
#[derive(Debug)]
pub struct CrawlOutcome {
    pub store: PostingStore,
    pub report: CrawlReport,
}

/// 单张卡片的处理结果
#[derive(Debug)]
pub enum CardOutcome {
    /// 已合并（含本次重复）
    Merged { job_id: String, outcome: MergeOutcome },
    /// 提取失败，跳过
    Skipped(CardExtractionError),
}

enum CrawlState {
    Init,
    PageReady,
    CardLoop(Vec<CardHandle>),
    PageAdvance,
    Terminate(TerminalStatus),
}

/// 抓取状态机
///
/// 不持有浏览器资源，只依赖 [`PageDriver`] 能力
pub struct Crawler<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    clock: Clock,
}

impl<'a, D: PageDriver + ?Sized> Crawler<'a, D> {
    /// 使用本地时钟创建
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    /// 替换时钟（测试用固定时间）
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// 执行一次完整抓取
    ///
    /// # 参数
    /// - `params`: 关键词、地点、上限
    /// - `store`: 已加载的历史记录
    ///
    /// # 返回
    /// 成功时返回合并后的记录；失败时 `store` 被丢弃，调用方不应保存
    pub async fn run(
        &self,
        params: CrawlParams,
        mut store: PostingStore,
    ) -> Result<CrawlOutcome, CrawlError> {
        let mut session = CrawlSession::new(params);
        let mut report = CrawlReport::default();
        let mut state = CrawlState::Init;

        loop {
            state = match state {
                CrawlState::Init => {
                    if !self.driver.check_precondition().await? {
                        warn!("❌ 需要登录，抓取终止");
                        return Err(CrawlError::LoginRequired);
                    }
                    info!("✓ 登录状态正常 {}", session);
                    CrawlState::PageReady
                }

                CrawlState::PageReady => match self.driver.list_cards().await {
                    Ok(cards) => {
                        report.pages_visited += 1;
                        log_page_start(
                            report.pages_visited,
                            cards.len(),
                            session.processed_count(),
                            session.cap(),
                        );
                        CrawlState::CardLoop(cards)
                    }
                    Err(e) => driver_fault("列出卡片", e, &session, &mut report),
                },

                CrawlState::CardLoop(cards) => {
                    for card in &cards {
                        if session.is_capped() {
                            break;
                        }
                        let outcome = self.process_card(card, &mut session, &mut store).await;
                        self.tally(card, outcome, &mut session, &mut report);
                    }

                    if session.is_capped() {
                        CrawlState::Terminate(TerminalStatus::CapReached)
                    } else {
                        CrawlState::PageAdvance
                    }
                }

                CrawlState::PageAdvance => match self.advance_page().await {
                    Ok(true) => CrawlState::PageReady,
                    Ok(false) => {
                        warn!(
                            "⚠️ 没有更多页面，已处理 {}/{}",
                            session.processed_count(),
                            session.cap()
                        );
                        CrawlState::Terminate(TerminalStatus::PaginationExhausted)
                    }
                    Err(e) => driver_fault("翻页", e, &session, &mut report),
                },

                CrawlState::Terminate(status) => {
                    report.status = status;
                    report.processed = session.processed_count();
                    return Ok(CrawlOutcome { store, report });
                }
            };
        }
    }

    /// 点击下一页并等待稳定；没有下一页时返回 false
    async fn advance_page(&self) -> Result<bool, DriverError> {
        if !self.driver.next_page().await? {
            return Ok(false);
        }
        debug!("➡️ 已点击下一页");
        self.driver.settle().await?;
        Ok(true)
    }

    /// 处理单张卡片：提取 → 解析身份 → 合并
    pub async fn process_card(
        &self,
        card: &CardHandle,
        session: &mut CrawlSession,
        store: &mut PostingStore,
    ) -> CardOutcome {
        let observed_at = (self.clock)();
        let extracted = match extract_card(self.driver, card, observed_at).await {
            Ok(extracted) => extracted,
            Err(e) => return CardOutcome::Skipped(e),
        };

        let job_id = resolve_job_id(extracted.raw_link.as_deref());
        let title = truncate_text(&extracted.title, 60);
        let outcome = merge_observation(store, session, &job_id, extracted, observed_at);
        debug!("{} {} ({}) → {:?}", card, job_id, title, outcome);

        CardOutcome::Merged { job_id, outcome }
    }

    fn tally(
        &self,
        card: &CardHandle,
        outcome: CardOutcome,
        session: &mut CrawlSession,
        report: &mut CrawlReport,
    ) {
        match outcome {
            CardOutcome::Merged { job_id, outcome } => {
                if outcome.counts_toward_cap() {
                    session.record_processed();
                }
                match outcome {
                    MergeOutcome::Created => {
                        report.created += 1;
                        info!(
                            "🆕 [{}/{}] 新职位 {}",
                            session.processed_count(),
                            session.cap(),
                            job_id
                        );
                    }
                    MergeOutcome::Appended => {
                        report.appended += 1;
                        info!(
                            "🔁 [{}/{}] 追加快照 {}",
                            session.processed_count(),
                            session.cap(),
                            job_id
                        );
                    }
                    MergeOutcome::DuplicateInRun => {
                        report.duplicates += 1;
                        debug!("♻️ {} 本次已处理，跳过 {}", card, job_id);
                    }
                }
            }
            CardOutcome::Skipped(e) => {
                report.skipped += 1;
                warn!("⚠️ {}", e);
            }
        }
    }
}

/// 记录驱动错误并转入结束状态
fn driver_fault(
    operation: &str,
    error: DriverError,
    session: &CrawlSession,
    report: &mut CrawlReport,
) -> CrawlState {
    warn!(
        "⚠️ {}失败，提前结束并保留已处理的 {}/{} 个职位: {}",
        operation,
        session.processed_count(),
        session.cap(),
        error
    );
    report.fault = Some(format!("{operation}: {error}"));
    CrawlState::Terminate(TerminalStatus::DriverFault)
}
