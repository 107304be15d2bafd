//! 去重与快照合并

use super::session::CrawlSession;
use crate::models::{ExtractedCard, PostingRecord, PostingStore, Snapshot};
use chrono::NaiveDateTime;
use std::collections::btree_map::Entry;

/// 合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// 首次出现，新建记录
    Created,
    /// 历史已有，追加一个快照
    Appended,
    /// 本次运行已处理过，什么都不做
    DuplicateInRun,
}

impl MergeOutcome {
    /// 是否计入本次处理数量
    pub fn counts_toward_cap(self) -> bool {
        !matches!(self, MergeOutcome::DuplicateInRun)
    }
}

/// 把一次观测合并进记录
///
/// 已有记录只追加快照，标题、公司、描述等字段保持首次观测时的值。
pub fn merge_observation(
    store: &mut PostingStore,
    session: &mut CrawlSession,
    job_id: &str,
    card: ExtractedCard,
    observed_at: NaiveDateTime,
) -> MergeOutcome {
    if !session.mark_seen(job_id) {
        return MergeOutcome::DuplicateInRun;
    }

    match store.entry(job_id.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(PostingRecord::first_observation(
                job_id.to_string(),
                card,
                observed_at,
            ));
            MergeOutcome::Created
        }
        Entry::Occupied(mut slot) => {
            slot.get_mut().snapshots.push(Snapshot {
                scraped_at: observed_at,
                applicants: card.applicants,
            });
            MergeOutcome::Appended
        }
    }
}
