//! CSV 汇总导出
//!
//! 每个职位一行，快照只取最新一次。

use crate::error::ExportError;
use crate::models::{PostingStore, NOT_AVAILABLE};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    job_id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Link")]
    link: &'a str,
    #[serde(rename = "Post Date")]
    post_date: &'a str,
    #[serde(rename = "Latest Applicants")]
    latest_applicants: &'a str,
    #[serde(rename = "Snapshots")]
    snapshots: usize,
    #[serde(rename = "Last Seen")]
    last_seen: String,
}

/// 导出职位汇总 CSV
pub fn export_csv(path: &Path, store: &PostingStore) -> Result<(), ExportError> {
    let csv_error = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for (job_id, record) in store {
        let latest = record.latest_snapshot();
        writer
            .serialize(SummaryRow {
                job_id,
                title: &record.title,
                company: &record.company,
                link: &record.link,
                post_date: &record.post_date,
                latest_applicants: latest.map_or(NOT_AVAILABLE, |s| s.applicants.as_str()),
                snapshots: record.snapshots.len(),
                last_seen: latest
                    .map(|s| s.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    info!("✅ 已导出 {} 行到 {}", store.len(), path.display());
    Ok(())
}
