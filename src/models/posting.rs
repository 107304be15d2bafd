//! 职位记录数据模型
//!
//! 持久化文件的字段名沿用历史数据（`Title`、`Post Date` 等），
//! 以便直接读取旧的 `job_data.json`。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// 页面元素缺失时的占位值
pub const NOT_AVAILABLE: &str = "N/A";

/// 职位描述缺失时的占位值
pub const NO_DESCRIPTION: &str = "No description found";

/// 一次观测中易变字段的快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 抓取时间（本地时间，不带时区）
    pub scraped_at: NaiveDateTime,
    /// 申请人数描述，如 "Over 100 applicants" 或 "N/A"
    pub applicants: String,
}

/// 单个职位的持久化记录
///
/// 除 `snapshots` 外的字段只在首次观测时写入，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRecord {
    #[serde(rename = "job_id")]
    pub job_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Post Date")]
    pub post_date: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// 按观测时间升序，只追加
    pub snapshots: Vec<Snapshot>,
}

impl PostingRecord {
    /// 由一次提取结果创建记录，附带第一个快照
    pub fn first_observation(job_id: String, card: ExtractedCard, observed_at: NaiveDateTime) -> Self {
        Self {
            job_id,
            title: card.title,
            link: card.link,
            company: card.company,
            post_date: card.post_date,
            description: card.description,
            snapshots: vec![Snapshot {
                scraped_at: observed_at,
                applicants: card.applicants,
            }],
        }
    }

    /// 最近一次快照
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

/// 卡片提取结果：一次观测得到的全部字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCard {
    pub title: String,
    /// 详情链接原始值（含查询参数），缺失时为 None
    pub raw_link: Option<String>,
    /// 规范化后的链接（仅路径）
    pub link: String,
    pub company: String,
    /// 解析后的发布日期 `YYYY-MM-DD`，或 "N/A"
    pub post_date: String,
    pub applicants: String,
    pub description: String,
}

/// 职位 ID → 记录 的有序映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingStore {
    records: BTreeMap<String, PostingRecord>,
}

impl PostingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.records.contains_key(job_id)
    }

    pub fn get(&self, job_id: &str) -> Option<&PostingRecord> {
        self.records.get(job_id)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PostingRecord> {
        self.records.iter()
    }

    /// 取得可写入口，供合并逻辑使用
    pub(crate) fn entry(&mut self, job_id: String) -> btree_map::Entry<'_, String, PostingRecord> {
        self.records.entry(job_id)
    }
}

impl<'a> IntoIterator for &'a PostingStore {
    type Item = (&'a String, &'a PostingRecord);
    type IntoIter = btree_map::Iter<'a, String, PostingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_record_uses_legacy_field_names() {
        let card = ExtractedCard {
            title: "Data Analyst".to_string(),
            raw_link: Some("/jobs/view/111/?trk=x".to_string()),
            link: "/jobs/view/111/".to_string(),
            company: "Acme".to_string(),
            post_date: "2024-01-05".to_string(),
            applicants: "Over 100 applicants".to_string(),
            description: "<p>hi</p>".to_string(),
        };
        let record = PostingRecord::first_observation("111".to_string(), card, at(9));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["job_id"], "111");
        assert_eq!(value["Title"], "Data Analyst");
        assert_eq!(value["Post Date"], "2024-01-05");
        assert_eq!(value["snapshots"][0]["scraped_at"], "2024-01-10T09:00:00");
        assert_eq!(value["snapshots"][0]["applicants"], "Over 100 applicants");
    }

    #[test]
    fn test_store_reads_python_isoformat_timestamps() {
        // 旧数据的时间戳带微秒、不带时区
        let raw = r#"{
            "222": {
                "job_id": "222",
                "Title": "BI Engineer",
                "Link": "/jobs/view/222/",
                "Company": "Globex",
                "Post Date": "2025-04-10",
                "Description": "No description found",
                "snapshots": [{"scraped_at": "2025-04-14T21:03:11.512345", "applicants": "N/A"}]
            }
        }"#;
        let store: PostingStore = serde_json::from_str(raw).unwrap();

        assert_eq!(store.len(), 1);
        let record = store.get("222").unwrap();
        assert_eq!(record.company, "Globex");
        assert_eq!(record.latest_snapshot().unwrap().applicants, "N/A");
    }
}
