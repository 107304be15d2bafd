//! 卡片提取
//!
//! 点击卡片、等待详情加载，然后逐个读取字段。元素缺失用占位值代替，
//! 只有驱动本身出错（句柄失效、超时等）才算提取失败。

use super::date::{format_date, resolve_relative_date};
use super::identity::normalize_link;
use crate::driver::{CardField, CardHandle, PageDriver};
use crate::error::{CardExtractionError, DriverError};
use crate::models::{ExtractedCard, NOT_AVAILABLE, NO_DESCRIPTION};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// 发布时间，如 "Reposted 2 weeks ago"、"5 days ago"
static POSTED_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:reposted\s+)?(\d+)\s+(minute|hour|day|week|month|year)s?\s+ago")
        .expect("静态正则")
});

/// 申请人数，如 "Over 100 applicants"、"37 people clicked apply"
static APPLICANTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:over\s+)?\d[\d,]*\s+(?:applicants?|people clicked apply)")
        .expect("静态正则")
});

/// 元信息文本的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaInfo {
    pub post_date: String,
    pub applicants: String,
}

/// 解析元信息文本，两个字段互不影响，缺失时为 "N/A"
pub fn parse_meta(meta: &str, now: NaiveDateTime) -> MetaInfo {
    let post_date = POSTED_AGO
        .captures(meta)
        .and_then(|caps| {
            let quantity = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let unit = caps.get(2)?.as_str();
            Some(format_date(resolve_relative_date(quantity, unit, now)))
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let applicants = APPLICANTS
        .find(meta)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    MetaInfo {
        post_date,
        applicants,
    }
}

/// 提取一张卡片
///
/// # 参数
/// - `driver`: 页面驱动
/// - `card`: 卡片句柄
/// - `now`: 观测时间，用于换算相对发布时间
pub async fn extract_card<D>(
    driver: &D,
    card: &CardHandle,
    now: NaiveDateTime,
) -> Result<ExtractedCard, CardExtractionError>
where
    D: PageDriver + ?Sized,
{
    read_card(driver, card, now)
        .await
        .map_err(|source| CardExtractionError {
            position: card.position(),
            source,
        })
}

async fn read_card<D>(
    driver: &D,
    card: &CardHandle,
    now: NaiveDateTime,
) -> Result<ExtractedCard, DriverError>
where
    D: PageDriver + ?Sized,
{
    driver.click_card(card).await?;
    driver.settle().await?;

    let title = driver.read_field(card, CardField::Title).await?;
    let raw_link = driver.read_field(card, CardField::Link).await?;
    let company = driver.read_field(card, CardField::Company).await?;
    let meta = driver.read_field(card, CardField::Meta).await?;
    let description = driver.read_field(card, CardField::Description).await?;

    let meta = parse_meta(meta.as_deref().unwrap_or_default(), now);
    debug!("{} 元信息: {:?}", card, meta);

    Ok(ExtractedCard {
        title: title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        link: normalize_link(raw_link.as_deref()),
        raw_link,
        company: company.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        post_date: meta.post_date,
        applicants: meta.applicants,
        description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    /// 单卡片的假驱动
    struct OneCard {
        fields: HashMap<CardField, String>,
        fail_on: Option<CardField>,
    }

    #[async_trait]
    impl PageDriver for OneCard {
        async fn check_precondition(&self) -> Result<bool, DriverError> {
            Ok(true)
        }
        async fn list_cards(&self) -> Result<Vec<CardHandle>, DriverError> {
            Ok(vec![CardHandle::new("0-0", 0)])
        }
        async fn click_card(&self, _card: &CardHandle) -> Result<(), DriverError> {
            Ok(())
        }
        async fn read_field(
            &self,
            card: &CardHandle,
            field: CardField,
        ) -> Result<Option<String>, DriverError> {
            if self.fail_on == Some(field) {
                return Err(DriverError::StaleHandle {
                    key: card.key().to_string(),
                });
            }
            Ok(self.fields.get(&field).cloned())
        }
        async fn next_page(&self) -> Result<bool, DriverError> {
            Ok(false)
        }
        async fn settle(&self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_meta_both_patterns() {
        let meta = parse_meta("Singapore · Reposted 5 days ago · Over 100 applicants", now());
        assert_eq!(meta.post_date, "2024-01-05");
        assert_eq!(meta.applicants, "Over 100 applicants");
    }

    #[test]
    fn test_parse_meta_patterns_are_independent() {
        let meta = parse_meta("Singapore · 2 weeks ago", now());
        assert_eq!(meta.post_date, "2023-12-27");
        assert_eq!(meta.applicants, "N/A");

        let meta = parse_meta("Remote · 1,204 applicants", now());
        assert_eq!(meta.post_date, "N/A");
        assert_eq!(meta.applicants, "1,204 applicants");

        let meta = parse_meta("", now());
        assert_eq!(meta.post_date, "N/A");
        assert_eq!(meta.applicants, "N/A");
    }

    #[test]
    fn test_parse_meta_clicked_apply() {
        let meta = parse_meta("1 hour ago · 37 people clicked apply", now());
        assert_eq!(meta.post_date, "2024-01-10");
        assert_eq!(meta.applicants, "37 people clicked apply");
    }

    #[tokio::test]
    async fn test_missing_elements_use_placeholders() {
        let driver = OneCard {
            fields: HashMap::from([(CardField::Link, "/jobs/view/42/?trk=a".to_string())]),
            fail_on: None,
        };
        let card = CardHandle::new("0-0", 0);

        let extracted = tokio_test::assert_ok!(extract_card(&driver, &card, now()).await);
        assert_eq!(extracted.title, "N/A");
        assert_eq!(extracted.company, "N/A");
        assert_eq!(extracted.description, "No description found");
        assert_eq!(extracted.link, "/jobs/view/42/");
        assert_eq!(extracted.raw_link.as_deref(), Some("/jobs/view/42/?trk=a"));
        assert_eq!(extracted.post_date, "N/A");
        assert_eq!(extracted.applicants, "N/A");
    }

    #[tokio::test]
    async fn test_driver_error_becomes_extraction_error() {
        let driver = OneCard {
            fields: HashMap::new(),
            fail_on: Some(CardField::Company),
        };
        let card = CardHandle::new("3-4", 4);

        let err = extract_card(&driver, &card, now()).await.unwrap_err();
        assert_eq!(err.position, 4);
        assert!(matches!(err.source, DriverError::StaleHandle { .. }));
    }
}
