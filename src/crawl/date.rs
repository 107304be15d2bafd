//! 相对时间 → 日期
//!
//! "3 days ago" 这类描述换算为日历日期。月按 30 天、年按 365 天近似，
//! 不做日历运算。

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// 相对时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// 解析单位，大小写不敏感，接受复数形式
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = raw.trim().to_ascii_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower);
        match singular {
            "minute" => Some(TimeUnit::Minute),
            "hour" => Some(TimeUnit::Hour),
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }

    fn span(self, quantity: u32) -> Option<Duration> {
        let q = i64::from(quantity);
        match self {
            TimeUnit::Minute => Duration::try_minutes(q),
            TimeUnit::Hour => Duration::try_hours(q),
            TimeUnit::Day => Duration::try_days(q),
            TimeUnit::Week => Duration::try_weeks(q),
            TimeUnit::Month => Duration::try_days(q * 30),
            TimeUnit::Year => Duration::try_days(q * 365),
        }
    }
}

/// 计算 `now - quantity * unit` 的日期部分
///
/// 无法识别的单位按 0 处理，返回 `now` 当天；结果越界时返回最小日期。
pub fn resolve_relative_date(quantity: u32, unit: &str, now: NaiveDateTime) -> NaiveDate {
    let span = match TimeUnit::parse(unit) {
        Some(unit) => unit.span(quantity),
        None => Some(Duration::zero()),
    };

    span.and_then(|d| now.checked_sub_signed(d))
        .map(|dt| dt.date())
        .unwrap_or(NaiveDate::MIN)
}

/// 日期格式化为 `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
