//! 职位身份解析
//!
//! 优先取链接里 `/view/<数字>` 的数字部分；取不到时退化为链接的
//! 路径部分（去掉协议、主机、查询参数和锚点）。不同职位在退化
//! 情况下可能得到相同标识，这一风险只记录不消除。

use crate::models::NOT_AVAILABLE;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static VIEW_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/view/(\d+)").expect("静态正则"));

/// 从原始链接解析稳定的职位标识
pub fn resolve_job_id(raw_link: Option<&str>) -> String {
    let Some(raw) = raw_link.map(str::trim).filter(|s| !s.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };

    if let Some(id) = VIEW_ID.captures(raw).and_then(|caps| caps.get(1)) {
        return id.as_str().to_string();
    }
    normalize_link(Some(raw))
}

/// 链接规范化为仅路径形式；缺失时为 "N/A"
pub fn normalize_link(raw_link: Option<&str>) -> String {
    let Some(raw) = raw_link.map(str::trim).filter(|s| !s.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };

    match Url::parse(raw) {
        Ok(url) => url.path().to_string(),
        // 相对链接
        Err(_) => raw.split(['?', '#']).next().unwrap_or(raw).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_from_view_path() {
        assert_eq!(
            resolve_job_id(Some("/jobs/view/3912345678/?refId=abc&trackingId=x")),
            "3912345678"
        );
        assert_eq!(
            resolve_job_id(Some("https://www.linkedin.com/jobs/view/111/")),
            "111"
        );
    }

    #[test]
    fn test_fallback_is_path_without_query() {
        assert_eq!(
            resolve_job_id(Some("/jobs/collections/recommended/?currentJobId=9")),
            "/jobs/collections/recommended/"
        );
        assert_eq!(
            resolve_job_id(Some("https://example.com/careers/data-analyst?src=li#apply")),
            "/careers/data-analyst"
        );
    }

    #[test]
    fn test_missing_link_uses_placeholder() {
        assert_eq!(resolve_job_id(None), "N/A");
        assert_eq!(resolve_job_id(Some("   ")), "N/A");
        assert_eq!(normalize_link(None), "N/A");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let link = Some("/jobs/view/222/?trk=1");
        assert_eq!(resolve_job_id(link), resolve_job_id(link));
        assert_ne!(resolve_job_id(link), resolve_job_id(Some("/jobs/view/2222/")));
    }

    #[test]
    fn test_normalized_link_keeps_view_path() {
        assert_eq!(
            normalize_link(Some("/jobs/view/222/?trk=1")),
            "/jobs/view/222/"
        );
    }
}
