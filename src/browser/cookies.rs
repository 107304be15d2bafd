//! Cookie 持久化
//!
//! 运行前把上次保存的 Cookie 写回浏览器，运行后再保存一次，
//! 尽量避免每次都要重新登录。

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam};
use chromiumoxide::Page;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// 从文件加载 Cookie 到页面，文件不存在时跳过
///
/// # 返回
/// 返回加载的 Cookie 数量
pub async fn load_cookies(page: &Page, path: &Path) -> Result<usize> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("❌ Cookie 文件不存在: {}", path.display());
            return Ok(0);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("无法读取 Cookie 文件: {}", path.display()))
        }
    };

    let cookies = parse_cookies(&content)
        .with_context(|| format!("无法解析 Cookie 文件: {}", path.display()))?;
    let count = cookies.len();
    if count > 0 {
        page.set_cookies(cookies).await?;
    }
    info!("✅ 已加载 {} 个 Cookie", count);
    Ok(count)
}

/// 保存当前页面的 Cookie
pub async fn save_cookies(page: &Page, path: &Path) -> Result<usize> {
    let cookies: Vec<Cookie> = page.get_cookies().await?;
    let json = serde_json::to_string_pretty(&cookies)?;
    fs::write(path, json)
        .await
        .with_context(|| format!("无法写入 Cookie 文件: {}", path.display()))?;
    info!("✅ 已保存 {} 个 Cookie", cookies.len());
    Ok(cookies.len())
}

/// 保存的是 `Cookie`，写回时按 `CookieParam` 读取（多余字段忽略）
///
/// 会话 Cookie 的 `expires` 为 -1，写回时去掉
fn parse_cookies(content: &str) -> Result<Vec<CookieParam>> {
    let mut cookies: Vec<CookieParam> = serde_json::from_str(content)?;
    for cookie in &mut cookies {
        if cookie.expires.as_ref().is_some_and(|e| *e.inner() < 0.0) {
            cookie.expires = None;
        }
    }
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_saved_cookie_file() {
        let content = r#"[
            {
                "name": "li_at",
                "value": "secret",
                "domain": ".www.linkedin.com",
                "path": "/",
                "expires": 1767225600.5,
                "size": 11,
                "httpOnly": true,
                "secure": true,
                "session": false
            }
        ]"#;
        let cookies = parse_cookies(content).unwrap();

        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "li_at");
        assert_eq!(cookies[0].domain.as_deref(), Some(".www.linkedin.com"));
        assert_eq!(cookies[0].http_only, Some(true));
    }

    #[test]
    fn test_session_cookie_drops_expiry() {
        let content = r#"[{"name": "lang", "value": "v=2", "domain": ".linkedin.com", "expires": -1}]"#;
        let cookies = parse_cookies(content).unwrap();
        assert!(cookies[0].expires.is_none());
    }

    #[test]
    fn test_empty_cookie_file() {
        assert!(parse_cookies("[]").unwrap().is_empty());
        assert!(parse_cookies("not json").is_err());
    }
}
