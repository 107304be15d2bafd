//! 基于 chromiumoxide 的页面驱动
//!
//! 所有页面操作都通过 [`JsExecutor`] 执行一小段 JS 完成。
//! 列出卡片时给每个卡片元素打上 `data-crawl-key` 标记，之后
//! 找不到该标记即视为句柄失效（页面重新渲染）。

use super::{CardField, CardHandle, PageDriver, SettlePolicy};
use crate::error::DriverError;
use crate::infrastructure::JsExecutor;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// 与 jQuery `:visible` 相同的可见性判断
const IS_VISIBLE_JS: &str =
    "const isVisible = (el) => !!(el && (el.offsetWidth || el.offsetHeight || el.getClientRects().length));";

/// 页面选择器
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub login_modal: String,
    pub card: String,
    pub title: String,
    pub link: String,
    pub company: String,
    pub meta: String,
    pub description: String,
    pub next_page: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            login_modal: "div.sign-in-modal".to_string(),
            card: ".job-card-container".to_string(),
            title: "h1.t-24.t-bold, .job-details-jobs-unified-top-card__job-title h1".to_string(),
            link: "div.job-details-jobs-unified-top-card__job-title a".to_string(),
            company: ".job-details-jobs-unified-top-card__company-name".to_string(),
            meta: ".job-details-jobs-unified-top-card__tertiary-description-container, \
                   .job-details-jobs-unified-top-card__primary-description-container"
                .to_string(),
            description: ".jobs-description-content__text--stretch".to_string(),
            next_page: "li.artdeco-pagination__indicator--number.active + li".to_string(),
        }
    }
}

/// 字段的读取方式
enum ReadMode {
    Text,
    Attr(&'static str),
    Html,
}

impl PageSelectors {
    fn for_field(&self, field: CardField) -> (&str, ReadMode) {
        match field {
            CardField::Title => (&self.title, ReadMode::Text),
            CardField::Link => (&self.link, ReadMode::Attr("href")),
            CardField::Company => (&self.company, ReadMode::Text),
            CardField::Meta => (&self.meta, ReadMode::Text),
            // 描述保留 HTML，下游按标题分段
            CardField::Description => (&self.description, ReadMode::Html),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldProbe {
    stale: bool,
    value: Option<String>,
}

/// Chromium 页面驱动
pub struct ChromiumDriver {
    executor: JsExecutor,
    selectors: PageSelectors,
    settle: SettlePolicy,
    generation: AtomicU64,
}

impl ChromiumDriver {
    pub fn new(executor: JsExecutor, selectors: PageSelectors, settle: SettlePolicy) -> Self {
        Self {
            executor,
            selectors,
            settle,
            generation: AtomicU64::new(0),
        }
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 打开搜索列表页：导航、滚动一次触发懒加载、等待第一张卡片
    pub async fn open_listing(&self, url: &str, wait: Duration) -> Result<(), DriverError> {
        self.executor.goto(url).await?;
        self.executor
            .eval("(() => { window.scrollBy(0, 1000); return true; })()")
            .await?;

        if !self.wait_for_selector(&self.selectors.card, wait, Duration::from_millis(250)).await {
            warn!(
                "⚠️ {} 秒内未出现职位卡片: {}",
                wait.as_secs(),
                self.selectors.card
            );
        }
        Ok(())
    }

    /// 轮询直到选择器出现；超时返回 false
    async fn wait_for_selector(&self, selector: &str, limit: Duration, poll: Duration) -> bool {
        let js = format!(
            "document.querySelector({}) !== null",
            js_string(selector)
        );
        let deadline = Instant::now() + limit;
        loop {
            match self.executor.eval_as::<bool>("wait_for_selector", js.as_str()).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("等待选择器 {} 时出错: {}", selector, e),
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(poll).await;
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn check_precondition(&self) -> Result<bool, DriverError> {
        let js = format!(
            "(() => {{ {IS_VISIBLE_JS} return !isVisible(document.querySelector({})); }})()",
            js_string(&self.selectors.login_modal)
        );
        self.executor.eval_as("check_precondition", js).await
    }

    async fn list_cards(&self) -> Result<Vec<CardHandle>, DriverError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let js = format!(
            r#"(() => {{
                const cards = document.querySelectorAll({selector});
                return Array.from(cards).map((card, i) => {{
                    const key = "{generation}-" + i;
                    card.setAttribute("data-crawl-key", key);
                    return key;
                }});
            }})()"#,
            selector = js_string(&self.selectors.card),
        );
        let keys: Vec<String> = self.executor.eval_as("list_cards", js).await?;
        debug!("第 {} 轮列出 {} 张卡片", generation, keys.len());

        Ok(keys
            .into_iter()
            .enumerate()
            .map(|(position, key)| CardHandle::new(key, position))
            .collect())
    }

    async fn click_card(&self, card: &CardHandle) -> Result<(), DriverError> {
        let js = format!(
            r#"(() => {{
                const card = document.querySelector('[data-crawl-key="' + {key} + '"]');
                if (!card) return false;
                card.scrollIntoView({{ block: "center" }});
                card.click();
                return true;
            }})()"#,
            key = js_string(card.key()),
        );
        if self.executor.eval_as::<bool>("click_card", js).await? {
            Ok(())
        } else {
            Err(DriverError::StaleHandle {
                key: card.key().to_string(),
            })
        }
    }

    async fn read_field(
        &self,
        card: &CardHandle,
        field: CardField,
    ) -> Result<Option<String>, DriverError> {
        let (selector, mode) = self.selectors.for_field(field);
        let read = match mode {
            ReadMode::Text => "el.innerText".to_string(),
            ReadMode::Attr(name) => format!("el.getAttribute({})", js_string(name)),
            ReadMode::Html => "el.innerHTML".to_string(),
        };
        let js = format!(
            r#"(() => {{
                if (!document.querySelector('[data-crawl-key="' + {key} + '"]')) {{
                    return {{ stale: true, value: null }};
                }}
                const el = document.querySelector({selector});
                if (!el) return {{ stale: false, value: null }};
                const value = {read};
                return {{ stale: false, value: value == null ? null : String(value).trim() }};
            }})()"#,
            key = js_string(card.key()),
            selector = js_string(selector),
        );

        let probe: FieldProbe = self.executor.eval_as(field.name(), js).await?;
        if probe.stale {
            return Err(DriverError::StaleHandle {
                key: card.key().to_string(),
            });
        }
        Ok(probe.value.filter(|v| !v.is_empty()))
    }

    async fn next_page(&self) -> Result<bool, DriverError> {
        let js = format!(
            r#"(() => {{
                {IS_VISIBLE_JS}
                const item = document.querySelector({selector});
                if (!isVisible(item)) return false;
                const target = item.querySelector("button") || item;
                target.click();
                return true;
            }})()"#,
            selector = js_string(&self.selectors.next_page),
        );
        self.executor.eval_as("next_page", js).await
    }

    async fn settle(&self) -> Result<(), DriverError> {
        match &self.settle {
            SettlePolicy::None => {}
            SettlePolicy::Fixed(delay) => sleep(*delay).await,
            SettlePolicy::UntilSelector {
                selector,
                timeout,
                poll,
            } => {
                if !self.wait_for_selector(selector, *timeout, *poll).await {
                    debug!("等待 {} 超时，继续执行", selector);
                }
            }
        }
        Ok(())
    }
}

/// 把字符串编码为 JS 字符串字面量
fn js_string(value: &str) -> String {
    // JSON 字符串字面量同时也是合法的 JS 字符串字面量
    serde_json::Value::String(value.to_string()).to_string()
}
