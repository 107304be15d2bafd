//! 页面驱动能力
//!
//! 抓取流程只通过 [`PageDriver`] 与浏览器交互：检查登录、列出卡片、
//! 点击卡片、读取字段、翻页、等待页面稳定。任何一步都可能返回
//! 瞬时错误，字段缺失则以 `None` 表示。

pub mod chromium;
pub mod settle;

pub use chromium::{ChromiumDriver, PageSelectors};
pub use settle::SettlePolicy;

use crate::error::DriverError;
use async_trait::async_trait;
use std::fmt;

/// 卡片句柄
///
/// 对流程层不透明，只由产生它的驱动解释。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardHandle {
    key: String,
    position: usize,
}

impl CardHandle {
    pub fn new(key: impl Into<String>, position: usize) -> Self {
        Self {
            key: key.into(),
            position,
        }
    }

    /// 驱动内部使用的标识
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 卡片在当前页中的序号（从 0 开始）
    pub fn position(&self) -> usize {
        self.position
    }
}

impl fmt::Display for CardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[卡片 #{} {}]", self.position + 1, self.key)
    }
}

/// 可读取的卡片字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    Title,
    /// 详情链接（href 原始值）
    Link,
    Company,
    /// 发布时间、申请人数等混在一起的元信息文本
    Meta,
    Description,
}

impl CardField {
    pub fn name(self) -> &'static str {
        match self {
            CardField::Title => "title",
            CardField::Link => "link",
            CardField::Company => "company",
            CardField::Meta => "meta",
            CardField::Description => "description",
        }
    }
}

/// 页面驱动
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 前置条件检查（已登录、列表可见）
    async fn check_precondition(&self) -> Result<bool, DriverError>;

    /// 当前页的所有卡片，按页面顺序
    async fn list_cards(&self) -> Result<Vec<CardHandle>, DriverError>;

    /// 点击卡片，打开详情
    async fn click_card(&self, card: &CardHandle) -> Result<(), DriverError>;

    /// 读取卡片（或其详情）的字段，元素不存在时返回 `None`
    async fn read_field(
        &self,
        card: &CardHandle,
        field: CardField,
    ) -> Result<Option<String>, DriverError>;

    /// 查找并点击"下一页"，没有下一页时返回 `false`
    async fn next_page(&self) -> Result<bool, DriverError>;

    /// 等待页面稳定
    async fn settle(&self) -> Result<(), DriverError>;
}
