//! 测试用的脚本化页面驱动
//!
//! 按页给出卡片，每张卡片的字段预先写好；可以模拟字段缺失、
//! 卡片出错、未登录。

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use job_snapshot_crawler::error::DriverError;
use job_snapshot_crawler::{CardField, CardHandle, PageDriver};
use std::collections::HashMap;
use std::sync::Mutex;

/// 固定的观测时间 2024-01-10 09:00
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 10)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[derive(Debug, Clone)]
pub struct ScriptedCard {
    pub fields: HashMap<CardField, String>,
    pub fail: bool,
}

impl ScriptedCard {
    /// 一张完整的职位卡片，链接里带数字 ID
    pub fn job(id: &str) -> Self {
        let fields = HashMap::from([
            (CardField::Title, format!("Data Analyst {id}")),
            (CardField::Link, format!("/jobs/view/{id}/?refId=abc&trk=flagship")),
            (CardField::Company, "Acme Pte Ltd".to_string()),
            (CardField::Meta, "Singapore · 1 day ago · 12 applicants".to_string()),
            (CardField::Description, format!("<p>Role {id}</p>")),
        ]);
        Self {
            fields,
            fail: false,
        }
    }

    /// 驱动读取时抛错的卡片
    pub fn failing() -> Self {
        Self {
            fields: HashMap::new(),
            fail: true,
        }
    }

    pub fn with(mut self, field: CardField, value: &str) -> Self {
        self.fields.insert(field, value.to_string());
        self
    }

    pub fn without(mut self, field: CardField) -> Self {
        self.fields.remove(&field);
        self
    }
}

pub struct ScriptedDriver {
    pages: Vec<Vec<ScriptedCard>>,
    logged_in: bool,
    next_page_fault_on: Option<usize>,
    list_fault_on: Option<usize>,
    current_page: Mutex<usize>,
    clicked: Mutex<Vec<String>>,
    next_page_calls: Mutex<usize>,
}

impl ScriptedDriver {
    pub fn new(pages: Vec<Vec<ScriptedCard>>) -> Self {
        Self {
            pages,
            logged_in: true,
            next_page_fault_on: None,
            list_fault_on: None,
            current_page: Mutex::new(0),
            clicked: Mutex::new(Vec::new()),
            next_page_calls: Mutex::new(0),
        }
    }

    pub fn logged_out(mut self) -> Self {
        self.logged_in = false;
        self
    }

    /// 在第 `page` 页（从 0 开始）点击下一页时超时
    pub fn next_page_fails_on(mut self, page: usize) -> Self {
        self.next_page_fault_on = Some(page);
        self
    }

    /// 列出第 `page` 页的卡片时超时
    pub fn listing_fails_on(mut self, page: usize) -> Self {
        self.list_fault_on = Some(page);
        self
    }

    /// 被点击过的卡片 key，按顺序
    pub fn clicked(&self) -> Vec<String> {
        self.clicked.lock().unwrap().clone()
    }

    pub fn next_page_calls(&self) -> usize {
        *self.next_page_calls.lock().unwrap()
    }

    fn card(&self, handle: &CardHandle) -> Result<&ScriptedCard, DriverError> {
        let page = *self.current_page.lock().unwrap();
        let expected_prefix = format!("{page}-");
        if !handle.key().starts_with(&expected_prefix) {
            return Err(DriverError::StaleHandle {
                key: handle.key().to_string(),
            });
        }
        let card = &self.pages[page][handle.position()];
        if card.fail {
            return Err(DriverError::timeout("read_field", 30_000));
        }
        Ok(card)
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn check_precondition(&self) -> Result<bool, DriverError> {
        Ok(self.logged_in)
    }

    async fn list_cards(&self) -> Result<Vec<CardHandle>, DriverError> {
        let page = *self.current_page.lock().unwrap();
        if self.list_fault_on == Some(page) {
            return Err(DriverError::timeout("list_cards", 30_000));
        }
        Ok(self
            .pages
            .get(page)
            .map(|cards| {
                (0..cards.len())
                    .map(|i| CardHandle::new(format!("{page}-{i}"), i))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn click_card(&self, card: &CardHandle) -> Result<(), DriverError> {
        self.clicked.lock().unwrap().push(card.key().to_string());
        self.card(card).map(|_| ())
    }

    async fn read_field(
        &self,
        card: &CardHandle,
        field: CardField,
    ) -> Result<Option<String>, DriverError> {
        Ok(self.card(card)?.fields.get(&field).cloned())
    }

    async fn next_page(&self) -> Result<bool, DriverError> {
        *self.next_page_calls.lock().unwrap() += 1;
        let mut page = self.current_page.lock().unwrap();
        if self.next_page_fault_on == Some(*page) {
            return Err(DriverError::timeout("next_page", 30_000));
        }
        if *page + 1 < self.pages.len() {
            *page += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn settle(&self) -> Result<(), DriverError> {
        Ok(())
    }
}
