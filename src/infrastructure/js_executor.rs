//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"和"导航"的能力

use crate::error::DriverError;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() / goto() 能力，每次调用都有超时
/// - 不认识职位卡片，也不关心翻页流程
pub struct JsExecutor {
    page: Page,
    timeout: Duration,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page, timeout: Duration) -> Self {
        Self { page, timeout }
    }

    /// 获取 page 的引用（用于 Cookie 等其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 表达式并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, DriverError> {
        self.eval_as("eval", js_code).await
    }

    /// 执行 JS 表达式并反序列化为指定类型
    ///
    /// # 参数
    /// - `operation`: 操作名称，只用于超时/错误信息
    /// - `js_code`: 要执行的 JavaScript 代码
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        operation: &str,
        js_code: impl Into<String>,
    ) -> Result<T, DriverError> {
        let js_code = js_code.into();
        let result = self
            .with_timeout(operation, self.page.evaluate(js_code))
            .await??;
        result
            .into_value::<T>()
            .map_err(|e| DriverError::Script(format!("{operation}: {e}")))
    }

    /// 导航到指定地址并等待加载完成
    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        debug!("导航到: {}", url);
        self.with_timeout("goto", self.page.goto(url)).await??;
        self.with_timeout("wait_for_navigation", self.page.wait_for_navigation())
            .await??;
        Ok(())
    }

    async fn with_timeout<F: Future>(
        &self,
        operation: &str,
        fut: F,
    ) -> Result<F::Output, DriverError> {
        timeout(self.timeout, fut)
            .await
            .map_err(|_| DriverError::timeout(operation, self.timeout.as_millis() as u64))
    }
}
