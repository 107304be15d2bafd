use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器启动或连接错误
    #[error("浏览器错误: {0}")]
    Browser(#[source] anyhow::Error),
    /// 抓取流程错误
    #[error("抓取错误: {0}")]
    Crawl(#[from] CrawlError),
    /// 持久化存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// CSV 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
}

/// 页面驱动错误（可能是瞬时的）
#[derive(Debug, Error)]
pub enum DriverError {
    /// 卡片句柄已失效（DOM 重新渲染）
    #[error("卡片句柄已失效: {key}")]
    StaleHandle { key: String },
    /// 页面交互超时
    #[error("页面交互超时 ({operation}, {timeout_ms}ms)")]
    Timeout { operation: String, timeout_ms: u64 },
    /// 脚本返回了无法识别的结果
    #[error("脚本执行失败: {0}")]
    Script(String),
    /// DevTools 协议错误
    #[error("CDP 错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// 单张卡片提取失败，只影响这一张卡片
#[derive(Debug, Error)]
#[error("第 {position} 张卡片提取失败: {source}")]
pub struct CardExtractionError {
    pub position: usize,
    #[source]
    pub source: DriverError,
}

/// 整次抓取失败
#[derive(Debug, Error)]
pub enum CrawlError {
    /// 登录前置条件不满足
    #[error("需要登录：页面显示登录弹窗")]
    LoginRequired,
    /// 登录检查时的驱动错误
    #[error("页面驱动错误: {0}")]
    Driver(#[from] DriverError),
}

/// 持久化存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("读取文件失败 ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON 解析失败 ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// 文件能解析，但记录内容不完整
    #[error("记录损坏 ({path}): 职位 {job_id} {reason}")]
    Corrupt {
        path: PathBuf,
        job_id: String,
        reason: String,
    },
    #[error("序列化失败: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("写入文件失败 ({path}): {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML 解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

/// CSV 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV 写入失败 ({path}): {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("CSV 刷新失败 ({path}): {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 包装浏览器启动/连接阶段的错误
    pub fn browser(source: impl Into<anyhow::Error>) -> Self {
        AppError::Browser(source.into())
    }
}

impl DriverError {
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        DriverError::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
