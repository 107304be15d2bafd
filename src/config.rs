use crate::crawl::CrawlParams;
use crate::driver::SettlePolicy;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "crawler.toml";

const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 程序配置
///
/// 优先级：默认值 < TOML 配置文件 < 环境变量
#[derive(Clone, Debug)]
pub struct Config {
    /// 搜索关键词
    pub search_query: String,
    /// 搜索地点
    pub search_location: String,
    /// 单次运行最多处理的职位数量
    pub max_jobs: usize,
    /// 职位搜索页地址
    pub search_base_url: String,
    /// 职位记录 JSON 文件
    pub store_path: String,
    /// CSV 汇总导出路径（不设置则不导出）
    pub csv_export_path: Option<String>,
    /// 浏览器调试端口；设置后连接已有浏览器，否则自行启动
    pub browser_debug_port: Option<u16>,
    /// 自行启动时是否使用无头模式
    pub headless: bool,
    /// 浏览器可执行文件路径（不设置则自动查找）
    pub chrome_executable: Option<String>,
    /// 浏览器用户数据目录
    pub profile_dir: String,
    /// Cookie 文件
    pub cookies_file: String,
    /// 每次点击/翻页后的等待时间（毫秒）；设置了 `settle_selector` 时为最长等待时间
    pub settle_delay_ms: u64,
    /// 点击/翻页后轮询等待出现的选择器（不设置则固定等待）
    pub settle_selector: Option<String>,
    /// 单次页面交互的超时时间（毫秒）
    pub interaction_timeout_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_query: "data analyst".to_string(),
            search_location: "Singapore".to_string(),
            max_jobs: 25,
            search_base_url: "https://www.linkedin.com/jobs/search/".to_string(),
            store_path: "job_data.json".to_string(),
            csv_export_path: None,
            browser_debug_port: None,
            headless: true,
            chrome_executable: None,
            profile_dir: "./profile".to_string(),
            cookies_file: "cookies.json".to_string(),
            settle_delay_ms: 2000,
            settle_selector: None,
            interaction_timeout_ms: 30_000,
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    search_query: Option<String>,
    search_location: Option<String>,
    max_jobs: Option<usize>,
    search_base_url: Option<String>,
    store_path: Option<String>,
    csv_export_path: Option<String>,
    browser_debug_port: Option<u16>,
    headless: Option<bool>,
    chrome_executable: Option<String>,
    profile_dir: Option<String>,
    cookies_file: Option<String>,
    settle_delay_ms: Option<u64>,
    settle_selector: Option<String>,
    interaction_timeout_ms: Option<u64>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载完整配置并校验
    ///
    /// `CRAWLER_CONFIG` 指定的文件必须存在；未指定时尝试读取
    /// `crawler.toml`，不存在则跳过。
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match std::env::var("CRAWLER_CONFIG") {
            Ok(path) => config.apply_file(Path::new(&path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    config.apply_file(path)?;
                }
            }
        }

        config.apply_env_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 用 TOML 文件中出现的字段覆盖当前值
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        self.apply_toml(&content, path)
    }

    fn apply_toml(&mut self, content: &str, path: &Path) -> Result<(), ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                source,
            })?;

        macro_rules! take {
            ($field:ident) => {
                if let Some(value) = file.$field {
                    self.$field = value;
                }
            };
            (opt $field:ident) => {
                if file.$field.is_some() {
                    self.$field = file.$field;
                }
            };
        }

        take!(search_query);
        take!(search_location);
        take!(max_jobs);
        take!(search_base_url);
        take!(store_path);
        take!(opt csv_export_path);
        take!(opt browser_debug_port);
        take!(headless);
        take!(opt chrome_executable);
        take!(profile_dir);
        take!(cookies_file);
        take!(settle_delay_ms);
        take!(opt settle_selector);
        take!(interaction_timeout_ms);
        take!(verbose_logging);
        Ok(())
    }

    /// 用环境变量覆盖当前值，`lookup` 便于测试时注入
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SEARCH_QUERY") {
            self.search_query = v;
        }
        if let Some(v) = lookup("SEARCH_LOCATION") {
            self.search_location = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_JOBS", "usize")? {
            self.max_jobs = v;
        }
        if let Some(v) = lookup("SEARCH_BASE_URL") {
            self.search_base_url = v;
        }
        if let Some(v) = lookup("STORE_PATH") {
            self.store_path = v;
        }
        if let Some(v) = lookup("CSV_EXPORT_PATH") {
            self.csv_export_path = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "HEADLESS", "bool")? {
            self.headless = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("PROFILE_DIR") {
            self.profile_dir = v;
        }
        if let Some(v) = lookup("COOKIES_FILE") {
            self.cookies_file = v;
        }
        if let Some(v) = parse_var(&lookup, "SETTLE_DELAY_MS", "u64")? {
            self.settle_delay_ms = v;
        }
        if let Some(v) = lookup("SETTLE_SELECTOR") {
            self.settle_selector = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "INTERACTION_TIMEOUT_MS", "u64")? {
            self.interaction_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(())
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_jobs == 0 {
            return Err(ConfigError::invalid("max_jobs", "必须是正整数"));
        }
        if self.search_query.trim().is_empty() {
            return Err(ConfigError::invalid("search_query", "不能为空"));
        }
        if self.interaction_timeout_ms == 0 {
            return Err(ConfigError::invalid("interaction_timeout_ms", "必须大于 0"));
        }
        if self
            .settle_selector
            .as_ref()
            .is_some_and(|s| s.trim().is_empty())
        {
            return Err(ConfigError::invalid("settle_selector", "不能为空"));
        }
        self.search_url()?;
        Ok(())
    }

    /// 拼出带查询参数的搜索页地址
    pub fn search_url(&self) -> Result<Url, ConfigError> {
        Url::parse_with_params(
            &self.search_base_url,
            &[
                ("keywords", self.search_query.as_str()),
                ("location", self.search_location.as_str()),
                ("f_E", "1"),
            ],
        )
        .map_err(|e| ConfigError::invalid("search_base_url", e.to_string()))
    }

    pub fn crawl_params(&self) -> CrawlParams {
        CrawlParams {
            query: self.search_query.clone(),
            location: self.search_location.clone(),
            cap: self.max_jobs,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// 页面稳定策略：有选择器时轮询等待，否则固定等待
    pub fn settle_policy(&self) -> SettlePolicy {
        match &self.settle_selector {
            Some(selector) => SettlePolicy::UntilSelector {
                selector: selector.clone(),
                timeout: self.settle_delay(),
                poll: SETTLE_POLL_INTERVAL,
            },
            None => SettlePolicy::fixed_millis(self.settle_delay_ms),
        }
    }

    pub fn interaction_timeout(&self) -> Duration {
        Duration::from_millis(self.interaction_timeout_ms)
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store_path)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value: raw,
                expected_type: expected_type.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_env_with(env(&[
                ("SEARCH_QUERY", "rust engineer"),
                ("MAX_JOBS", "5"),
                ("BROWSER_DEBUG_PORT", "9222"),
                ("HEADLESS", "false"),
            ]))
            .unwrap();

        assert_eq!(config.search_query, "rust engineer");
        assert_eq!(config.max_jobs, 5);
        assert_eq!(config.browser_debug_port, Some(9222));
        assert!(!config.headless);
        assert_eq!(config.search_location, "Singapore");
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_env_with(env(&[("MAX_JOBS", "lots")]))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "MAX_JOBS"
        ));
    }

    #[test]
    fn test_toml_layer_then_env() {
        let mut config = Config::default();
        config
            .apply_toml(
                "search_location = \"Berlin\"\nmax_jobs = 40\ncsv_export_path = \"jobs.csv\"\n",
                Path::new("crawler.toml"),
            )
            .unwrap();
        config
            .apply_env_with(env(&[("MAX_JOBS", "10")]))
            .unwrap();

        assert_eq!(config.search_location, "Berlin");
        assert_eq!(config.max_jobs, 10);
        assert_eq!(config.csv_export_path.as_deref(), Some("jobs.csv"));
    }

    #[test]
    fn test_unknown_toml_key_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_toml("max_job = 3\n", Path::new("crawler.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_zero_cap_is_invalid() {
        let config = Config {
            max_jobs: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "max_jobs"
        ));
    }

    #[test]
    fn test_settle_policy_follows_selector() {
        let mut config = Config::default();
        assert_eq!(
            config.settle_policy(),
            SettlePolicy::Fixed(Duration::from_millis(2000))
        );

        config
            .apply_env_with(env(&[
                ("SETTLE_SELECTOR", ".jobs-description-content__text"),
                ("SETTLE_DELAY_MS", "5000"),
            ]))
            .unwrap();

        assert_eq!(
            config.settle_policy(),
            SettlePolicy::UntilSelector {
                selector: ".jobs-description-content__text".to_string(),
                timeout: Duration::from_secs(5),
                poll: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn test_settle_selector_from_toml_and_blank_rejected() {
        let mut config = Config::default();
        config
            .apply_toml("settle_selector = \"  \"\n", Path::new("crawler.toml"))
            .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "settle_selector"
        ));
    }

    #[test]
    fn test_search_url_is_encoded() {
        let config = Config {
            search_query: "data analyst".to_string(),
            search_location: "São Paulo".to_string(),
            ..Config::default()
        };
        let url = config.search_url().unwrap();

        assert_eq!(url.host_str(), Some("www.linkedin.com"));
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["keywords"], "data analyst");
        assert_eq!(pairs["location"], "São Paulo");
        assert_eq!(pairs["f_E"], "1");
    }
}
