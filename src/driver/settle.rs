use std::time::Duration;

/// 页面稳定策略
///
/// 点击卡片或翻页后等待页面就绪的方式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlePolicy {
    /// 不等待
    None,
    /// 固定等待
    Fixed(Duration),
    /// 轮询直到选择器出现，超时后照常继续
    UntilSelector {
        selector: String,
        timeout: Duration,
        poll: Duration,
    },
}

impl SettlePolicy {
    /// 固定等待若干毫秒，0 表示不等待
    pub fn fixed_millis(ms: u64) -> Self {
        if ms == 0 {
            SettlePolicy::None
        } else {
            SettlePolicy::Fixed(Duration::from_millis(ms))
        }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::Fixed(Duration::from_secs(2))
    }
}
