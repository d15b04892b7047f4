//! ドライバ設定
//!
//! プロセス全体のグローバル変数ではなく、プローブ時に明示的に渡す。

/// Jack poll period in milliseconds
pub const JACK_POLL_INTERVAL_MS: u64 = 5000;

/// Codec address slots probed by the stream engine
pub const DEFAULT_MAX_CODEC_SLOTS: u32 = 8;

/// HDA driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdaConfig {
    /// Auto power-save timeout in seconds (0 = disabled)
    pub power_save_secs: u32,
    /// Jack-sense poll period
    pub jack_poll_interval_ms: u64,
    /// Number of codec slots to probe
    pub max_codec_slots: u32,
    /// Delay before the deferred probe task fires
    pub probe_delay_ms: u64,
}

impl HdaConfig {
    /// デフォルト設定
    pub const fn default() -> Self {
        Self {
            power_save_secs: 0,
            jack_poll_interval_ms: JACK_POLL_INTERVAL_MS,
            max_codec_slots: DEFAULT_MAX_CODEC_SLOTS,
            probe_delay_ms: 0,
        }
    }

    /// 省電力タイムアウトを設定
    pub const fn with_power_save(mut self, secs: u32) -> Self {
        self.power_save_secs = secs;
        self
    }

    /// Power-save timeout as forwarded to the stream engine
    pub const fn power_save_ms(&self) -> u32 {
        self.power_save_secs.saturating_mul(1000)
    }
}
