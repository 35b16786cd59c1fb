use serde::{Deserialize, Serialize};

/// Configuration for driving the effect engine outside a plugin host, used by
/// the demo driver and by tests. The real-time entry points keep taking
/// explicit arguments; this struct only bundles the values a caller would
/// otherwise thread through by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub block_size: usize,
    /// Analysis window passed to the spectrum analyzer at instance creation.
    pub analysis_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 1024,
            analysis_window: crate::spectrum::ANALYSIS_WINDOW,
        }
    }
}
