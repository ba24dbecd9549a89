use std::time::Duration;

/// Engine tuning parameters.
///
/// `processing_duration` is the fixed wall time every order spends bound to
/// a worker. `tick_interval` is the nominal cadence of the external tick
/// driver; the engine itself is tick-source-agnostic and only compares the
/// timestamps it is handed, so the interval affects completion-detection
/// latency, never correctness.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub processing_duration: Duration,
    pub tick_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            processing_duration: Duration::from_secs(10),
            tick_interval: Duration::from_millis(100),
        }
    }
}

impl EngineConfig {
    pub fn with_processing_duration(mut self, duration: Duration) -> Self {
        self.processing_duration = duration;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}
