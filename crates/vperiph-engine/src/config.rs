use std::time::Duration;

use vperiph_frame::FrameConfig;

use crate::message::ScreenId;

/// Delay between two ticks of the transport loop.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Delay before the first tick.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_millis(100);

/// Engine settings, read-only once the engine is built.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Enables the `d` flag in the version reply and the debug channel.
    pub debug: bool,
    /// Verbosity level requested by the operator.
    pub verbose: u8,
    /// Screen driven by test mode, if any.
    pub test_screen: Option<ScreenId>,
    /// Emit a diagnostic every N ticks. 0 disables it.
    pub message_interval: u32,
    pub tick_interval: Duration,
    pub startup_delay: Duration,
    pub frame: FrameConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            verbose: 0,
            test_screen: None,
            message_interval: 0,
            tick_interval: DEFAULT_TICK_INTERVAL,
            startup_delay: DEFAULT_STARTUP_DELAY,
            frame: FrameConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the diagnostic interval; a non-zero interval turns on debug.
    pub fn with_message_interval(mut self, interval: u32) -> Self {
        self.message_interval = interval;
        if interval > 0 {
            self.debug = true;
        }
        self
    }

    pub fn with_test_screen(mut self, id: ScreenId) -> Self {
        self.test_screen = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_firmware_timing() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(10));
        assert_eq!(config.startup_delay, Duration::from_millis(100));
        assert!(!config.debug);
        assert_eq!(config.test_screen, None);
    }

    #[test]
    fn message_interval_implies_debug() {
        assert!(EngineConfig::default().with_message_interval(5).debug);
        assert!(!EngineConfig::default().with_message_interval(0).debug);
    }
}
