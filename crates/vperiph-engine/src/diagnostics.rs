//! Synthetic diagnostics: periodic debug messages and test-mode pacing.

use crate::config::EngineConfig;
use crate::message::ScreenId;
use crate::screen::TestContext;

/// What the diagnostics want done on one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticStep {
    /// Sequence number of a periodic debug message due this tick.
    pub message: Option<u64>,
    /// Divided tick to pass to the active test screen.
    pub test_tick: Option<u64>,
}

#[derive(Debug, Clone)]
struct TestMode {
    screen: ScreenId,
    divider: u32,
    divided_counter: u64,
}

/// Per-tick counters behind `--messages` and `--test`.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    call_counter: u64,
    message_interval: u32,
    test: Option<TestMode>,
}

impl Diagnostics {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            call_counter: 0,
            message_interval: config.message_interval,
            test: config.test_screen.map(|screen| TestMode {
                screen,
                divider: 1,
                divided_counter: 0,
            }),
        }
    }

    pub fn call_counter(&self) -> u64 {
        self.call_counter
    }

    pub fn message_interval(&self) -> u32 {
        self.message_interval
    }

    pub fn test_screen(&self) -> Option<ScreenId> {
        self.test.as_ref().map(|t| t.screen)
    }

    pub fn divider(&self) -> Option<u32> {
        self.test.as_ref().map(|t| t.divider)
    }

    /// Context handed to screen test hooks.
    pub fn context(&self) -> TestContext {
        TestContext {
            screen: self.test_screen().unwrap_or(ScreenId::DEFAULT),
            call_counter: self.call_counter,
            message_interval: self.message_interval,
        }
    }

    /// Record the divider returned by `test_init`. Zero counts as one.
    pub fn set_divider(&mut self, divider: u32) {
        if let Some(test) = &mut self.test {
            test.divider = divider.max(1);
        }
    }

    /// Count one tick with `active` as the active screen.
    pub fn tick(&mut self, active: ScreenId) -> DiagnosticStep {
        self.call_counter += 1;
        let counter = self.call_counter;
        let mut step = DiagnosticStep::default();

        if self.message_interval > 0 && counter % u64::from(self.message_interval) == 0 {
            step.message = Some(counter / u64::from(self.message_interval));
        }

        if let Some(test) = &mut self.test {
            if test.screen == active && counter % u64::from(test.divider) == 0 {
                test.divided_counter += 1;
                step.test_tick = Some(test.divided_counter);
            }
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ScreenId {
        ScreenId::new(n).unwrap()
    }

    #[test]
    fn idle_without_options() {
        let mut diag = Diagnostics::new(&EngineConfig::default());
        for _ in 0..10 {
            assert_eq!(diag.tick(ScreenId::DEFAULT), DiagnosticStep::default());
        }
        assert_eq!(diag.call_counter(), 10);
        assert_eq!(diag.test_screen(), None);
    }

    #[test]
    fn periodic_messages_are_numbered() {
        let mut diag = Diagnostics::new(&EngineConfig::default().with_message_interval(3));
        let messages: Vec<u64> = (0..10)
            .filter_map(|_| diag.tick(ScreenId::DEFAULT).message)
            .collect();
        assert_eq!(messages, vec![1, 2, 3]);
    }

    #[test]
    fn test_ticks_respect_divider_and_active_screen() {
        let mut diag = Diagnostics::new(&EngineConfig::default().with_test_screen(id(2)));
        diag.set_divider(2);

        assert_eq!(diag.tick(id(2)).test_tick, None);
        assert_eq!(diag.tick(id(2)).test_tick, Some(1));
        assert_eq!(diag.tick(id(0)).test_tick, None);
        assert_eq!(diag.tick(id(0)).test_tick, None);
        assert_eq!(diag.tick(id(2)).test_tick, None);
        assert_eq!(diag.tick(id(2)).test_tick, Some(2));
        assert_eq!(diag.context().call_counter, 6);
        assert_eq!(diag.context().screen, id(2));
    }

    #[test]
    fn zero_divider_counts_as_one() {
        let mut diag = Diagnostics::new(&EngineConfig::default().with_test_screen(id(0)));
        diag.set_divider(0);
        assert_eq!(diag.divider(), Some(1));
        assert_eq!(diag.tick(id(0)).test_tick, Some(1));
    }
}
