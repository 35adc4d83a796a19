use chrono::NaiveDateTime;

/// Format of the time reply body, always 14 digits.
pub const TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of wall-clock time for `?T` replies.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn fixed_clock_formats_to_fourteen_digits() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        let text = FixedClock(at).now().format(TIME_FORMAT).to_string();
        assert_eq!(text, "20240309070501");
    }

    #[test]
    fn system_clock_formats_to_fourteen_digits() {
        let text = SystemClock.now().format(TIME_FORMAT).to_string();
        assert_eq!(text.len(), 14);
        assert!(text.bytes().all(|b| b.is_ascii_digit()));
    }
}
