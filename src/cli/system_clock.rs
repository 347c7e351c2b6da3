use chrono::{DateTime, FixedOffset, Local, Utc};

use attend_core::Clock;

/// Wall clock. Stamps are UTC; absences default to the machine's local date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn calendar_offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}
