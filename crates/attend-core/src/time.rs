//! Time source for ledger stamps and the attendance calendar.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Supplies the instant used for `updated_at`/`recorded_at` stamps and the
/// calendar day an absence is filed under when no date is given.
///
/// Stamps are always UTC. The attendance day is the date on the student's
/// wall clock, so `today` shifts `now` by [`Clock::calendar_offset`] before
/// taking the date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the attendance calendar from UTC. Zero unless overridden.
    fn calendar_offset(&self) -> FixedOffset {
        Utc.fix()
    }

    fn today(&self) -> NaiveDate {
        self.now()
            .with_timezone(&self.calendar_offset())
            .date_naive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct Kolkata(DateTime<Utc>);

    impl Clock for Kolkata {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }

        fn calendar_offset(&self) -> FixedOffset {
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        }
    }

    #[test]
    fn late_utc_evening_is_already_tomorrow_on_the_calendar() {
        let clock = Kolkata(Utc.with_ymd_and_hms(2024, 9, 16, 20, 0, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 9, 17).unwrap());
    }

    #[test]
    fn default_calendar_is_utc() {
        struct Plain;
        impl Clock for Plain {
            fn now(&self) -> DateTime<Utc> {
                Utc.with_ymd_and_hms(2024, 9, 16, 23, 59, 0).unwrap()
            }
        }
        assert_eq!(Plain.today(), NaiveDate::from_ymd_opt(2024, 9, 16).unwrap());
    }
}
