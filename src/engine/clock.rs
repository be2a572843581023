use chrono::{Duration, Local, NaiveDate};

/// Calendar source for streak bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    pub fn fixed(today: NaiveDate) -> Self {
        Self::Fixed(today)
    }

    /// Today's date in the learner's local time zone.
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(d) => *d,
        }
    }

    /// Move a fixed clock forward. No effect on the system clock.
    pub fn advance_days(&mut self, days: i64) {
        if let Clock::Fixed(d) = self {
            *d += Duration::days(days);
        }
    }
}
