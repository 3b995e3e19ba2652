use crate::errors::ValidationError;
use crate::weather::ARCHIVE_PUBLICATION_DELAY_DAYS;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// The inclusive calendar-day range a report run covers. Every rainfall day,
/// capture day and simulation step falls inside this range.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        let period = Self { start, end };
        period.validate()?;
        Ok(period)
    }

    /// The default window: twelve months trailing, clamped so the end honours
    /// the historical archive's publication delay.
    pub fn trailing_year(today: NaiveDate) -> Self {
        let end = today - Days::new(ARCHIVE_PUBLICATION_DELAY_DAYS);
        Self {
            start: end - Months::new(12),
            end,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::new(format!(
                "analysis period start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn total_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> AnalysisDays {
        AnalysisDays {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Iterator over each calendar day of a period, in order.
pub struct AnalysisDays {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for AnalysisDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = match current < self.end {
            true => current.succ_opt(),
            false => None,
        };
        Some(current)
    }
}

/// First day of the calendar month containing the given date, used as the
/// grouping key for monthly aggregation.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}
