//! Recurrence rules for calendar events.
//!
//! A rule is a frequency ("daily" or "weekly"), a set of weekdays for
//! weekly rules, and an optional inclusive end date. Weekday numbers
//! run 0 = Sunday .. 6 = Saturday, matching the convention used on
//! the wire and in storage. The frequency is kept as the raw stored
//! string so that unrecognized values degrade to "never recurs"
//! instead of failing the containing query.

use chrono::{Datelike, NaiveDate};

pub const FREQ_DAILY: &str = "daily";
pub const FREQ_WEEKLY: &str = "weekly";

/// A repeating rule attached to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    /// Raw frequency value; anything other than "daily"/"weekly"
    /// never matches.
    pub frequency: String,
    /// Active weekdays, 0 = Sunday .. 6 = Saturday. Only consulted
    /// for weekly rules.
    pub days_of_week: Vec<i64>,
    /// Inclusive last date the rule applies to.
    pub end_date: Option<NaiveDate>,
}

/// Weekday number for a date, 0 = Sunday .. 6 = Saturday.
pub fn weekday_number(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_sunday())
}

impl Recurrence {
    /// Whether this rule is active on `candidate`, given the anchor
    /// date of the owning event.
    ///
    /// Never true before the anchor or after the end date. A weekly
    /// rule with an empty weekday set, or with any entry outside
    /// 0..=6, matches nothing.
    pub fn occurs_on(&self, candidate: NaiveDate, anchor: NaiveDate) -> bool {
        if candidate < anchor {
            return false;
        }
        if let Some(end) = self.end_date {
            if candidate > end {
                return false;
            }
        }

        match self.frequency.as_str() {
            FREQ_DAILY => true,
            FREQ_WEEKLY => {
                self.days_are_valid() && self.days_of_week.contains(&weekday_number(candidate))
            }
            _ => false,
        }
    }

    fn days_are_valid(&self) -> bool {
        !self.days_of_week.is_empty() && self.days_of_week.iter().all(|d| (0..=6).contains(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly(days: Vec<i64>, end: Option<NaiveDate>) -> Recurrence {
        Recurrence {
            frequency: FREQ_WEEKLY.to_string(),
            days_of_week: days,
            end_date: end,
        }
    }

    #[test]
    fn test_weekday_number_convention() {
        // 2024-01-01 is a Monday; 2024-01-07 a Sunday.
        assert_eq!(weekday_number(date(2024, 1, 1)), 1);
        assert_eq!(weekday_number(date(2024, 1, 6)), 6);
        assert_eq!(weekday_number(date(2024, 1, 7)), 0);
    }

    #[test]
    fn test_weekly_matches_listed_days() {
        let rec = weekly(vec![1, 3, 5], None);
        let anchor = date(2024, 1, 1); // Monday

        assert!(rec.occurs_on(date(2024, 1, 8), anchor)); // next Monday
        assert!(rec.occurs_on(date(2024, 1, 3), anchor)); // Wednesday
        assert!(!rec.occurs_on(date(2024, 1, 2), anchor)); // Tuesday
    }

    #[test]
    fn test_never_matches_before_anchor() {
        let rec = weekly(vec![1], None);
        // 2023-12-25 is a Monday, but predates the anchor.
        assert!(!rec.occurs_on(date(2023, 12, 25), date(2024, 1, 1)));
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let rec = weekly(vec![1], Some(date(2024, 1, 10)));
        let anchor = date(2024, 1, 1);

        assert!(rec.occurs_on(date(2024, 1, 8), anchor)); // Monday, before end
        assert!(!rec.occurs_on(date(2024, 1, 15), anchor)); // Monday, past end

        let ends_on_monday = weekly(vec![1], Some(date(2024, 1, 8)));
        assert!(ends_on_monday.occurs_on(date(2024, 1, 8), anchor));
    }

    #[test]
    fn test_daily_matches_every_day_in_window() {
        let rec = Recurrence {
            frequency: FREQ_DAILY.to_string(),
            days_of_week: vec![],
            end_date: Some(date(2024, 1, 5)),
        };
        let anchor = date(2024, 1, 1);

        assert!(rec.occurs_on(date(2024, 1, 1), anchor));
        assert!(rec.occurs_on(date(2024, 1, 5), anchor));
        assert!(!rec.occurs_on(date(2024, 1, 6), anchor));
        assert!(!rec.occurs_on(date(2023, 12, 31), anchor));
    }

    #[test]
    fn test_empty_weekday_set_matches_nothing() {
        let rec = weekly(vec![], None);
        let anchor = date(2024, 1, 1);
        for offset in 0..14 {
            let candidate = anchor + chrono::Duration::days(offset);
            assert!(!rec.occurs_on(candidate, anchor));
        }
    }

    #[test]
    fn test_out_of_range_days_match_nothing() {
        let anchor = date(2024, 1, 1);
        let high = weekly(vec![1, 7], None);
        let negative = weekly(vec![-1, 1], None);

        assert!(!high.occurs_on(date(2024, 1, 8), anchor));
        assert!(!negative.occurs_on(date(2024, 1, 8), anchor));
    }

    #[test]
    fn test_unknown_frequency_never_recurs() {
        let rec = Recurrence {
            frequency: "monthly".to_string(),
            days_of_week: vec![0, 1, 2, 3, 4, 5, 6],
            end_date: None,
        };
        assert!(!rec.occurs_on(date(2024, 2, 1), date(2024, 1, 1)));
    }
}
