//! D-day labels and urgency derivations for due dates.
//!
//! The label counts whole days between the due date and today:
//! "D-Day" when due today, "D-3" three days out, "D+2" two days
//! overdue.

use chrono::NaiveDate;

/// Items due within this many days count as urgent.
const URGENT_WINDOW_DAYS: i64 = 2;

pub fn label(due: NaiveDate, today: NaiveDate) -> String {
    let diff = (due - today).num_days();
    if diff < 0 {
        format!("D+{}", -diff)
    } else if diff == 0 {
        "D-Day".to_string()
    } else {
        format!("D-{}", diff)
    }
}

/// Due in two days or less, including today and overdue items.
pub fn is_urgent(due: NaiveDate, today: NaiveDate) -> bool {
    (due - today).num_days() <= URGENT_WINDOW_DAYS
}

/// Strictly past due.
pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn test_label_today() {
        assert_eq!(label(today(), today()), "D-Day");
    }

    #[test]
    fn test_label_future() {
        assert_eq!(label(today() + Duration::days(3), today()), "D-3");
        assert_eq!(label(today() + Duration::days(1), today()), "D-1");
    }

    #[test]
    fn test_label_overdue() {
        assert_eq!(label(today() - Duration::days(2), today()), "D+2");
        assert_eq!(label(today() - Duration::days(1), today()), "D+1");
    }

    #[test]
    fn test_urgent_window() {
        for diff in [-2i64, -1, 0, 1, 2] {
            assert!(
                is_urgent(today() + Duration::days(diff), today()),
                "diff {} should be urgent",
                diff
            );
        }
        assert!(!is_urgent(today() + Duration::days(3), today()));
        // Far overdue stays urgent.
        assert!(is_urgent(today() - Duration::days(30), today()));
    }

    #[test]
    fn test_overdue_is_strict() {
        assert!(!is_overdue(today(), today()));
        assert!(is_overdue(today() - Duration::days(1), today()));
        assert!(!is_overdue(today() + Duration::days(1), today()));
    }
}
