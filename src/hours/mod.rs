// Business hours gate
//
// Resolves whether a category currently accepts orders, either from the
// default schedule or from a per-category override window. Time comparison
// is done in minutes since midnight, so a window may legitimately cross
// midnight (e.g. a night bar open 22:00-02:00).

use chrono::{Datelike, Local, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Policy for missing or unparseable time configuration: the store is
/// treated as open. Failing closed would block commerce on a config defect.
pub const FAIL_OPEN: bool = true;

/// Default schedule consumed from persisted configuration
///
/// `days_off` holds lowercase English weekday names ("monday", ...); a
/// listed day is closed all day regardless of the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHours {
    pub default_open: String,
    pub default_close: String,
    #[serde(default)]
    pub days_off: Vec<String>,
}

impl Default for BusinessHours {
    fn default() -> Self {
        // open == close means always open
        Self {
            default_open: "00:00".to_string(),
            default_close: "00:00".to_string(),
            days_off: Vec::new(),
        }
    }
}

/// Per-category override window loaded from the category row
#[derive(Debug, Clone, Default)]
pub struct CategoryWindow {
    pub active: bool,
    pub open_order_time: Option<String>,
    pub last_order_time: Option<String>,
}

/// Parse "HH:MM" into minutes since midnight.
///
/// Returns None for anything unparseable; callers fall back to the
/// fail-open policy rather than rejecting orders.
fn parse_minutes(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Evaluate a window against the current minute of day.
///
/// Three shapes when both bounds parse:
/// - open == close: always open
/// - open < close: open iff now in [open, close)
/// - open > close: crosses midnight, open iff now >= open OR now < close
///
/// A bound that is missing or unparseable drops its check (fail-open).
fn window_open(open: Option<u32>, close: Option<u32>, now_minutes: u32) -> bool {
    match (open, close) {
        (Some(open), Some(close)) => {
            if open == close {
                true
            } else if open < close {
                now_minutes >= open && now_minutes < close
            } else {
                now_minutes >= open || now_minutes < close
            }
        }
        (Some(open), None) => now_minutes >= open,
        (None, Some(close)) => now_minutes < close,
        (None, None) => FAIL_OPEN,
    }
}

/// Pure resolution of a category's open state at a given instant.
///
/// Resolution order: inactive category is closed; a category with an
/// override window uses that window (and ignores the default schedule's
/// days off); otherwise the default schedule applies.
pub fn is_open_at(
    window: &CategoryWindow,
    schedule: &BusinessHours,
    weekday: Weekday,
    now_minutes: u32,
) -> bool {
    if !window.active {
        return false;
    }

    let has_override = window.open_order_time.is_some() || window.last_order_time.is_some();
    if has_override {
        let open = window.open_order_time.as_deref().and_then(parse_minutes);
        let close = window.last_order_time.as_deref().and_then(parse_minutes);
        return window_open(open, close, now_minutes);
    }

    let today = weekday_name(weekday);
    if schedule
        .days_off
        .iter()
        .any(|day| day.eq_ignore_ascii_case(today))
    {
        return false;
    }

    let open = parse_minutes(&schedule.default_open);
    let close = parse_minutes(&schedule.default_close);
    window_open(open, close, now_minutes)
}

/// Business hours gate
///
/// Holds the resolved default schedule for the process lifetime and fetches
/// exactly one category row per check. Safe to call at high frequency.
pub struct BusinessHoursGate {
    pool: PgPool,
    schedule: BusinessHours,
}

impl BusinessHoursGate {
    pub fn new(pool: PgPool, schedule: BusinessHours) -> Self {
        Self { pool, schedule }
    }

    /// Whether the category currently accepts orders.
    ///
    /// An unknown category id is reported closed; nothing can be ordered
    /// from a category the catalog does not know.
    pub async fn is_category_open(&self, category_id: &str) -> Result<bool, sqlx::Error> {
        let row: Option<(bool, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT active, open_order_time, last_order_time FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((active, open_order_time, last_order_time)) = row else {
            tracing::debug!("Category {} not found, treating as closed", category_id);
            return Ok(false);
        };

        let window = CategoryWindow {
            active,
            open_order_time,
            last_order_time,
        };

        let now = Local::now();
        let now_minutes = now.time().hour() * 60 + now.time().minute();
        Ok(is_open_at(
            &window,
            &self.schedule,
            now.weekday(),
            now_minutes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_window() -> CategoryWindow {
        CategoryWindow {
            active: true,
            open_order_time: None,
            last_order_time: None,
        }
    }

    fn schedule(open: &str, close: &str) -> BusinessHours {
        BusinessHours {
            default_open: open.to_string(),
            default_close: close.to_string(),
            days_off: Vec::new(),
        }
    }

    fn minutes(hh: u32, mm: u32) -> u32 {
        hh * 60 + mm
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("00:00"), Some(0));
        assert_eq!(parse_minutes("09:30"), Some(570));
        assert_eq!(parse_minutes("23:59"), Some(1439));
        assert_eq!(parse_minutes(" 11:00 "), Some(660));
        assert_eq!(parse_minutes("24:00"), None);
        assert_eq!(parse_minutes("12:60"), None);
        assert_eq!(parse_minutes("noon"), None);
        assert_eq!(parse_minutes(""), None);
    }

    #[test]
    fn test_inactive_category_is_closed() {
        let window = CategoryWindow {
            active: false,
            ..Default::default()
        };
        let always_open = schedule("00:00", "00:00");
        assert!(!is_open_at(
            &window,
            &always_open,
            Weekday::Mon,
            minutes(12, 0)
        ));
    }

    #[test]
    fn test_equal_open_close_is_always_open() {
        let sched = schedule("00:00", "00:00");
        for hh in 0..24 {
            assert!(is_open_at(
                &active_window(),
                &sched,
                Weekday::Wed,
                minutes(hh, 0)
            ));
        }
    }

    #[test]
    fn test_same_day_window() {
        let sched = schedule("08:00", "17:00");
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Tue,
            minutes(8, 0)
        ));
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Tue,
            minutes(16, 59)
        ));
        // close is exclusive
        assert!(!is_open_at(
            &active_window(),
            &sched,
            Weekday::Tue,
            minutes(17, 0)
        ));
        assert!(!is_open_at(
            &active_window(),
            &sched,
            Weekday::Tue,
            minutes(7, 59)
        ));
    }

    #[test]
    fn test_midnight_crossing_window() {
        // 22:00-02:00: open at 23:30 and 01:00, closed at 10:00
        let sched = schedule("22:00", "02:00");
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Fri,
            minutes(23, 30)
        ));
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Fri,
            minutes(1, 0)
        ));
        assert!(!is_open_at(
            &active_window(),
            &sched,
            Weekday::Fri,
            minutes(10, 0)
        ));
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Fri,
            minutes(22, 0)
        ));
        assert!(!is_open_at(
            &active_window(),
            &sched,
            Weekday::Fri,
            minutes(2, 0)
        ));
    }

    #[test]
    fn test_category_override_window() {
        // Override 11:00-14:00: open at 13:59, closed at 14:00 and 10:59
        let sched = schedule("00:00", "00:00");
        let window = CategoryWindow {
            active: true,
            open_order_time: Some("11:00".to_string()),
            last_order_time: Some("14:00".to_string()),
        };
        assert!(is_open_at(&window, &sched, Weekday::Mon, minutes(13, 59)));
        assert!(!is_open_at(&window, &sched, Weekday::Mon, minutes(14, 0)));
        assert!(!is_open_at(&window, &sched, Weekday::Mon, minutes(10, 59)));
    }

    #[test]
    fn test_override_takes_precedence_over_days_off() {
        let mut sched = schedule("08:00", "17:00");
        sched.days_off.push("monday".to_string());

        let window = CategoryWindow {
            active: true,
            open_order_time: Some("11:00".to_string()),
            last_order_time: Some("14:00".to_string()),
        };
        // Default schedule would refuse Mondays; the override ignores it
        assert!(is_open_at(&window, &sched, Weekday::Mon, minutes(12, 0)));
    }

    #[test]
    fn test_days_off() {
        let mut sched = schedule("00:00", "00:00");
        sched.days_off.push("Sunday".to_string());
        assert!(!is_open_at(
            &active_window(),
            &sched,
            Weekday::Sun,
            minutes(12, 0)
        ));
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Mon,
            minutes(12, 0)
        ));
    }

    #[test]
    fn test_unparseable_schedule_fails_open() {
        let sched = schedule("not a time", "either");
        assert!(is_open_at(
            &active_window(),
            &sched,
            Weekday::Thu,
            minutes(3, 0)
        ));
    }

    #[test]
    fn test_one_sided_override() {
        let sched = schedule("08:00", "17:00");

        // Only a last-order time: open until it, closed after
        let window = CategoryWindow {
            active: true,
            open_order_time: None,
            last_order_time: Some("21:00".to_string()),
        };
        assert!(is_open_at(&window, &sched, Weekday::Wed, minutes(20, 59)));
        assert!(!is_open_at(&window, &sched, Weekday::Wed, minutes(21, 0)));

        // Only an open time: closed before it, open after
        let window = CategoryWindow {
            active: true,
            open_order_time: Some("06:00".to_string()),
            last_order_time: None,
        };
        assert!(!is_open_at(&window, &sched, Weekday::Wed, minutes(5, 59)));
        assert!(is_open_at(&window, &sched, Weekday::Wed, minutes(23, 0)));
    }

    #[test]
    fn test_unparseable_override_fails_open() {
        let sched = schedule("08:00", "17:00");
        let window = CategoryWindow {
            active: true,
            open_order_time: Some("whenever".to_string()),
            last_order_time: Some("late".to_string()),
        };
        assert!(is_open_at(&window, &sched, Weekday::Sat, minutes(4, 0)));
    }
}
