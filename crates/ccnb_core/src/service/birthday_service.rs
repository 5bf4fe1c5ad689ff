//! Upcoming-birthday scheduling.
//!
//! # Responsibility
//! - Compute which contacts should be congratulated within a lookahead
//!   window, and on which day.
//!
//! # Invariants
//! - Output follows store insertion order, not due-date order.
//! - Weekend due dates move to the following Monday.
//! - The window bound is inclusive.
//! - A February 29 birthday projects onto March 1 in years without that day,
//!   even though validation never admits one.

use crate::repo::contact_store::ContactStore;
use crate::validate::format_date;
use chrono::{Datelike, Duration, Local, NaiveDate};

/// Default lookahead used by callers that do not pick a window.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// One contact to congratulate and the day to do it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingBirthday {
    pub name: String,
    pub due_date: NaiveDate,
}

impl UpcomingBirthday {
    /// Due date rendered as `DD.MM.YYYY`.
    pub fn due_date_display(&self) -> String {
        format_date(self.due_date)
    }
}

/// Returns contacts whose next congratulation day is at most `window_days`
/// after `reference`.
pub fn upcoming_birthdays(
    store: &ContactStore,
    reference: NaiveDate,
    window_days: u32,
) -> Vec<UpcomingBirthday> {
    store
        .iter()
        .filter_map(|record| {
            let birthday = record.birthday()?;
            let due_date = congratulation_date(birthday, reference)?;
            let distance = (due_date - reference).num_days();
            (distance <= i64::from(window_days)).then(|| UpcomingBirthday {
                name: record.name().to_string(),
                due_date,
            })
        })
        .collect()
}

/// Same as [`upcoming_birthdays`] with the local current date as reference.
pub fn upcoming_birthdays_from_today(store: &ContactStore, window_days: u32) -> Vec<UpcomingBirthday> {
    upcoming_birthdays(store, Local::now().date_naive(), window_days)
}

/// Next congratulation day on or after `reference` for `birthday`.
pub fn congratulation_date(birthday: NaiveDate, reference: NaiveDate) -> Option<NaiveDate> {
    let mut due = project_onto_year(birthday, reference.year())?;
    if due < reference {
        // One year on from the projected date, not from the birthday.
        due = project_onto_year(due, reference.year() + 1)?;
    }

    let weekday = due.weekday().num_days_from_monday();
    if weekday >= 5 {
        due += Duration::days(i64::from(7 - weekday));
    }
    Some(due)
}

fn project_onto_year(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    birthday
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}
