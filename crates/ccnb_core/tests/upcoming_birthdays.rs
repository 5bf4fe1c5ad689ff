use ccnb_core::service::birthday_service::congratulation_date;
use ccnb_core::{upcoming_birthdays, ContactRecord, ContactStore, DEFAULT_WINDOW_DAYS};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn store_with(birthdays: &[(&str, Option<&str>)]) -> ContactStore {
    let mut store = ContactStore::new();
    for (name, birthday) in birthdays {
        let mut record = ContactRecord::new(*name).unwrap();
        if let Some(raw) = birthday {
            record.set_birthday(raw).unwrap();
        }
        store.add(record).unwrap();
    }
    store
}

#[test]
fn sunday_birthday_moves_to_monday_at_window_edge() {
    let store = store_with(&[("Olha", Some("04.08.1995"))]);
    let upcoming = upcoming_birthdays(&store, date(2024, 7, 29), DEFAULT_WINDOW_DAYS);

    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].name, "Olha");
    assert_eq!(upcoming[0].due_date, date(2024, 8, 5));
    assert_eq!(upcoming[0].due_date_display(), "05.08.2024");
}

#[test]
fn birthday_beyond_window_is_excluded() {
    let store = store_with(&[("Ivan", Some("15.01.1990"))]);
    assert!(upcoming_birthdays(&store, date(2025, 1, 1), 7).is_empty());
    assert_eq!(upcoming_birthdays(&store, date(2025, 1, 1), 14).len(), 1);
}

#[test]
fn birthday_on_reference_day_is_included() {
    let store = store_with(&[("Petro", Some("29.07.2000"))]);
    let upcoming = upcoming_birthdays(&store, date(2024, 7, 29), 0);
    assert_eq!(upcoming[0].due_date, date(2024, 7, 29));
}

#[test]
fn passed_birthday_counts_from_next_year() {
    let store = store_with(&[("Marta", Some("20.07.1990"))]);
    assert!(upcoming_birthdays(&store, date(2024, 7, 29), 7).is_empty());

    // 20.07.2025 is a Sunday.
    let upcoming = upcoming_birthdays(&store, date(2024, 7, 29), 365);
    assert_eq!(upcoming[0].due_date, date(2025, 7, 21));
}

#[test]
fn weekend_shift_counts_against_the_window() {
    // 02.08.2024 is a Friday, 03.08.2024 a Saturday.
    let store = store_with(&[("Taras", Some("03.08.1990"))]);
    assert!(upcoming_birthdays(&store, date(2024, 8, 2), 2).is_empty());
    assert_eq!(
        upcoming_birthdays(&store, date(2024, 8, 2), 3)[0].due_date,
        date(2024, 8, 5)
    );
}

#[test]
fn results_follow_insertion_order_and_skip_unknown_birthdays() {
    let store = store_with(&[
        ("Later", Some("05.08.1980")),
        ("Nobody", None),
        ("Sooner", Some("30.07.1985")),
    ]);
    let names: Vec<String> = upcoming_birthdays(&store, date(2024, 7, 29), 7)
        .into_iter()
        .map(|entry| entry.name)
        .collect();
    assert_eq!(names, ["Later", "Sooner"]);
}

#[test]
fn weekday_birthday_is_not_shifted() {
    // 30.07.2024 is a Tuesday.
    assert_eq!(
        congratulation_date(date(1985, 7, 30), date(2024, 7, 29)),
        Some(date(2024, 7, 30))
    );
}

#[test]
fn stored_leap_day_rolls_from_march_first_into_leap_year() {
    let mut record = ContactRecord::new("Leap").unwrap();
    record.set_birthday_date(date(2000, 2, 29));
    let mut store = ContactStore::new();
    store.add(record).unwrap();

    // 01.03.2027 has passed; next due day is 01.03.2028, 357 days away.
    assert!(upcoming_birthdays(&store, date(2027, 3, 10), 356).is_empty());
    let upcoming = upcoming_birthdays(&store, date(2027, 3, 10), 357);
    assert_eq!(upcoming[0].due_date, date(2028, 3, 1));
}
