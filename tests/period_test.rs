use chrono::NaiveDate;
use monthlist::engine::{PeriodKey, SearchWindow};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn key(s: &str) -> PeriodKey {
    PeriodKey::parse(s).unwrap()
}

#[test]
fn test_parse_accepts_managed_names_only() {
    assert_eq!(key("2024.01").as_str(), "2024.01");

    for name in [
        "2024.1",
        "2024-01",
        "24.01",
        "2024.01 ",
        " 2024.01",
        "My 2024.01",
        "2024.01 mix",
        "2024.011",
        "Liked Songs",
        "",
    ] {
        assert!(PeriodKey::parse(name).is_none(), "{name:?}");
    }
}

#[test]
fn test_from_added_at() {
    assert_eq!(
        PeriodKey::from_added_at("2024-01-05T12:34:56Z"),
        Some(key("2024.01"))
    );
    assert_eq!(PeriodKey::from_added_at("2023-12-31"), Some(key("2023.12")));
    assert_eq!(PeriodKey::from_added_at(""), None);
    assert_eq!(PeriodKey::from_added_at("yesterday"), None);
    assert_eq!(PeriodKey::from_added_at("2024/01/05"), None);
}

#[test]
fn test_from_date_pads_month() {
    assert_eq!(PeriodKey::from_date(date(2024, 3, 9)), key("2024.03"));
    assert_eq!(PeriodKey::from_date(date(2024, 11, 30)), key("2024.11"));
}

#[test]
fn test_months_before_crosses_year_boundary() {
    let today = date(2024, 2, 29);

    assert_eq!(PeriodKey::months_before(today, 0), key("2024.02"));
    assert_eq!(PeriodKey::months_before(today, 1), key("2024.01"));
    assert_eq!(PeriodKey::months_before(today, 2), key("2023.12"));
    assert_eq!(PeriodKey::months_before(today, 14), key("2022.12"));
}

#[test]
fn test_months_before_ignores_day_of_month() {
    // Subtracting a month from the 31st must not skip or repeat a month.
    assert_eq!(PeriodKey::months_before(date(2024, 3, 31), 1), key("2024.02"));
    assert_eq!(PeriodKey::months_before(date(2024, 5, 31), 1), key("2024.04"));
}

#[test]
fn test_keys_order_chronologically() {
    let mut keys = vec![key("2024.01"), key("2023.12"), key("2024.10"), key("2024.02")];
    keys.sort();

    assert_eq!(
        keys,
        vec![key("2023.12"), key("2024.01"), key("2024.02"), key("2024.10")]
    );
}

#[test]
fn test_search_window_cutoff() {
    let today = date(2024, 3, 15);

    assert_eq!(SearchWindow::from_months(0), SearchWindow::Unbounded);
    assert_eq!(SearchWindow::Unbounded.cutoff(today), None);

    // The current month plus n - 1 before it
    assert_eq!(SearchWindow::from_months(1).cutoff(today), Some(key("2024.03")));
    assert_eq!(SearchWindow::from_months(2).cutoff(today), Some(key("2024.02")));
    assert_eq!(SearchWindow::from_months(6).cutoff(today), Some(key("2023.10")));
}

#[test]
fn test_search_window_cutoff_never_older_than_n_months() {
    let today = date(2025, 1, 1);
    for n in 1..=36 {
        let cutoff = SearchWindow::from_months(n).cutoff(today).unwrap();
        assert!(cutoff >= PeriodKey::months_before(today, n), "n = {n}");
    }
}
