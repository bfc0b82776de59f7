//! UTC calendar fields derived from epoch-second timestamps.

use chrono::{DateTime, Datelike, NaiveDate};

/// UTC date of an epoch-second timestamp. Out-of-range values map to 1970-01-01.
pub fn date_of(timestamp: i64) -> NaiveDate {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}

pub fn year_of(timestamp: i64) -> i32 {
    date_of(timestamp).year()
}

/// (year, month) pair, so month boundaries compare correctly across years.
pub fn month_key(timestamp: i64) -> (i32, u32) {
    let date = date_of(timestamp);
    (date.year(), date.month())
}

pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(start), Some(end)) => (end - start).num_days() as u32,
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2021-03-15T12:00:00Z
    const MID_MARCH_2021: i64 = 1_615_809_600;

    #[test]
    fn date_fields() {
        let date = date_of(MID_MARCH_2021);
        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 3, 15).unwrap());
        assert_eq!(year_of(MID_MARCH_2021), 2021);
        assert_eq!(month_key(MID_MARCH_2021), (2021, 3));
    }

    #[test]
    fn epoch_is_1970() {
        assert_eq!(year_of(0), 1970);
        assert_eq!(month_key(0), (1970, 1));
    }

    #[test]
    fn leap_years() {
        assert_eq!(days_in_year(2020), 366);
        assert_eq!(days_in_year(2021), 365);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2021, 1), 31);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2021, 4), 30);
        assert_eq!(days_in_month(2021, 12), 31);
    }
}
