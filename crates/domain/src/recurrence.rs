use crate::date::month_length;
use chrono::{offset::LocalResult, DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Wall clock time at which a `Reminder` fires. Seconds are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, InvalidRecurrenceError> {
        if hour > 23 || minute > 59 {
            return Err(InvalidRecurrenceError::InvalidTimeOfDay(hour, minute));
        }
        Ok(Self { hour, minute })
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRecurrenceError {
    #[error("Invalid time of day: {0}:{1}")]
    InvalidTimeOfDay(u32, u32),
    #[error("Invalid frequency identifier: {0}")]
    InvalidFrequency(String),
    #[error("Frequency {0} requires a day of week between 0 (Sunday) and 6 (Saturday)")]
    InvalidDayOfWeek(Frequency),
    #[error("Frequency {0} requires a day of month between 1 and 31")]
    InvalidDayOfMonth(Frequency),
    #[error("Frequency yearly requires a month between 1 and 12")]
    InvalidMonth,
}

impl FromStr for Frequency {
    type Err = InvalidRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(InvalidRecurrenceError::InvalidFrequency(s.to_string())),
        }
    }
}

/// How a `Reminder` repeats. The optional fields are only meaningful for
/// the matching frequency: `day_of_week` (0 = Sunday) for weekly,
/// `day_of_month` for monthly and yearly, `month` for yearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    pub day_of_week: Option<u32>,
    pub day_of_month: Option<u32>,
    pub month: Option<u32>,
}

impl Recurrence {
    pub fn once() -> Self {
        Self {
            frequency: Frequency::Once,
            day_of_week: None,
            day_of_month: None,
            month: None,
        }
    }

    pub fn daily() -> Self {
        Self {
            frequency: Frequency::Daily,
            ..Self::once()
        }
    }

    pub fn weekly(day_of_week: u32) -> Self {
        Self {
            frequency: Frequency::Weekly,
            day_of_week: Some(day_of_week),
            ..Self::once()
        }
    }

    pub fn monthly(day_of_month: u32) -> Self {
        Self {
            frequency: Frequency::Monthly,
            day_of_month: Some(day_of_month),
            ..Self::once()
        }
    }

    pub fn yearly(month: u32, day_of_month: u32) -> Self {
        Self {
            frequency: Frequency::Yearly,
            day_of_month: Some(day_of_month),
            month: Some(month),
            ..Self::once()
        }
    }

    /// Checks that the recurrence parameters required by the frequency are
    /// present and in range. Callers must validate before persisting, the
    /// calculator itself assumes well-formed input.
    pub fn validate(&self) -> Result<(), InvalidRecurrenceError> {
        match self.frequency {
            Frequency::Once | Frequency::Daily => Ok(()),
            Frequency::Weekly => match self.day_of_week {
                Some(wday) if wday <= 6 => Ok(()),
                _ => Err(InvalidRecurrenceError::InvalidDayOfWeek(self.frequency)),
            },
            Frequency::Monthly => match self.day_of_month {
                Some(day) if (1..=31).contains(&day) => Ok(()),
                _ => Err(InvalidRecurrenceError::InvalidDayOfMonth(self.frequency)),
            },
            Frequency::Yearly => {
                match self.day_of_month {
                    Some(day) if (1..=31).contains(&day) => (),
                    _ => return Err(InvalidRecurrenceError::InvalidDayOfMonth(self.frequency)),
                }
                match self.month {
                    Some(month) if (1..=12).contains(&month) => Ok(()),
                    _ => Err(InvalidRecurrenceError::InvalidMonth),
                }
            }
        }
    }

    /// Computes the next instant at which a reminder with this recurrence
    /// fires, strictly after `now`. A candidate equal to `now` counts as
    /// already passed and rolls forward, so a reminder can never fire twice
    /// in the same evaluation tick.
    ///
    /// `anchor_date` pins a one-off reminder to a specific calendar date and
    /// is trusted as-is, it is never rolled forward.
    ///
    /// Pure function: `now` is injected and the result only depends on the
    /// arguments.
    pub fn next_trigger(
        &self,
        time_of_day: &TimeOfDay,
        now: &DateTime<Tz>,
        anchor_date: Option<NaiveDate>,
    ) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();
        match self.frequency {
            Frequency::Once => match anchor_date {
                Some(date) => at_time(&tz, date, time_of_day),
                None => {
                    let candidate = at_time(&tz, today, time_of_day);
                    if candidate <= *now {
                        at_time(&tz, today + Duration::days(1), time_of_day)
                    } else {
                        candidate
                    }
                }
            },
            Frequency::Daily => {
                let candidate = at_time(&tz, today, time_of_day);
                if candidate <= *now {
                    at_time(&tz, today + Duration::days(1), time_of_day)
                } else {
                    candidate
                }
            }
            Frequency::Weekly => {
                let target = self.day_of_week.unwrap_or(0);
                let offset = (target + 7 - now.weekday().num_days_from_sunday()) % 7;
                let candidate = at_time(&tz, today + Duration::days(offset as i64), time_of_day);
                if offset == 0 && candidate <= *now {
                    at_time(&tz, today + Duration::days(7), time_of_day)
                } else {
                    candidate
                }
            }
            Frequency::Monthly => {
                let day = self.day_of_month.unwrap_or(1);
                let candidate =
                    at_time(&tz, clamped_date(today.year(), today.month(), day), time_of_day);
                if candidate <= *now {
                    let (year, month) = if today.month() == 12 {
                        (today.year() + 1, 1)
                    } else {
                        (today.year(), today.month() + 1)
                    };
                    at_time(&tz, clamped_date(year, month, day), time_of_day)
                } else {
                    candidate
                }
            }
            Frequency::Yearly => {
                let day = self.day_of_month.unwrap_or(1);
                let month = self.month.unwrap_or(1);
                let candidate = at_time(&tz, clamped_date(today.year(), month, day), time_of_day);
                if candidate <= *now {
                    at_time(&tz, clamped_date(today.year() + 1, month, day), time_of_day)
                } else {
                    candidate
                }
            }
        }
    }

    /// Same as [`next_trigger`](Self::next_trigger) but over epoch millisecond
    /// timestamps, which is how trigger instants are persisted.
    pub fn next_trigger_millis(
        &self,
        time_of_day: &TimeOfDay,
        now_millis: i64,
        tz: &Tz,
        anchor_date: Option<NaiveDate>,
    ) -> i64 {
        let now = millis_to_datetime(now_millis, tz);
        self.next_trigger(time_of_day, &now, anchor_date)
            .timestamp_millis()
    }
}

pub(crate) fn millis_to_datetime(millis: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Clamps `day` to the true last day of the month when the month is shorter.
/// A day-31 monthly reminder therefore lands on day 30 in 30-day months and
/// a Feb 29 yearly reminder lands on Feb 28 outside leap years. Known drift
/// quirk, intentionally kept over skipping the month.
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.max(1).min(month_length(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day to be valid")
}

fn at_time(tz: &Tz, date: NaiveDate, time_of_day: &TimeOfDay) -> DateTime<Tz> {
    let naive = date
        .and_hms_opt(time_of_day.hour, time_of_day.minute, 0)
        .expect("time of day to be valid");
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(datetime) => datetime,
        // Backwards DST transition, the wall clock time occurs twice.
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Forwards DST transition, the wall clock time does not exist.
        // Resolve to the same wall clock time one hour past the gap.
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(datetime) => datetime,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => tz.from_utc_datetime(&naive),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::{Europe::Oslo, UTC};

    fn time(hour: u32, minute: u32) -> TimeOfDay {
        TimeOfDay::new(hour, minute).unwrap()
    }

    fn oslo(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Oslo.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn it_validates_recurrence_parameters() {
        assert!(Recurrence::once().validate().is_ok());
        assert!(Recurrence::daily().validate().is_ok());
        assert!(Recurrence::weekly(0).validate().is_ok());
        assert!(Recurrence::weekly(6).validate().is_ok());
        assert!(Recurrence::monthly(31).validate().is_ok());
        assert!(Recurrence::yearly(2, 29).validate().is_ok());

        assert!(Recurrence::weekly(7).validate().is_err());
        assert!(Recurrence::monthly(0).validate().is_err());
        assert!(Recurrence::monthly(32).validate().is_err());
        assert!(Recurrence::yearly(13, 1).validate().is_err());
        assert!(Recurrence::yearly(0, 1).validate().is_err());

        let mut missing_wday = Recurrence::weekly(3);
        missing_wday.day_of_week = None;
        assert_eq!(
            missing_wday.validate(),
            Err(InvalidRecurrenceError::InvalidDayOfWeek(Frequency::Weekly))
        );
    }

    #[test]
    fn it_rejects_invalid_time_of_day() {
        assert!(TimeOfDay::new(24, 0).is_err());
        assert!(TimeOfDay::new(0, 60).is_err());
        assert!(TimeOfDay::new(23, 59).is_ok());
    }

    #[test]
    fn once_fires_today_when_time_not_passed() {
        let now = oslo(2021, 6, 9, 8, 0);
        let next = Recurrence::once().next_trigger(&time(14, 30), &now, None);
        assert_eq!(next, oslo(2021, 6, 9, 14, 30));
    }

    #[test]
    fn once_rolls_to_tomorrow_when_time_passed() {
        let now = oslo(2021, 6, 9, 14, 0);
        let next = Recurrence::once().next_trigger(&time(8, 0), &now, None);
        assert_eq!(next, oslo(2021, 6, 10, 8, 0));
    }

    #[test]
    fn once_trusts_explicit_anchor_date() {
        let now = oslo(2021, 6, 9, 14, 0);
        let anchor = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let next = Recurrence::once().next_trigger(&time(8, 0), &now, Some(anchor));
        assert_eq!(next, oslo(2021, 6, 15, 8, 0));

        // A passed anchor is a caller error and is not silently corrected
        let passed = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let next = Recurrence::once().next_trigger(&time(8, 0), &now, Some(passed));
        assert_eq!(next, oslo(2021, 6, 1, 8, 0));
    }

    #[test]
    fn daily_rolls_forward_on_exact_match() {
        let now = oslo(2021, 6, 9, 9, 0);
        let next = Recurrence::daily().next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2021, 6, 10, 9, 0));
    }

    #[test]
    fn weekly_fires_later_today_on_target_weekday() {
        // 2021-06-09 is a Wednesday (day_of_week = 3)
        let now = oslo(2021, 6, 9, 8, 0);
        let next = Recurrence::weekly(3).next_trigger(&time(10, 0), &now, None);
        assert_eq!(next, oslo(2021, 6, 9, 10, 0));
    }

    #[test]
    fn weekly_wraps_a_full_week_when_time_passed() {
        let now = oslo(2021, 6, 9, 12, 0);
        let next = Recurrence::weekly(3).next_trigger(&time(10, 0), &now, None);
        assert_eq!(next, oslo(2021, 6, 16, 10, 0));
    }

    #[test]
    fn weekly_monday_from_wednesday() {
        // Wednesday 10:00 -> following Monday 09:00
        let now = oslo(2021, 6, 9, 10, 0);
        let next = Recurrence::weekly(1).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2021, 6, 14, 9, 0));
        assert_eq!(next.weekday().num_days_from_sunday(), 1);
    }

    #[test]
    fn monthly_clamps_to_last_day_of_short_month() {
        let now = oslo(2021, 4, 10, 12, 0);
        let next = Recurrence::monthly(31).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2021, 4, 30, 9, 0));
    }

    #[test]
    fn monthly_advances_and_reclamps_when_passed() {
        // Jan 31 already passed -> Feb 28 (2021 is not a leap year)
        let now = oslo(2021, 1, 31, 10, 0);
        let next = Recurrence::monthly(31).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2021, 2, 28, 9, 0));
    }

    #[test]
    fn monthly_wraps_year_boundary() {
        let now = oslo(2021, 12, 20, 10, 0);
        let next = Recurrence::monthly(15).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2022, 1, 15, 9, 0));
    }

    #[test]
    fn yearly_clamps_feb_29_outside_leap_years() {
        let now = oslo(2021, 1, 10, 10, 0);
        let next = Recurrence::yearly(2, 29).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2021, 2, 28, 9, 0));
    }

    #[test]
    fn yearly_advances_to_next_year_when_passed() {
        let now = oslo(2021, 3, 10, 10, 0);
        let next = Recurrence::yearly(2, 29).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2022, 2, 28, 9, 0));

        // From 2023 the next occurrence is in leap year 2024 and is not clamped
        let now = oslo(2023, 3, 10, 10, 0);
        let next = Recurrence::yearly(2, 29).next_trigger(&time(9, 0), &now, None);
        assert_eq!(next, oslo(2024, 2, 29, 9, 0));
    }

    #[test]
    fn daily_crosses_forward_dst_transition() {
        // Oslo springs forward on 2021-03-28, 02:00 -> 03:00
        let now = oslo(2021, 3, 27, 3, 0);
        let next = Recurrence::daily().next_trigger(&time(2, 30), &now, None);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2021, 3, 28).unwrap());
        // 02:30 does not exist on that date, resolved past the gap
        assert_eq!(next.hour(), 3);
        assert_eq!(next.minute(), 30);
    }

    #[test]
    fn next_trigger_is_strictly_in_the_future() {
        let recurrences = vec![
            Recurrence::once(),
            Recurrence::daily(),
            Recurrence::weekly(0),
            Recurrence::weekly(3),
            Recurrence::weekly(6),
            Recurrence::monthly(1),
            Recurrence::monthly(31),
            Recurrence::yearly(2, 29),
            Recurrence::yearly(12, 31),
        ];
        let nows = vec![
            oslo(2021, 1, 1, 0, 0),
            oslo(2021, 6, 9, 9, 0),
            oslo(2021, 12, 31, 23, 59),
            oslo(2024, 2, 29, 12, 0),
        ];
        for recurrence in &recurrences {
            for now in &nows {
                let next = recurrence.next_trigger(&time(9, 0), now, None);
                assert!(next > *now, "{:?} at {}", recurrence, now);
                assert_eq!(next.second(), 0);
            }
        }
    }

    #[test]
    fn next_trigger_is_idempotent() {
        let now = oslo(2021, 6, 9, 9, 0);
        let recurrence = Recurrence::weekly(5);
        let first = recurrence.next_trigger(&time(10, 0), &now, None);
        let second = recurrence.next_trigger(&time(10, 0), &now, None);
        assert_eq!(first, second);
    }

    #[test]
    fn millis_roundtrip_matches_datetime_api() {
        let now = UTC.with_ymd_and_hms(2021, 6, 9, 9, 0, 0).unwrap();
        let recurrence = Recurrence::daily();
        let expected = recurrence
            .next_trigger(&time(10, 0), &now, None)
            .timestamp_millis();
        let got = recurrence.next_trigger_millis(
            &time(10, 0),
            now.timestamp_millis(),
            &UTC,
            None,
        );
        assert_eq!(got, expected);
    }
}
