//! Relative publication labels ("5 minutes ago").

use chrono::{DateTime, Datelike, Utc};
use storyreel_core::config::TimeLabels;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Formats the time between `published` and `now` as a relative label.
///
/// Labels older than a week fall back to the publication date as
/// `d/m/yyyy`. Times in the future are measured by their absolute distance,
/// except that the fixed "one minute", "one hour" and "yesterday" rows are
/// replaced by the date.
#[must_use]
pub fn time_ago(published: DateTime<Utc>, now: DateTime<Utc>, labels: &TimeLabels) -> String {
    let delta = (now - published).num_seconds();
    let future = delta < 0;
    let seconds = delta.abs();

    match seconds {
        s if s < MINUTE => format!("{s} {}", labels.seconds),
        s if s < 2 * MINUTE && !future => format!("1 {}", labels.minute),
        s if s < HOUR && s >= 2 * MINUTE => format!("{} {}", s / MINUTE, labels.minutes),
        s if s < 2 * HOUR && s >= HOUR && !future => format!("1 {}", labels.hour),
        s if s < DAY && s >= 2 * HOUR => format!("{} {}", s / HOUR, labels.hours),
        s if s < 2 * DAY && s >= DAY && !future => labels.yesterday.clone(),
        s if s < WEEK && s >= 2 * DAY => format!("{} {}", s / DAY, labels.days),
        _ => format!(
            "{}/{}/{}",
            published.day(),
            published.month(),
            published.year()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn label(seconds_ago: i64) -> String {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        time_ago(
            now - TimeDelta::seconds(seconds_ago),
            now,
            &TimeLabels::default(),
        )
    }

    #[test]
    fn test_table_rows() {
        assert_eq!(label(5), "5 seconds ago");
        assert_eq!(label(90), "1 minute ago");
        assert_eq!(label(5 * 60), "5 minutes ago");
        assert_eq!(label(90 * 60), "1 hour ago");
        assert_eq!(label(5 * 3600), "5 hours ago");
        assert_eq!(label(30 * 3600), "yesterday");
        assert_eq!(label(3 * 86_400), "3 days ago");
    }

    #[test]
    fn test_older_than_a_week_shows_date() {
        assert_eq!(label(10 * 86_400), "5/1/2026");
    }

    #[test]
    fn test_future_fixed_rows_fall_back_to_date() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let labels = TimeLabels::default();

        // Act
        let in_ninety_seconds = time_ago(now + TimeDelta::seconds(90), now, &labels);
        let in_five_minutes = time_ago(now + TimeDelta::seconds(300), now, &labels);

        // Assert
        assert_eq!(in_ninety_seconds, "15/1/2026");
        assert_eq!(in_five_minutes, "5 minutes ago");
    }

    #[test]
    fn test_custom_labels() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let labels = TimeLabels {
            days: "dias atrás".to_owned(),
            ..TimeLabels::default()
        };

        // Act
        let result = time_ago(now - TimeDelta::days(2), now, &labels);

        // Assert
        assert_eq!(result, "2 dias atrás");
    }
}
