use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::locale::Locale;
use crate::models::{DayStatus, Session, SessionBadge};

/// Keys are the exact `session_date` strings, in ascending order. Sessions
/// without a canonical date are skipped.
pub fn index_by_date(sessions: &[Session]) -> BTreeMap<&str, (NaiveDate, Vec<&Session>)> {
    let mut map: BTreeMap<&str, (NaiveDate, Vec<&Session>)> = BTreeMap::new();

    for session in sessions {
        let Some(date) = session.date() else {
            warn!(
                session_id = %session.id,
                session_date = %session.session_date,
                "skipping session with unparseable date"
            );
            continue;
        };

        map.entry(session.session_date.as_str())
            .or_insert_with(|| (date, Vec::new()))
            .1
            .push(session);
    }

    map
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketEntry<'a> {
    pub session: &'a Session,
    pub badge: Option<SessionBadge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateBucket<'a> {
    pub key: &'a str,
    pub date: NaiveDate,
    pub status: DayStatus,
    pub header: String,
    pub long_label: String,
    pub short_label: String,
    pub entries: Vec<BucketEntry<'a>>,
}

pub fn group_sessions<'a>(
    sessions: &'a [Session],
    today: NaiveDate,
    locale: Locale,
) -> Vec<DateBucket<'a>> {
    let buckets: Vec<DateBucket<'a>> = index_by_date(sessions)
        .into_iter()
        .map(|(key, (date, day_sessions))| {
            let status = DayStatus::classify(date, today);
            let short_label = locale.short_label(date);
            let header = if status.is_today() {
                locale.today_label().to_string()
            } else {
                short_label.clone()
            };

            DateBucket {
                key,
                date,
                status,
                header,
                long_label: locale.long_label(date),
                short_label,
                entries: day_sessions
                    .into_iter()
                    .map(|session| BucketEntry {
                        session,
                        badge: SessionBadge::resolve(session.attendance_status, status),
                    })
                    .collect(),
            }
        })
        .collect();

    debug!(buckets = buckets.len(), sessions = sessions.len(), "grouped sessions");
    buckets
}

/// The list view's state. An empty schedule is a real answer, not a
/// missing one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum ListView<'a> {
    NotLoaded,
    Empty,
    Days(Vec<DateBucket<'a>>),
}

impl<'a> ListView<'a> {
    pub fn build(sessions: Option<&'a [Session]>, today: NaiveDate, locale: Locale) -> Self {
        let Some(sessions) = sessions else {
            return ListView::NotLoaded;
        };

        let buckets = group_sessions(sessions, today, locale);
        if buckets.is_empty() {
            ListView::Empty
        } else {
            ListView::Days(buckets)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_session, AttendanceStatus};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_and_classifies_example_week() {
        let sessions = vec![
            sample_session("2024-03-01", AttendanceStatus::Unset),
            sample_session("2024-03-01", AttendanceStatus::Present),
            sample_session("2024-03-03", AttendanceStatus::Unset),
        ];

        let buckets = group_sessions(&sessions, day(2024, 3, 2), Locale::English);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec!["2024-03-01", "2024-03-03"]);
        assert_eq!(buckets[0].status, DayStatus::Past);
        assert_eq!(buckets[1].status, DayStatus::Future);
        assert_eq!(buckets[0].entries.len(), 2);
        assert_eq!(buckets[0].long_label, "Friday, March 1, 2024");
        assert_eq!(buckets[1].header, "Mar 3");
    }

    #[test]
    fn keeps_input_order_within_a_day() {
        let mut first = sample_session("2024-05-10", AttendanceStatus::Unset);
        first.title = Some("Warm-up".to_string());
        let mut other_day = sample_session("2024-05-09", AttendanceStatus::Unset);
        other_day.title = Some("Recovery".to_string());
        let mut second = sample_session("2024-05-10", AttendanceStatus::Unset);
        second.title = Some("Scrimmage".to_string());
        let sessions = vec![first, other_day, second];

        let buckets = group_sessions(&sessions, day(2024, 5, 1), Locale::English);
        assert_eq!(buckets[0].key, "2024-05-09");
        let titles: Vec<&str> = buckets[1]
            .entries
            .iter()
            .map(|e| e.session.display_title(""))
            .collect();
        assert_eq!(titles, vec!["Warm-up", "Scrimmage"]);
    }

    #[test]
    fn keys_match_distinct_input_dates() {
        let dates = ["2024-12-31", "2025-01-02", "2024-12-31", "2024-11-30", "2025-01-02"];
        let sessions: Vec<Session> = dates
            .iter()
            .map(|d| sample_session(d, AttendanceStatus::Unset))
            .collect();

        let buckets = group_sessions(&sessions, day(2025, 1, 1), Locale::Thai);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec!["2024-11-30", "2024-12-31", "2025-01-02"]);
        let total: usize = buckets.iter().map(|b| b.entries.len()).sum();
        assert_eq!(total, sessions.len());
    }

    #[test]
    fn today_bucket_marks_unrecorded_sessions() {
        let sessions = vec![
            sample_session("2024-03-02", AttendanceStatus::Unset),
            sample_session("2024-03-02", AttendanceStatus::Late),
        ];

        let buckets = group_sessions(&sessions, day(2024, 3, 2), Locale::Thai);
        assert_eq!(buckets[0].status, DayStatus::Today);
        assert!(!buckets[0].status.is_past());
        assert_eq!(buckets[0].header, "วันนี้");
        assert_eq!(buckets[0].entries[0].badge, Some(SessionBadge::Today));
        assert_eq!(buckets[0].entries[1].badge, Some(SessionBadge::Late));
    }

    #[test]
    fn skips_unparseable_dates() {
        let sessions = vec![
            sample_session("not-a-date", AttendanceStatus::Unset),
            sample_session("2024-03-05", AttendanceStatus::Unset),
        ];

        let buckets = group_sessions(&sessions, day(2024, 3, 1), Locale::English);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, "2024-03-05");
    }

    #[test]
    fn non_canonical_dates_do_not_break_ordering() {
        let sessions = vec![
            sample_session("2024-3-5", AttendanceStatus::Unset),
            sample_session("2024-12-01", AttendanceStatus::Unset),
            sample_session(" 2024-03-05", AttendanceStatus::Unset),
            sample_session("2024-03-04", AttendanceStatus::Unset),
        ];

        let buckets = group_sessions(&sessions, day(2024, 1, 1), Locale::English);
        let keys: Vec<&str> = buckets.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec!["2024-03-04", "2024-12-01"]);
        assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn empty_is_not_the_same_as_not_loaded() {
        let today = day(2024, 3, 1);
        let none: Vec<Session> = Vec::new();

        assert!(matches!(ListView::build(None, today, Locale::Thai), ListView::NotLoaded));
        assert!(matches!(
            ListView::build(Some(none.as_slice()), today, Locale::Thai),
            ListView::Empty
        ));

        let sessions = vec![sample_session("2024-03-01", AttendanceStatus::Unset)];
        assert!(matches!(
            ListView::build(Some(sessions.as_slice()), today, Locale::Thai),
            ListView::Days(ref days) if days.len() == 1
        ));
    }
}
