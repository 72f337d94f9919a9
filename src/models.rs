use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// A scheduled training session as handed over by the data-access layer.
///
/// `session_date` is kept exactly as it arrived so grouping never shifts a
/// session onto a neighbouring day.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub title: Option<String>,
    pub session_name: Option<String>,
    pub session_date: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub description: Option<String>,
    pub coach_name: Option<String>,
    pub attendance_status: AttendanceStatus,
}

impl Session {
    pub fn date(&self) -> Option<NaiveDate> {
        parse_date_key(&self.session_date)
    }

    /// Title, then session name, then `fallback`. Blank values are skipped.
    pub fn display_title<'a>(&'a self, fallback: &'a str) -> &'a str {
        [self.title.as_deref(), self.session_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
            .unwrap_or(fallback)
    }

    pub fn time_range(&self) -> (String, String) {
        (
            self.start_time.format("%H:%M").to_string(),
            self.end_time.format("%H:%M").to_string(),
        )
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn coach_name(&self) -> Option<&str> {
        non_blank(self.coach_name.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts only the canonical `YYYY-MM-DD` form, so a key's string order is
/// its date order.
pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .filter(|date| date_key(*date) == value)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    #[default]
    Unset,
}

impl AttendanceStatus {
    /// Maps a raw stored value. Anything unrecognised counts as unset.
    pub fn from_raw(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("present") => AttendanceStatus::Present,
            Some("absent") => AttendanceStatus::Absent,
            Some("late") => AttendanceStatus::Late,
            _ => AttendanceStatus::Unset,
        }
    }
}

/// Where a day sits relative to the reference date. Time of day is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Past,
    Today,
    Future,
}

impl DayStatus {
    pub fn classify(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => DayStatus::Past,
            std::cmp::Ordering::Equal => DayStatus::Today,
            std::cmp::Ordering::Greater => DayStatus::Future,
        }
    }

    pub fn is_today(&self) -> bool {
        matches!(self, DayStatus::Today)
    }

    pub fn is_past(&self) -> bool {
        matches!(self, DayStatus::Past)
    }
}

/// Badge shown next to a session in the list view.
///
/// Variants are declared in precedence order: a recorded attendance outcome
/// always wins over the "today" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBadge {
    Present,
    Absent,
    Late,
    Today,
}

impl SessionBadge {
    pub fn resolve(status: AttendanceStatus, day: DayStatus) -> Option<Self> {
        let attendance = match status {
            AttendanceStatus::Present => Some(SessionBadge::Present),
            AttendanceStatus::Absent => Some(SessionBadge::Absent),
            AttendanceStatus::Late => Some(SessionBadge::Late),
            AttendanceStatus::Unset => None,
        };
        let today = day.is_today().then_some(SessionBadge::Today);

        [attendance, today].into_iter().flatten().min()
    }
}

/// Colour class of a session chip inside a calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipTone {
    Attended,
    Missed,
    Today,
    Upcoming,
}

impl ChipTone {
    pub fn for_session(status: AttendanceStatus, day: DayStatus) -> Self {
        match status {
            AttendanceStatus::Present => ChipTone::Attended,
            AttendanceStatus::Absent => ChipTone::Missed,
            _ if day.is_today() => ChipTone::Today,
            _ => ChipTone::Upcoming,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_session(date: &str, status: AttendanceStatus) -> Session {
    Session {
        id: Uuid::new_v4(),
        title: Some("Sprint drills".to_string()),
        session_name: None,
        session_date: date.to_string(),
        start_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        location: Some("Main track".to_string()),
        description: None,
        coach_name: Some("Niran".to_string()),
        attendance_status: status,
    }
}
