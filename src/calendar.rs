use std::fmt;

use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::{date_key, ChipTone, DayStatus, Session};
use crate::schedule;

pub const PREVIEW_LIMIT: usize = 2;

/// A calendar month, held as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("invalid month {year}-{month:02}"))?;
        Ok(Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
            .with_context(|| format!("expected a month as YYYY-MM, got {value:?}"))?;
        Ok(Self { first })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        self.first
            .iter_days()
            .take_while(|d| d.month() == self.first.month())
            .count() as u32
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn leading_padding(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// `None` outside chrono's supported range.
    pub fn offset(&self, months: i32) -> Option<Self> {
        let step = Months::new(months.unsigned_abs());
        let first = if months >= 0 {
            self.first.checked_add_months(step)
        } else {
            self.first.checked_sub_months(step)
        }?;
        Some(Self { first })
    }

    pub fn next(&self) -> Self {
        self.offset(1).unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.offset(-1).unwrap_or(*self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub day: u32,
    pub date: NaiveDate,
    pub key: String,
    pub column: u32,
    pub status: DayStatus,
    pub sessions: Vec<&'a Session>,
}

impl<'a> DayCell<'a> {
    pub fn preview(&self) -> &[&'a Session] {
        &self.sessions[..self.sessions.len().min(PREVIEW_LIMIT)]
    }

    pub fn overflow(&self) -> usize {
        self.sessions.len().saturating_sub(PREVIEW_LIMIT)
    }

    pub fn is_sunday(&self) -> bool {
        self.column == 0
    }

    pub fn chips(&self) -> impl Iterator<Item = (&'a Session, ChipTone)> + '_ {
        let status = self.status;
        self.preview()
            .iter()
            .map(move |session| (*session, ChipTone::for_session(session.attendance_status, status)))
    }
}

#[derive(Serialize)]
struct Chip<'s> {
    session: &'s Session,
    tone: ChipTone,
}

impl Serialize for DayCell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let preview: Vec<Chip<'_>> = self
            .chips()
            .map(|(session, tone)| Chip { session, tone })
            .collect();

        let mut state = serializer.serialize_struct("DayCell", 9)?;
        state.serialize_field("day", &self.day)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("column", &self.column)?;
        state.serialize_field("is_sunday", &self.is_sunday())?;
        state.serialize_field("status", &self.status)?;
        state.serialize_field("sessions", &self.sessions)?;
        state.serialize_field("preview", &preview)?;
        state.serialize_field("overflow", &self.overflow())?;
        state.end()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell<'a> {
    Padding,
    Day(DayCell<'a>),
}

impl<'a> GridCell<'a> {
    pub fn as_day(&self) -> Option<&DayCell<'a>> {
        match self {
            GridCell::Padding => None,
            GridCell::Day(cell) => Some(cell),
        }
    }
}

/// One month laid out Sunday-first. Only the leading row is padded; the last
/// week may be short.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid<'a> {
    pub month: YearMonth,
    pub today: NaiveDate,
    pub leading: usize,
    pub cells: Vec<GridCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    pub fn weeks(&self) -> std::slice::Chunks<'_, GridCell<'a>> {
        self.cells.chunks(7)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell<'a>> {
        self.cells.iter().filter_map(GridCell::as_day)
    }

    pub fn day(&self, day: u32) -> Option<&DayCell<'a>> {
        let index = self.leading + day.checked_sub(1)? as usize;
        self.cells.get(index).and_then(GridCell::as_day)
    }

    pub fn session_count(&self) -> usize {
        self.days().map(|cell| cell.sessions.len()).sum()
    }
}

pub fn build_month_grid<'a>(
    sessions: &'a [Session],
    month: YearMonth,
    today: NaiveDate,
) -> MonthGrid<'a> {
    let mut by_date = schedule::index_by_date(sessions);
    let leading = month.leading_padding();
    let days_in_month = month.days_in_month();

    let mut cells = Vec::with_capacity((leading + days_in_month) as usize);
    cells.extend((0..leading).map(|_| GridCell::Padding));

    for (offset, date) in month.first_day().iter_days().take(days_in_month as usize).enumerate() {
        let key = date_key(date);
        let day_sessions = by_date
            .remove(key.as_str())
            .map(|(_, sessions)| sessions)
            .unwrap_or_default();

        cells.push(GridCell::Day(DayCell {
            day: date.day(),
            date,
            key,
            column: (leading + offset as u32) % 7,
            status: DayStatus::classify(date, today),
            sessions: day_sessions,
        }));
    }

    MonthGrid {
        month,
        today,
        leading: leading as usize,
        cells,
    }
}
