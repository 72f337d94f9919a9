use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{parse_date_key, AttendanceStatus, Session};

/// Whose schedule to load.
#[derive(Debug, Clone)]
pub enum SessionScope {
    Club(String),
    Athlete(String),
}

/// Inclusive date bounds. A missing side is left unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }

    /// Only the given bounds become placeholders, numbered from `next_param`.
    fn sql_clause(&self, next_param: usize) -> String {
        let mut clause = String::new();
        let mut param = next_param;
        if self.from.is_some() {
            clause.push_str(&format!(" AND ts.session_date >= ${param}"));
            param += 1;
        }
        if self.to.is_some() {
            clause.push_str(&format!(" AND ts.session_date <= ${param}"));
        }
        clause
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

struct NewSession<'a> {
    club_id: Uuid,
    coach_id: Option<Uuid>,
    title: Option<&'a str>,
    session_name: Option<&'a str>,
    session_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    location: Option<&'a str>,
    description: Option<&'a str>,
    source_key: &'a str,
}

async fn upsert_club(pool: &PgPool, name: &str) -> anyhow::Result<Uuid> {
    let id = sqlx::query(
        r#"
        INSERT INTO club_schedule.clubs (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?
    .try_get("id")?;
    Ok(id)
}

async fn upsert_coach(
    pool: &PgPool,
    club_id: Uuid,
    name: &str,
    email: &str,
) -> anyhow::Result<Uuid> {
    let id = sqlx::query(
        r#"
        INSERT INTO club_schedule.coaches (id, club_id, full_name, email)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name, club_id = EXCLUDED.club_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(club_id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?
    .try_get("id")?;
    Ok(id)
}

async fn upsert_athlete(
    pool: &PgPool,
    club_id: Uuid,
    name: &str,
    email: &str,
) -> anyhow::Result<Uuid> {
    let id = sqlx::query(
        r#"
        INSERT INTO club_schedule.athletes (id, club_id, full_name, email)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name, club_id = EXCLUDED.club_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(club_id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?
    .try_get("id")?;
    Ok(id)
}

/// Returns the session id and whether the row was newly inserted.
async fn upsert_session(pool: &PgPool, session: &NewSession<'_>) -> anyhow::Result<(Uuid, bool)> {
    let row = sqlx::query(
        r#"
        INSERT INTO club_schedule.training_sessions
        (id, club_id, coach_id, title, session_name, session_date, start_time, end_time,
         location, description, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (source_key) DO UPDATE
        SET club_id = EXCLUDED.club_id,
            coach_id = EXCLUDED.coach_id,
            title = EXCLUDED.title,
            session_name = EXCLUDED.session_name,
            session_date = EXCLUDED.session_date,
            start_time = EXCLUDED.start_time,
            end_time = EXCLUDED.end_time,
            location = EXCLUDED.location,
            description = EXCLUDED.description
        RETURNING id, (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session.club_id)
    .bind(session.coach_id)
    .bind(session.title)
    .bind(session.session_name)
    .bind(session.session_date)
    .bind(session.start_time)
    .bind(session.end_time)
    .bind(session.location)
    .bind(session.description)
    .bind(session.source_key)
    .fetch_one(pool)
    .await?;

    Ok((row.try_get("id")?, row.try_get("inserted")?))
}

async fn record_attendance(
    pool: &PgPool,
    session_id: Uuid,
    athlete_id: Uuid,
    status: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO club_schedule.attendance (session_id, athlete_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (session_id, athlete_id) DO UPDATE
        SET status = EXCLUDED.status, recorded_at = now()
        "#,
    )
    .bind(session_id)
    .bind(athlete_id)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(())
}

/// Loads a demo club whose sessions straddle `today`.
pub async fn seed(pool: &PgPool, today: NaiveDate) -> anyhow::Result<()> {
    let club_id = upsert_club(pool, "Chao Phraya Swim Club").await?;
    let coach_id = upsert_coach(
        pool,
        club_id,
        "Niran Suksawat",
        "demo.coach@chaophrayaswim.club",
    )
    .await?;
    let athlete_id = upsert_athlete(
        pool,
        club_id,
        "Ploy Chaiyasit",
        "demo.athlete@chaophrayaswim.club",
    )
    .await?;

    let sessions = vec![
        ("seed-001", -7, "06:00", "07:30", Some("Endurance set"), Some("present")),
        ("seed-002", -5, "16:00", "18:00", Some("Starts and turns"), Some("late")),
        ("seed-003", -2, "16:00", "18:00", None, Some("absent")),
        ("seed-004", 0, "06:00", "07:30", Some("Technique clinic"), None),
        ("seed-005", 0, "16:00", "18:00", Some("Relay practice"), None),
        ("seed-006", 0, "19:00", "20:00", Some("Dryland strength"), None),
        ("seed-007", 2, "16:00", "18:00", Some("Time trial"), None),
        ("seed-008", 5, "08:00", "11:00", Some("Club meet"), None),
    ];

    for (source_key, offset_days, start, end, title, attendance) in sessions {
        let session = NewSession {
            club_id,
            coach_id: Some(coach_id),
            title,
            session_name: Some("Squad training"),
            session_date: today + Duration::days(offset_days),
            start_time: parse_time(start).context("invalid seed time")?,
            end_time: parse_time(end).context("invalid seed time")?,
            location: Some("Pool A"),
            description: None,
            source_key,
        };
        let (session_id, _) = upsert_session(pool, &session).await?;

        if let Some(status) = attendance {
            record_attendance(pool, session_id, athlete_id, status).await?;
        }
    }

    info!(%today, "seeded demo club");
    Ok(())
}

pub async fn fetch_sessions(
    pool: &PgPool,
    scope: &SessionScope,
    range: DateRange,
) -> anyhow::Result<Vec<Session>> {
    let mut query = String::from(
        "SELECT ts.id, ts.title, ts.session_name, \
         to_char(ts.session_date, 'YYYY-MM-DD') AS session_date, \
         ts.start_time, ts.end_time, ts.location, ts.description, \
         co.full_name AS coach_name, ",
    );

    match scope {
        SessionScope::Club(_) => query.push_str(
            "NULL::text AS attendance_status \
             FROM club_schedule.training_sessions ts \
             JOIN club_schedule.clubs cl ON cl.id = ts.club_id \
             LEFT JOIN club_schedule.coaches co ON co.id = ts.coach_id \
             WHERE cl.name = $1",
        ),
        SessionScope::Athlete(_) => query.push_str(
            "att.status AS attendance_status \
             FROM club_schedule.training_sessions ts \
             JOIN club_schedule.athletes a ON a.club_id = ts.club_id \
             LEFT JOIN club_schedule.coaches co ON co.id = ts.coach_id \
             LEFT JOIN club_schedule.attendance att \
               ON att.session_id = ts.id AND att.athlete_id = a.id \
             WHERE a.email = $1",
        ),
    }

    query.push_str(&range.sql_clause(2));
    query.push_str(" ORDER BY ts.session_date, ts.start_time");

    let mut rows = match scope {
        SessionScope::Club(name) => sqlx::query(&query).bind(name),
        SessionScope::Athlete(email) => sqlx::query(&query).bind(email),
    };

    if let Some(from) = range.from {
        rows = rows.bind(from);
    }
    if let Some(to) = range.to {
        rows = rows.bind(to);
    }

    let records = rows.fetch_all(pool).await?;
    let mut sessions = Vec::with_capacity(records.len());

    for row in records {
        let attendance: Option<String> = row.try_get("attendance_status")?;
        sessions.push(Session {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            session_name: row.try_get("session_name")?,
            session_date: row.try_get("session_date")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            location: row.try_get("location")?,
            description: row.try_get("description")?,
            coach_name: row.try_get("coach_name")?,
            attendance_status: AttendanceStatus::from_raw(attendance.as_deref()),
        });
    }

    debug!(?scope, count = sessions.len(), "fetched sessions");
    Ok(sessions)
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    club: Option<String>,
    #[serde(default)]
    coach_name: Option<String>,
    #[serde(default)]
    coach_email: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    session_name: Option<String>,
    session_date: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    athlete_name: Option<String>,
    #[serde(default)]
    athlete_email: Option<String>,
    #[serde(default)]
    attendance_status: Option<String>,
    #[serde(default)]
    source_key: Option<String>,
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn times_of(row: &CsvRow, line: u64) -> Option<(NaiveTime, NaiveTime)> {
    match (parse_time(&row.start_time), parse_time(&row.end_time)) {
        (Some(start), Some(end)) => Some((start, end)),
        _ => {
            warn!(
                line,
                start_time = %row.start_time,
                end_time = %row.end_time,
                "skipping row with unparseable time"
            );
            None
        }
    }
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// Reads a sessions CSV without touching the database.
///
/// Dates are kept verbatim; the views decide what to do with bad ones.
pub fn load_sessions_csv(csv_path: &Path) -> anyhow::Result<Vec<Session>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let headers = reader.headers()?.clone();
    let mut sessions = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = line_of(&record);
        let row: CsvRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("malformed row at line {line}"))?;

        let Some((start_time, end_time)) = times_of(&row, line) else {
            continue;
        };

        sessions.push(Session {
            id: row.id.unwrap_or_else(Uuid::new_v4),
            title: row.title,
            session_name: row.session_name,
            session_date: row.session_date,
            start_time,
            end_time,
            location: row.location,
            description: row.description,
            coach_name: row.coach_name,
            attendance_status: AttendanceStatus::from_raw(row.attendance_status.as_deref()),
        });
    }

    Ok(sessions)
}

pub async fn import_csv(pool: &PgPool, csv_path: &Path) -> anyhow::Result<ImportSummary> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let headers = reader.headers()?.clone();
    let mut summary = ImportSummary::default();

    for result in reader.records() {
        let record = result?;
        let line = line_of(&record);
        let row: CsvRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("malformed row at line {line}"))?;

        let Some(club) = row.club.as_deref().filter(|c| !c.trim().is_empty()) else {
            warn!(line, "skipping row without a club");
            summary.skipped += 1;
            continue;
        };
        let Some(session_date) = parse_date_key(&row.session_date) else {
            warn!(line, session_date = %row.session_date, "skipping row with unparseable date");
            summary.skipped += 1;
            continue;
        };
        let Some((start_time, end_time)) = times_of(&row, line) else {
            summary.skipped += 1;
            continue;
        };

        let club_id = upsert_club(pool, club).await?;
        let coach_id = match (row.coach_name.as_deref(), row.coach_email.as_deref()) {
            (Some(name), Some(email)) => Some(upsert_coach(pool, club_id, name, email).await?),
            _ => None,
        };

        let source_key = row
            .source_key
            .clone()
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let (session_id, inserted) = upsert_session(
            pool,
            &NewSession {
                club_id,
                coach_id,
                title: row.title.as_deref(),
                session_name: row.session_name.as_deref(),
                session_date,
                start_time,
                end_time,
                location: row.location.as_deref(),
                description: row.description.as_deref(),
                source_key: &source_key,
            },
        )
        .await?;

        if inserted {
            summary.inserted += 1;
        } else {
            summary.updated += 1;
        }

        if let (Some(email), Some(status)) =
            (row.athlete_email.as_deref(), row.attendance_status.as_deref())
        {
            let status = status.trim().to_ascii_lowercase();
            if matches!(status.as_str(), "present" | "absent" | "late" | "excused") {
                let name = row.athlete_name.as_deref().unwrap_or(email);
                let athlete_id = upsert_athlete(pool, club_id, name, email).await?;
                record_attendance(pool, session_id, athlete_id, &status).await?;
            } else {
                warn!(line, status = %status, "ignoring unknown attendance status");
            }
        }
    }

    info!(?summary, path = %csv_path.display(), "import finished");
    Ok(summary)
}
