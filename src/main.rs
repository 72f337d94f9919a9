use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use club_schedule::calendar::{self, YearMonth};
use club_schedule::config::Config;
use club_schedule::db::{self, DateRange, SessionScope};
use club_schedule::locale::Locale;
use club_schedule::models::Session;
use club_schedule::report;
use club_schedule::schedule::ListView;

#[derive(Parser)]
#[command(name = "club-schedule")]
#[command(about = "Training calendar and schedule views for sports clubs", long_about = None)]
struct Cli {
    /// Output language (defaults to SCHEDULE_LOCALE, then Thai)
    #[arg(long, global = true, value_enum)]
    locale: Option<Locale>,
    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScopeArgs {
    /// Every session of a club, by club name
    #[arg(long)]
    club: Option<String>,
    /// One athlete's sessions, with their attendance
    #[arg(long)]
    email: Option<String>,
    /// Read sessions from a CSV file instead of the database
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[derive(Args)]
struct RenderArgs {
    /// Reference date for past/today/future (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Emit JSON instead of Markdown
    #[arg(long)]
    json: bool,
    /// Write to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo club with sessions around today
    Seed {
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Import sessions and attendance from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Render one month as a calendar grid
    Calendar {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        render: RenderArgs,
        /// Month to show as YYYY-MM (defaults to the month containing today)
        #[arg(long)]
        month: Option<String>,
        /// Months to move from --month, negative for earlier months
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },
    /// Render sessions as a date-ordered list
    List {
        #[command(flatten)]
        scope: ScopeArgs,
        #[command(flatten)]
        render: RenderArgs,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("warn"))
        .map_err(|e| anyhow!("invalid log level: {e}"))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url()?)
        .await
        .context("failed to connect to Postgres")
}

fn within(session: &Session, range: DateRange) -> bool {
    // Unparseable dates flow through; the views skip and log them.
    session.date().map_or(true, |date| range.contains(date))
}

async fn load_sessions(
    config: &Config,
    scope: ScopeArgs,
    range: DateRange,
) -> anyhow::Result<Vec<Session>> {
    let scope = match (scope.snapshot, scope.club, scope.email) {
        (Some(path), _, _) => {
            let sessions = db::load_sessions_csv(&path)?;
            return Ok(sessions.into_iter().filter(|s| within(s, range)).collect());
        }
        (None, Some(club), _) => SessionScope::Club(club),
        (None, None, Some(email)) => SessionScope::Athlete(email),
        (None, None, None) => return Err(anyhow!("one of --club, --email or --snapshot is required")),
    };

    let pool = connect(config).await?;
    db::fetch_sessions(&pool, &scope, range).await
}

fn emit(output: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Schedule written to {}.", path.display());
        }
        None => print!("{output}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = Config::from_env();
    let locale = cli.locale.unwrap_or(config.locale);
    debug!(?locale, "starting");

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let pool = connect(&config).await?;
            db::seed(&pool, today).await?;
            println!("Seed data inserted around {today}.");
        }
        Commands::Import { csv } => {
            let pool = connect(&config).await?;
            let summary = db::import_csv(&pool, &csv).await?;
            println!(
                "Imported {} new and {} updated sessions from {} ({} skipped).",
                summary.inserted,
                summary.updated,
                csv.display(),
                summary.skipped
            );
        }
        Commands::Calendar {
            scope,
            render,
            month,
            offset,
        } => {
            let today = render.today.unwrap_or_else(|| Local::now().date_naive());
            let base = match month.as_deref() {
                Some(value) => YearMonth::parse(value)?,
                None => YearMonth::containing(today),
            };
            let month = base
                .offset(offset)
                .with_context(|| format!("{base} moved by {offset} months is out of range"))?;

            let first = month.first_day();
            let last = first + Duration::days(i64::from(month.days_in_month()) - 1);
            let sessions = load_sessions(&config, scope, DateRange::between(first, last)).await?;

            let grid = calendar::build_month_grid(&sessions, month, today);
            info!(%month, sessions = grid.session_count(), "built calendar");

            let output = if render.json {
                report::render_json(&grid)?
            } else {
                report::render_calendar(&grid, locale)
            };
            emit(&output, render.out.as_deref())?;
        }
        Commands::List {
            scope,
            render,
            from,
            to,
        } => {
            let today = render.today.unwrap_or_else(|| Local::now().date_naive());
            let sessions = load_sessions(&config, scope, DateRange { from, to }).await?;

            let view = ListView::build(Some(sessions.as_slice()), today, locale);
            let output = if render.json {
                report::render_json(&view)?
            } else {
                report::render_list(&view, locale)
            };
            emit(&output, render.out.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use club_schedule::models::AttendanceStatus;
    use uuid::Uuid;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_session(date: &str, attendance_status: AttendanceStatus) -> Session {
        Session {
            id: Uuid::new_v4(),
            title: None,
            session_name: None,
            session_date: date.to_string(),
            start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
            location: None,
            description: None,
            coach_name: None,
            attendance_status,
        }
    }

    #[test]
    fn range_filter_keeps_bad_dates_for_the_views() {
        let range = DateRange::between(day(2024, 3, 1), day(2024, 3, 31));
        assert!(within(&sample_session("2024-03-15", AttendanceStatus::Unset), range));
        assert!(!within(&sample_session("2024-04-01", AttendanceStatus::Unset), range));
        assert!(within(&sample_session("garbled", AttendanceStatus::Unset), range));
        assert!(within(&sample_session("1999-01-01", AttendanceStatus::Unset), DateRange::default()));
    }

    #[test]
    fn list_bounds_pass_through_as_given() {
        let cli = Cli::try_parse_from([
            "club-schedule",
            "list",
            "--club",
            "Swim",
            "--to",
            "2024-03-31",
        ])
        .unwrap();
        let Commands::List { from, to, .. } = cli.command else {
            panic!("expected list command");
        };
        let range = DateRange { from, to };
        assert_eq!(range.from, None);
        assert_eq!(range.to, Some(day(2024, 3, 31)));
        assert!(within(&sample_session("2001-06-01", AttendanceStatus::Unset), range));

        let cli = Cli::try_parse_from([
            "club-schedule",
            "list",
            "--club",
            "Swim",
            "--from",
            "2024-03-01",
        ])
        .unwrap();
        let Commands::List { from, to, .. } = cli.command else {
            panic!("expected list command");
        };
        let range = DateRange { from, to };
        assert_eq!(range.from, Some(day(2024, 3, 1)));
        assert_eq!(range.to, None);
        assert!(!within(&sample_session("2024-02-29", AttendanceStatus::Unset), range));
    }

    #[test]
    fn cli_requires_exactly_one_scope() {
        assert!(Cli::try_parse_from(["club-schedule", "list"]).is_err());
        assert!(Cli::try_parse_from([
            "club-schedule",
            "list",
            "--club",
            "Swim",
            "--email",
            "a@b.c"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["club-schedule", "calendar", "--club", "Swim"]).is_ok());
    }

    #[test]
    fn cli_accepts_negative_offsets() {
        let cli = Cli::try_parse_from([
            "club-schedule",
            "--locale",
            "en",
            "calendar",
            "--snapshot",
            "sessions.csv",
            "--month",
            "2024-01",
            "--offset",
            "-1",
        ])
        .unwrap();
        assert_eq!(cli.locale, Some(Locale::English));
        match cli.command {
            Commands::Calendar { offset, month, .. } => {
                assert_eq!(offset, -1);
                assert_eq!(month.as_deref(), Some("2024-01"));
            }
            _ => panic!("expected calendar command"),
        }
    }
}
