// Lesson Calendar command line
// Renders layouts, expands series and lists agendas from a SQLite lesson store as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use lesson_calendar::models::lesson::Lesson;
use lesson_calendar::models::recurrence::RecurrenceRule;
use lesson_calendar::models::settings::CalendarSettings;
use lesson_calendar::services::closure::ClosureService;
use lesson_calendar::services::database::Database;
use lesson_calendar::services::lesson::LessonService;
use lesson_calendar::services::recurrence::{effective_end_date, expand_series, RecurrenceLimits};
use lesson_calendar::services::settings::SettingsService;
use lesson_calendar::ui::views::{AgendaView, DayView, TimeGrid, WeekView};
use lesson_calendar::utils::date::local_date;

#[derive(Parser)]
#[command(
    name = "lesson-calendar",
    version = env!("CARGO_PKG_VERSION"),
    about = "Lesson scheduling engine: layouts, recurring series and agendas as JSON",
    long_about = None
)]
struct Cli {
    /// Override the lesson database path
    #[arg(global = true, long = "db")]
    db: Option<PathBuf>,

    /// Override the settings file path
    #[arg(global = true, long = "config")]
    config: Option<PathBuf>,

    /// Override the organisation timezone (IANA name)
    #[arg(global = true, long = "timezone")]
    timezone: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out the lessons of a day (or its week) into columns
    Layout {
        /// Date to show (YYYY-MM-DD)
        date: NaiveDate,

        #[arg(long, help = "Show the whole Sunday-start week")]
        week: bool,
    },

    /// Expand a weekly series without saving it
    Expand {
        /// Seed lesson start (RFC 3339)
        start: DateTime<Utc>,

        /// Weekday indices, 0 = Sunday
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<u8>,

        #[arg(long, help = "Last date of the series (YYYY-MM-DD)")]
        until: Option<NaiveDate>,

        #[arg(long, default_value_t = 1, help = "Repeat every N weeks")]
        interval: u32,

        #[arg(long, help = "Location the series runs at")]
        location: Option<String>,
    },

    /// List lessons grouped by local date
    Agenda {
        /// First date (YYYY-MM-DD)
        from: NaiveDate,

        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings_service = match cli.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::from_environment()?,
    };
    let mut settings = settings_service.get()?;
    if let Some(name) = cli.timezone.as_deref() {
        settings.timezone = CalendarSettings::parse_timezone(name)?;
    }
    let db = open_database(cli.db)?;

    match cli.command {
        Commands::Layout { date, week } => layout(&db, &settings, date, week),
        Commands::Expand {
            start,
            days,
            until,
            interval,
            location,
        } => {
            let mut rule = RecurrenceRule::new(start, days, settings.timezone)?
                .with_interval_weeks(interval)?;
            if let Some(until) = until {
                rule = rule.with_end_date(until);
            }
            let limits = RecurrenceLimits::from(&settings);
            let closures = ClosureService::new(db.connection()).find_in_range(
                local_date(&settings.timezone, start),
                effective_end_date(&rule, &limits),
            )?;
            let expansion = expand_series(&rule, location.as_deref(), &closures, &limits);
            if let Some(summary) = expansion.summary() {
                log::info!("{}", summary);
            }
            print_json(&expansion)
        }
        Commands::Agenda { from, days } => {
            let view = AgendaView::new(from, days, settings.timezone);
            let (start, end) = view
                .instant_range()
                .context("Agenda range falls outside the supported calendar")?;
            let lessons = LessonService::new(db.connection()).find_by_range(start, end)?;
            print_json(&view.group(&lessons))
        }
    }
}

fn layout(db: &Database, settings: &CalendarSettings, date: NaiveDate, week: bool) -> Result<()> {
    // Visible hours depend on the lessons, so fetch with the default window first
    let (start, end) = grid_for(settings, date, week, &[])
        .instant_range()
        .context("Layout range falls outside the supported calendar")?;
    let lessons = LessonService::new(db.connection()).find_by_range(start, end)?;

    let rendered = grid_for(settings, date, week, &lessons).render(&lessons, None, None);
    print_json(&rendered)
}

fn grid_for(settings: &CalendarSettings, date: NaiveDate, week: bool, lessons: &[Lesson]) -> TimeGrid {
    if week {
        WeekView::new(date, settings, lessons).grid
    } else {
        DayView::new(date, settings, lessons).grid
    }
}

fn open_database(path: Option<PathBuf>) -> Result<Database> {
    let path = match path {
        Some(path) => path,
        None => {
            let proj_dirs = ProjectDirs::from("com", "KenBoyle", "LessonCalendar")
                .context("Failed to resolve data directory")?;
            std::fs::create_dir_all(proj_dirs.data_dir())
                .context("Failed to create data directory")?;
            proj_dirs.data_dir().join("lessons.db")
        }
    };

    let db = Database::new(&path.to_string_lossy())?;
    db.initialize_schema()?;
    Ok(db)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
