//! Operator CLI over the ringlog record store.
//!
//! # Responsibility
//! - Provide a smoke probe (`ping`) for `ringlog_core` linkage.
//! - Expose list/get/add/update/delete/count against a database file.
//!
//! # Invariants
//! - `update` always sends a full record copy with the caller's version.
//! - Exit code is non-zero on any failure, including version conflicts.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use ringlog_core::db::{open_db, DB_PATH_ENV};
use ringlog_core::logging::{LOG_DIR_ENV, LOG_LEVEL_ENV};
use ringlog_core::{
    default_log_level, init_logging, Data, DataField, DataId, DataService, FieldValue,
    PageRequest, Sort, SortOrder, SqliteDataRepository,
};
use std::error::Error;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Daily activity record store
#[derive(Parser, Debug)]
#[command(name = "ringlog", version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = DB_PATH_ENV, default_value = "ringlog.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = LOG_DIR_ENV)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage information
    Ping,
    /// Print the total number of records
    Count,
    /// Print one page of records
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Sort entry `field[:asc|:desc]`, repeatable; earlier entries win
        #[arg(long = "sort", value_parser = parse_sort_order)]
        sort: Vec<SortOrder>,
    },
    /// Print one record
    Get { id: DataId },
    /// Insert a new record
    Add(Fields),
    /// Replace an existing record
    Update {
        id: DataId,
        /// Version read before editing
        #[arg(long = "expected-version")]
        version: i32,
        #[command(flatten)]
        fields: Fields,
    },
    /// Delete a record (unknown ids succeed)
    Delete { id: DataId },
}

#[derive(Args, Debug)]
struct Fields {
    /// Calendar day, YYYY-MM-DD
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    moves: Option<i32>,
    #[arg(long)]
    exercise: Option<i32>,
    #[arg(long)]
    stand: Option<i32>,
    #[arg(long)]
    steps: Option<i32>,
    #[arg(long)]
    calories: Option<i32>,
}

impl Fields {
    fn into_data(self, id: Option<DataId>, version: i32) -> Data {
        Data {
            id,
            version,
            date: self.date,
            moves: self.moves,
            exercise: self.exercise,
            stand: self.stand,
            steps: self.steps,
            calories: self.calories,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    if let Command::Ping = cli.command {
        println!("ringlog_core ping={}", ringlog_core::ping());
        println!("ringlog_core version={}", ringlog_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)?;
    let service = DataService::new(SqliteDataRepository::try_new(&conn)?);
    info!("event=cli_command module=cli status=start db={}", cli.db.display());

    match cli.command {
        Command::Ping => {}
        Command::Count => println!("{}", service.count()?),
        Command::List { page, size, sort } => {
            let sort: Sort = sort.into_iter().collect();
            let request = PageRequest::of(page, size)?.with_sort(sort);
            let result = service.list(&request)?;
            for data in &result.content {
                println!("{}", format_data(data));
            }
            println!(
                "page {}/{} ({} records)",
                u64::from(result.page) + 1,
                result.total_pages().max(1),
                result.total_elements
            );
        }
        Command::Get { id } => match service.get(id)? {
            Some(data) => println!("{}", format_data(&data)),
            None => println!("record {id} not found"),
        },
        Command::Add(fields) => {
            let saved = service.update(&fields.into_data(None, 0))?;
            println!("{}", format_data(&saved));
        }
        Command::Update {
            id,
            version,
            fields,
        } => {
            let saved = service.update(&fields.into_data(Some(id), version))?;
            println!("{}", format_data(&saved));
        }
        Command::Delete { id } => {
            service.delete(id)?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    let (property, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    let field = DataField::from_property(property.trim())
        .ok_or_else(|| format!("unknown field `{property}`"))?;
    match direction.trim().to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::asc(field)),
        "desc" => Ok(SortOrder::desc(field)),
        other => Err(format!("unknown direction `{other}`; expected asc|desc")),
    }
}

fn format_data(data: &Data) -> String {
    DataField::ALL
        .into_iter()
        .map(|field| {
            let value = match field.value_of(data) {
                Some(FieldValue::Integer(value)) => value.to_string(),
                Some(FieldValue::Date(date)) => date.to_string(),
                None => "-".to_string(),
            };
            format!("{field}={value}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
