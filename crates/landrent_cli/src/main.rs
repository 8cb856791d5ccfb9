//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a store under the given data directory.
//! - Print a deterministic summary plus contracts ending soon.
//!
//! Usage: `landrent_cli <data_dir>`

use chrono::Local;
use landrent_core::{
    core_version,
    db::open_db,
    logging::init_from_config,
    reminder::{notification_body, NOTIFICATION_TITLE},
    CoreConfig, EntryService, SqliteEntryRepository,
};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(data_dir) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: landrent_cli <data_dir>");
        return ExitCode::from(2);
    };

    match run(data_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            // No-op when logging never started.
            error!("event=cli_run module=cli status=error");
            eprintln!("landrent_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(data_dir: PathBuf) -> Result<(), String> {
    let data_dir = if data_dir.is_absolute() {
        data_dir
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve working directory: {err}"))?
            .join(data_dir)
    };
    let config = CoreConfig::with_data_dir(data_dir);

    init_from_config(&config).map_err(|err| err.to_string())?;

    let mut conn = open_db(config.db_path()).map_err(|err| err.to_string())?;
    let repo = SqliteEntryRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
    let service = EntryService::new(repo).with_reminder_window(config.reminder_window_days);

    println!("landrent_core version={}", core_version());
    println!("db_path={}", config.db_path().display());

    let entries = service.list_entries_or_empty();
    if let Some(error) = &entries.error {
        return Err(error.clone());
    }
    println!("entries={}", entries.items.len());

    let notices = service
        .expiring_contracts(Local::now().date_naive())
        .map_err(|err| err.to_string())?;
    if let Some(body) = notification_body(&notices) {
        println!("{NOTIFICATION_TITLE}");
        println!("{body}");
    }

    info!(
        "event=cli_run module=cli status=ok entries={} expiring={}",
        entries.items.len(),
        notices.len()
    );
    Ok(())
}
