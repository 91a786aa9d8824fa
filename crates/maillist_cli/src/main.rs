//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire settings, logging and the subscriber store together once.
//! - Abort startup when the store cannot be opened.

use log::error;
use maillist_core::db::{open_db, open_db_in_memory};
use maillist_core::{
    core_version, init_logging, PageRequest, SqliteSubscriberRepository, StoreSettings,
    SubscriberRepository,
};
use std::process::ExitCode;

const PROBE_PAGE_SIZE: u32 = 100;

fn main() -> ExitCode {
    let settings = match StoreSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = settings.log_dir.as_deref() {
        if let Err(err) = init_logging(&settings.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let opened = match settings.db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=startup module=cli status=error error={err}");
            eprintln!("cannot open subscriber store: {err}");
            return ExitCode::FAILURE;
        }
    };

    let repo = SqliteSubscriberRepository::new(&conn);
    match repo.list_active(&PageRequest::new(1, PROBE_PAGE_SIZE)) {
        Ok(active) => {
            println!("maillist_core version={}", core_version());
            println!("maillist_core active_first_page={}", active.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("cannot list subscribers: {err}");
            ExitCode::FAILURE
        }
    }
}
