use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;

use tapnotes::cli::Cli;
use tapnotes::commands::Session;
use tapnotes::config::Settings;
use tapnotes::logging::init_logging;
use tapnotes::{Database, NoteLifecycle};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("could not load configuration")?;
    if let Err(e) = init_logging(&settings.log_filter) {
        eprintln!("warning: logging disabled: {}", e);
    }

    tracing::debug!(path = %settings.database_path.display(), "using database");
    let db = Database::open(&settings.database_path, &settings.legacy_owner)
        .with_context(|| format!("could not open {}", settings.database_path.display()))?;
    let notes = NoteLifecycle::new(db.notes.clone());

    let session = Session {
        notes: &notes,
        user: cli.user.or(settings.default_user.clone()),
        json: cli.json,
        trash_retention: settings.trash_retention(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.run(cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}
