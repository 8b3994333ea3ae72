//! padkeys: gamepad-to-keystroke mapper
//!
//! Reads a gamepad through evdev and injects keystrokes through a uinput
//! virtual keyboard according to a named profile.

use anyhow::Result;
use clap::Parser;

mod cli;
use cli::{Cli, Commands};

mod commands;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let profiles = cli.profiles.as_deref();

    match cli.command {
        Commands::Run {
            profile,
            joystick_id,
            rate,
            dry_run,
        } => {
            let (_, book) = commands::load_book(profiles)?;
            commands::run(&book, &profile, joystick_id, rate, dry_run).await?;
        }
        Commands::Inspect {
            profile,
            joystick_id,
            rate,
        } => {
            let book = match profile {
                Some(_) => Some(commands::load_book(profiles)?.1),
                None => None,
            };
            commands::inspect(book.as_ref(), profile.as_deref(), joystick_id, rate).await?;
        }
        Commands::Profiles => {
            let (path, book) = commands::load_book(profiles)?;
            commands::profiles(&path, &book);
        }
        Commands::Check { profile } => {
            let (_, book) = commands::load_book(profiles)?;
            commands::check(&book, &profile)?;
        }
        Commands::Devices => commands::devices(),
        Commands::Keys => commands::keys(),
    }

    Ok(())
}
