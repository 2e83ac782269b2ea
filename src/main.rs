//! norflash - Serial NOR flash driver tool
//!
//! Drives the `norflash-core` driver against an emulated chip whose contents
//! live in an image file. Every run loads the image, identifies the chip,
//! performs one operation and writes the image back.

mod cli;
mod commands;
mod error;
mod session;

use clap::Parser;
use cli::{Cli, Commands};
use session::Session;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let mut session = match Session::open(&cli) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open flash: {}", e);
            if let Some(hint) = session::open_hint(&e) {
                eprintln!("Hint: {}", hint);
            }
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Probe => commands::run_probe(&mut session),
        Commands::Read {
            output,
            start,
            length,
        } => commands::run_read(&mut session, output, *start, *length),
        Commands::Write {
            input,
            start,
            erase,
        } => commands::run_write(&mut session, input, *start, *erase),
        Commands::Erase {
            start,
            length,
            unit,
        } => commands::run_erase(&mut session, *start, *length, *unit),
        Commands::Status => commands::run_status(&mut session),
        Commands::UniqueId => commands::run_unique_id(&mut session),
    };

    // Persist whatever was programmed, even if a later step failed
    let saved = session.save();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    saved?;
    Ok(())
}
