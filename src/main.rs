mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use matura::config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;
    let track = cli.track.as_deref();

    match cli.command {
        Some(Commands::Tracks) => handlers::handle_tracks(&config)?,
        Some(Commands::Lessons) => handlers::handle_lessons(&config, track)?,
        Some(Commands::Play { lesson }) => handlers::handle_play(&config, track, lesson)?,
        Some(Commands::Stats) => handlers::handle_stats(&config, track)?,
        Some(Commands::Export) => handlers::handle_export(&config, track)?,
        Some(Commands::Reset { yes }) => handlers::handle_reset(&config, track, yes)?,
        Some(Commands::Config { init }) => handlers::handle_config(&config, init)?,

        // No subcommand → show the lesson board
        None => handlers::handle_lessons(&config, track)?,
    }

    Ok(())
}
