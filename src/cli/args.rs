use clap::{Parser, Subcommand};

use matura::models::LessonId;

#[derive(Parser, Debug)]
#[command(name = "matura", version, author, about = "Matura Master: gamified Bulgarian lessons in your terminal")]
pub struct Cli {
    /// Track to work on (defaults to learner.default_track from config)
    #[arg(long, short, global = true)]
    pub track: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available tracks and their progress
    Tracks,
    /// Show the lesson board for a track
    Lessons,
    /// Play a lesson (defaults to the current lesson)
    Play {
        /// Lesson number
        lesson: Option<LessonId>,
    },
    /// Show XP, streak and goal progress
    Stats,
    /// Print progress as JSON to stdout
    Export,
    /// Erase all progress for a track
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file if none exists yet
        #[arg(long)]
        init: bool,
    },
}
