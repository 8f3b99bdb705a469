use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Cli {
    /// most verbose log level to print
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// json config with extra profiles and endpoint overrides
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct CardArgs {
    /// headline text
    pub headline: String,

    /// layout profile to render with (see `profiles`)
    #[arg(short, long, default_value = "classic")]
    pub profile: String,

    /// photo to place in the profile's image box
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// date to stamp on the card, defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// render a card to a png file
    Render {
        #[command(flatten)]
        card: CardArgs,

        /// where to write the png
        #[arg(short, long, value_name = "FILE", default_value = "news-card.png")]
        out: PathBuf,

        /// also upload the png and print its hosted url
        #[arg(long)]
        upload: bool,

        /// skip the background fetch and draw the solid fallback
        #[arg(long)]
        offline: bool,
    },
    /// print the computed layout as json without drawing anything
    Layout {
        #[command(flatten)]
        card: CardArgs,

        /// measure text with the monospace estimate instead of pango
        #[arg(long)]
        estimate: bool,
    },
    /// list available layout profiles
    Profiles,
    /// write schema files
    Schema {
        /// folder to write schemas into (will be created if it doesn't already exist)
        #[arg(short, long, value_name = "FILE", default_value = "./schemas/")]
        out_dir: PathBuf,
    },
}
