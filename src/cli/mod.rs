pub mod menu;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "habitual",
    about = "Track daily and weekly habits with streaks from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Add {
        name: String,
        period: String,
    },
    Check {
        name: String,
        period: String,
    },
    Show {
        name: String,
        period: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    List {
        #[arg(long)]
        period: Option<String>,
    },
    Streaks {
        #[arg(requires = "period")]
        name: Option<String>,
        period: Option<String>,
    },
    Delete {
        name: String,
        period: String,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}
