use clap::{Parser, Subcommand};

use crate::config::DEFAULT_POLL_MINUTES;

#[derive(Parser)]
#[command(name = "devlife-feeder")]
#[command(about = "Posts new developerslife entries to a Slack webhook")]
#[command(version)]
pub struct Cli {
    /// Sleep time before recheck, in minutes
    #[arg(long, global = true, value_name = "MINUTES", default_value_t = DEFAULT_POLL_MINUTES)]
    pub sleep: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll the feed forever (default)
    Run {
        /// Log notifications instead of sending them; the watermark is left untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Check the feed once and exit
    Once {
        /// Log notifications instead of sending them; the watermark is left untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the stored watermark
    Watermark,

    /// Forget the stored watermark so the next check starts from scratch
    Reset,
}
