use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "reelwatch",
    version,
    about = "Watch catalog episodes with a custom player overlay and track where you left off"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the player for a title, starting at EPISODE (default 1).
    Watch {
        title_id: String,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        episode: Option<u32>,
        /// Start paused instead of playing immediately.
        #[arg(long)]
        no_autoplay: bool,
        /// Resolve video sources from this service instead of the built-in mock.
        #[arg(long, value_name = "URL")]
        source_url: Option<String>,
    },
    /// Open the player at the last recorded episode of a title.
    Resume {
        title_id: String,
        #[arg(long)]
        no_autoplay: bool,
    },
    /// List watch history, most recent first.
    History,
    /// List catalog titles.
    Titles,
}
