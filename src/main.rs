mod app;
mod catalog;
mod cli;
mod config;
mod db;
mod http;
mod logging;
mod paths;
mod player;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
