mod display;
mod watch;


use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::catalog;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::Database;
use crate::logging;
use crate::paths::{data_dir, database_file_path, log_dir};
use crate::player::history::DisabledStore;
use crate::player::source::{HttpSourceResolver, MockSourceResolver};
use crate::player::{EpisodeContext, WatchHistory};

use self::display::{format_episode_position, format_progress_percent, format_watched_at, truncate};
use self::watch::{SharedResolver, Store, run_watch};

pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env()?;
    let data_dir = data_dir(config.data_dir.as_deref())?;
    let _guard = match logging::init(&log_dir(&data_dir), config.log_format) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };
    let history = WatchHistory::new(open_store(&data_dir));

    match cli.command {
        Command::Watch {
            title_id,
            episode,
            no_autoplay,
            source_url,
        } => {
            if source_url.is_some() {
                config.source_url = source_url;
            }
            if no_autoplay {
                config.autoplay = false;
            }
            let (context, title) = catalog::episode_context(&title_id, episode.unwrap_or(1))?;
            watch(&config, title, context, history)?;
        }
        Command::Resume {
            title_id,
            no_autoplay,
        } => {
            if no_autoplay {
                config.autoplay = false;
            }
            let episode = resume_episode(&history, &title_id);
            let (context, title) = catalog::episode_context(&title_id, episode)?;
            watch(&config, title, context, history)?;
        }
        Command::History => run_history(&history),
        Command::Titles => run_titles(),
    }

    Ok(())
}

fn watch(
    config: &Config,
    title: &'static catalog::Title,
    context: EpisodeContext,
    history: WatchHistory<Store>,
) -> Result<()> {
    info!(movie_id = context.movie_id(), episode = context.current(), "opening player");
    let last = run_watch(
        title,
        context,
        history,
        resolver_for(config),
        config.sim_duration,
        config.autoplay,
    )?;
    println!(
        "Stopped at {} {}.",
        title.title,
        format_episode_position(last.current(), last.total())
    );
    Ok(())
}

fn resolver_for(config: &Config) -> SharedResolver {
    match config.source_url.as_deref() {
        Some(base_url) => Arc::new(HttpSourceResolver::new(base_url, config.request.clone())),
        None => Arc::new(MockSourceResolver),
    }
}

/// Last recorded episode for a title, clamped into its catalog range.
fn resume_episode(history: &WatchHistory<Store>, title_id: &str) -> u32 {
    let total = catalog::lookup(title_id)
        .map(|title| title.total_episodes)
        .unwrap_or(1);
    history
        .lookup(title_id)
        .map(|record| record.episode.clamp(1, total.max(1)))
        .unwrap_or(1)
}

fn run_history(history: &WatchHistory<Store>) {
    let entries = history.entries();
    if entries.is_empty() {
        println!("No watch history yet. Run `reelwatch watch <TITLE_ID>` first.");
        return;
    }

    println!(
        "{:<40} {:<10} {:<10} {:<28}",
        "TITLE", "EP", "PROGRESS", "LAST WATCHED"
    );
    for (movie_id, record) in entries {
        let (name, total) = match catalog::lookup(&movie_id) {
            Some(title) => (title.title.to_string(), title.total_episodes),
            None => (movie_id.clone(), record.episode),
        };
        println!(
            "{:<40} {:<10} {:<10} {:<28}",
            truncate(&name, 40),
            format_episode_position(record.episode, total),
            format_progress_percent(record.progress),
            format_watched_at(record.timestamp)
        );
    }
}

fn run_titles() {
    println!("{:<24} {:<32} {:<6}", "ID", "TITLE", "EPS");
    for title in catalog::titles() {
        println!(
            "{:<24} {:<32} {:<6}",
            title.id,
            truncate(title.title, 32),
            title.total_episodes
        );
    }
}

fn open_store(data_dir: &Path) -> Store {
    let path = database_file_path(data_dir);
    let opened = Database::open(&path).and_then(|db| {
        db.migrate()?;
        Ok(db)
    });
    match opened {
        Ok(db) => Box::new(db),
        Err(err) => {
            warn!(
                error = %format!("{err:#}"),
                path = %path.display(),
                "history storage unavailable"
            );
            Box::new(DisabledStore)
        }
    }
}
