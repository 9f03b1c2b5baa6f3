// src/main.rs

//! Forum archiver CLI.
//!
//! Crawls a hierarchical forum (boards → threads → posts) and writes one
//! timestamped JSON archive document per run.

use std::sync::Arc;

use clap::Parser;

use forum_archiver::error::Result;
use forum_archiver::models::Config;
use forum_archiver::pipeline::run_crawl;
use forum_archiver::storage::LocalStorage;

#[derive(Parser, Debug)]
#[command(
    name = "forum-archiver",
    version,
    about = "Forum board/thread/post archiver"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the forum index URL from the config
    #[arg(long)]
    start_url: Option<String>,

    /// Override the archive output directory from the config
    #[arg(short, long)]
    output: Option<String>,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = Config::load_or_default(&cli.config);
    if let Some(url) = cli.start_url {
        config.forum.start_url = url;
    }
    if let Some(dir) = cli.output {
        config.paths.output_dir = dir.into();
    }
    config.validate()?;

    let storage = LocalStorage::new(config.paths.output_dir.clone());
    run_crawl(Arc::new(config), &storage).await?;

    Ok(())
}
