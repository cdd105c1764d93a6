use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twitter_feed::{Config, FeedData, TwitterFeedBlock};

#[derive(Parser, Debug)]
#[command(name = "twitter-feed")]
#[command(about = "Render a Twitter user's recent tweets as an HTML block", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (defaults to <config dir>/twitter-feed/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Twitter username to show, overriding [block].username
    #[arg(short, long)]
    username: Option<String>,

    /// Number of tweets to show, overriding [block].num_tweets
    #[arg(short = 'n', long)]
    count: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path().context("could not determine the config directory")?,
    };
    let mut config = Config::load(&path)?;

    if let Some(username) = cli.username {
        config.block.username = username;
    }
    if let Some(count) = cli.count {
        config.block.num_tweets = count;
    }
    config.validate()?;

    let mut block = TwitterFeedBlock::new(config.twitter, config.block);
    let fetcher = block.create_fetcher()?;

    let data = match fetcher.fetch().await {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to load tweets: {:#}", e);
            FeedData::Error(e.to_string())
        }
    };
    block.update_data(data);

    info!(username = block.username(), "Rendered feed block");
    print!("{}", block.render());
    Ok(())
}
