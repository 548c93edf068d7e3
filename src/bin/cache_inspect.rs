use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use menu_board::cache::{CacheSettings, MenuCache};
use menu_board::config;
use menu_board::storage::SqliteStore;

#[derive(Debug, Parser)]
#[command(author, version, about = "Show the state of the cached menu")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let store = SqliteStore::open(&cfg.database_url()).await?;
    let cache = MenuCache::new(Arc::new(store), CacheSettings::from_config(&cfg.menu));

    match cache.inspect().await {
        Some(info) => {
            println!("Cache key: {}", cache.settings().key);
            match (info.fetched_at_ms, info.age_ms) {
                (Some(ts), Some(age)) => {
                    let fetched = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ts)
                        .map(|dt| dt.to_rfc3339())
                        .unwrap_or_else(|| ts.to_string());
                    println!("Fetched at: {} ({}s ago)", fetched, age / 1000);
                }
                _ => println!("Fetched at: unknown"),
            }
            println!(
                "Fresh: {} (ttl {}s)",
                info.fresh,
                cache.settings().ttl.as_secs()
            );
            println!("Categories: {}", info.categories);
            println!("Menu items: {}", info.menu_items);
        }
        None => println!("No usable cached menu."),
    }
    Ok(())
}
