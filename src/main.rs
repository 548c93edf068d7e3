use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use menu_board::config;
use menu_board::controller::MenuController;
use menu_board::loader::MenuLoader;
use menu_board::render::{render_unavailable, render_view, theme_banner, ExpansionState};
use menu_board::storage::{KeyValueStore, MemoryStore, SqliteStore};
use menu_board::theme::ThemePreference;
use menu_board::view::FilteredView;

#[derive(Debug, Parser)]
#[command(author, version, about = "Print the restaurant menu with search and filters")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Free-text search over dish names and descriptions
    #[arg(long, default_value = "")]
    query: String,

    /// Only show vegetarian dishes
    #[arg(long)]
    veg: bool,

    /// Expand every category section
    #[arg(long)]
    expand_all: bool,

    /// Print the filtered view as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Flip the persisted light/dark theme before printing
    #[arg(long)]
    toggle_theme: bool,

    /// Keep cache and theme in memory only
    #[arg(long)]
    no_persist: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    cfg.ensure_dirs()?;

    let store: Arc<dyn KeyValueStore> = if args.no_persist {
        Arc::new(MemoryStore::new())
    } else {
        match SqliteStore::open(&cfg.database_url()).await {
            Ok(store) => Arc::new(store),
            Err(err) => {
                error!(?err, "persistent storage unavailable; continuing in memory");
                Arc::new(MemoryStore::new())
            }
        }
    };

    let theme = ThemePreference::new(store.clone(), cfg.theme.storage_key.clone(), cfg.theme.default);
    let theme = if args.toggle_theme {
        theme.toggle().await
    } else {
        theme.current().await
    };

    let loader = MenuLoader::from_config(&cfg, store);
    let mut controller = MenuController::new();
    if controller.initial_load(&loader).await.is_err() {
        println!("{}", render_unavailable());
        return Ok(());
    }
    controller.on_veg_only_toggled(args.veg)?;
    let view = controller.on_query_changed(args.query)?;
    info!(items = view.item_count(), "menu view computed");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let mut expansion = ExpansionState::new();
    if args.expand_all {
        if let FilteredView::Categorized { sections } = &view {
            expansion.expand_all(sections.iter().map(|s| s.category.id));
        }
    }
    println!("{}", theme_banner(theme));
    print!("{}", render_view(&view, &expansion));
    Ok(())
}
