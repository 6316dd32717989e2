//! Question-bank navigator
//!
//! Loads the category tree from the configured question-bank API and prints
//! it, marking the remembered category.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qbank_navigator::config::Config;
use qbank_navigator::db::{self, SqlitePreferences};
use qbank_navigator::{tree, HttpBackend, LazyChildCache, NoopHost, SelectionCoordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting question-bank navigator");
    tracing::info!("API URL: {}", config.api_url);
    tracing::info!("Preferences path: {:?}", config.prefs_path);

    if config.api_key.is_none() {
        tracing::warn!("No API key configured (QBANK_API_KEY). Requests are unauthenticated");
    }

    let pool = db::init_database(&config.prefs_path).await?;
    let prefs = SqlitePreferences::new(pool);
    let backend = HttpBackend::from_config(&config)?;
    let cache = Arc::new(LazyChildCache::new());

    let mut navigator = SelectionCoordinator::new(backend, prefs, NoopHost, cache)
        .with_subcategories(config.include_subcategories);
    navigator.load().await?;

    let selected = navigator.selected_category_id();
    for node in tree::flatten(navigator.tree()) {
        let marker = if Some(node.id) == selected { '*' } else { ' ' };
        println!(
            "{} {}{} [{}]",
            marker,
            "  ".repeat(node.level as usize),
            node.name,
            node.id
        );
    }

    if let Some(course_id) = navigator.preferred_course_id() {
        println!("Remembered course: {}", course_id);
    }

    Ok(())
}
