pub mod chat;
pub mod cli;
pub mod core;
pub mod providers;

use crate::chat::Bot;
use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::providers::ExchangeApiSource;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    /// Answer a single free-form query
    Ask(String),
    /// Show rates for the given currencies, or the main ones
    Rates(Vec<String>),
    /// Interactive console conversation
    Chat,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Kursbot starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let bot = build_bot(&config)?;

    match command {
        AppCommand::Ask(text) => cli::ask::run(&bot, &text).await,
        AppCommand::Rates(codes) => cli::rates::run(&bot, &codes).await,
        AppCommand::Chat => cli::chat::run(&bot).await,
    }
}

/// Wires the configured provider and cache into a bot.
pub fn build_bot(config: &AppConfig) -> Result<Bot> {
    let source = ExchangeApiSource::new(&config.provider.url, config.fetch_timeout())?;
    let cache = RateCache::with_settings(
        Arc::new(source),
        config.cache_ttl(),
        config.fetch_timeout(),
    );
    Ok(Bot::from_config(config, Arc::new(cache)))
}
