mod backends;
mod cli;
mod commands;
mod config;
mod config_persistence;
mod error;
mod model;
mod now_playing;
mod playlist_orchestrator;
mod search;

use std::sync::Arc;

use clap::Parser;
use log::{debug, error, info};

use backends::catalog_server::CatalogServerAdapter;
use backends::player_server::PlayerServerAdapter;
use cli::{Cli, Command};
use commands::{run_command, Session};
use config::{sanitize_config, Config};
use config_persistence::{default_config_path, load_or_create_config, persist_endpoints};

fn init_logging(verbose: bool) {
    let mut clog = colog::default_builder();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    clog.filter(None, level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        clog.parse_filters(&filters);
    }
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}

fn apply_endpoint_overrides(config: Config, cli: &Cli) -> Config {
    let mut config = config;
    if let Some(catalog_url) = &cli.catalog_url {
        config.catalog.endpoint = catalog_url.clone();
    }
    if let Some(player_url) = &cli.player_url {
        config.player.endpoint = player_url.clone();
    }
    sanitize_config(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_file = cli
        .config
        .clone()
        .or_else(default_config_path)
        .ok_or("no config directory available; pass --config")?;

    if matches!(cli.command, Command::Configure) {
        if cli.catalog_url.is_none() && cli.player_url.is_none() {
            return Err("configure needs --catalog-url and/or --player-url".into());
        }
        persist_endpoints(
            &config_file,
            cli.catalog_url.as_deref(),
            cli.player_url.as_deref(),
        )?;
        info!("Saved endpoints to {}", config_file.display());
        return Ok(());
    }

    let config = apply_endpoint_overrides(load_or_create_config(&config_file), &cli);
    debug!(
        "Using catalog {} and player {}",
        config.catalog.endpoint, config.player.endpoint
    );

    let catalog = Arc::new(CatalogServerAdapter::new(&config.catalog, &config.http));
    let player = Arc::new(PlayerServerAdapter::new(&config.player, &config.http));
    let session = Session::new(config, catalog, player);

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = run_command(&session, &cli.command, &mut stdout) {
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
