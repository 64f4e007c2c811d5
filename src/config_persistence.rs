//! Config file location, first-run creation, and comment-preserving updates.

use std::path::{Path, PathBuf};

use log::{info, warn};
use toml_edit::{value, DocumentMut, Item, Table};

use crate::config::{sanitize_config, Config};

/// `<config_dir>/playdeck/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|root| root.join("playdeck").join("config.toml"))
}

/// Reads the config at `path`, writing defaults first when it does not exist.
///
/// An unreadable or malformed file falls back to defaults with a warning.
pub fn load_or_create_config(path: &Path) -> Config {
    if !path.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            path.display()
        );
        if let Err(err) = write_default_config(path) {
            warn!(
                "Failed to create default config {}: {}",
                path.display(),
                err
            );
        }
        return Config::default();
    }

    let config_content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(
                "Failed to read config file {}. Using defaults. error={}",
                path.display(),
                err
            );
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&config_content) {
        Ok(config) => sanitize_config(config),
        Err(err) => {
            warn!(
                "Failed to parse config file {}. Using defaults. error={}",
                path.display(),
                err
            );
            Config::default()
        }
    }
}

fn write_default_config(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
    }
    let text = toml::to_string(&Config::default())
        .map_err(|err| format!("failed to serialize default config: {}", err))?;
    std::fs::write(path, text).map_err(|err| format!("failed to write config: {}", err))
}

fn ensure_section_table<'a>(
    document: &'a mut DocumentMut,
    key: &str,
) -> Result<&'a mut Table, String> {
    let root = document.as_table_mut();
    let should_replace = !matches!(root.get(key), Some(item) if item.is_table());
    if should_replace {
        root.insert(key, Item::Table(Table::new()));
    }
    root[key]
        .as_table_mut()
        .ok_or_else(|| format!("[{}] is not a table", key))
}

fn set_value_preserving_decor(table: &mut Table, key: &str, next: &str) {
    let existing_decor = table
        .get(key)
        .and_then(|current| current.as_value().map(|current| current.decor().clone()));
    table[key] = value(next);
    if let (Some(decor), Some(updated)) = (existing_decor, table[key].as_value_mut()) {
        *updated.decor_mut() = decor;
    }
}

/// Rewrites only the endpoint keys of `existing_text`, keeping comments and layout.
pub fn serialize_endpoints_with_preserved_comments(
    existing_text: &str,
    catalog_endpoint: Option<&str>,
    player_endpoint: Option<&str>,
) -> Result<String, String> {
    let mut document = existing_text
        .parse::<DocumentMut>()
        .map_err(|err| format!("failed to parse existing config as TOML document: {}", err))?;
    if let Some(endpoint) = catalog_endpoint {
        let catalog = ensure_section_table(&mut document, "catalog")?;
        set_value_preserving_decor(catalog, "endpoint", endpoint.trim().trim_end_matches('/'));
    }
    if let Some(endpoint) = player_endpoint {
        let player = ensure_section_table(&mut document, "player")?;
        set_value_preserving_decor(player, "endpoint", endpoint.trim().trim_end_matches('/'));
    }
    let updated = document.to_string();
    toml::from_str::<Config>(&updated)
        .map_err(|err| format!("updated config no longer parses: {}", err))?;
    Ok(updated)
}

/// Persists endpoint overrides to the config file at `path`.
pub fn persist_endpoints(
    path: &Path,
    catalog_endpoint: Option<&str>,
    player_endpoint: Option<&str>,
) -> Result<(), String> {
    if !path.exists() {
        write_default_config(path)?;
    }
    let existing_text = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let updated =
        serialize_endpoints_with_preserved_comments(&existing_text, catalog_endpoint, player_endpoint)?;
    std::fs::write(path, updated)
        .map_err(|err| format!("failed to persist config to {}: {}", path.display(), err))
}
