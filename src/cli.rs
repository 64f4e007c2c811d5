//! Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "playdeck", about = "Search a remote music catalog and drive a remote player")]
pub struct Cli {
    /// Config file (defaults to `<config_dir>/playdeck/config.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Catalog server URL for this run.
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,
    /// Player server URL for this run.
    #[arg(long, global = true)]
    pub player_url: Option<String>,
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityScope {
    Artist,
    Album,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VolumeDirection {
    Up,
    Down,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search songs, or artists/albums with `:artist <words>` / `:album <words>`.
    Search {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// List the tracks of an artist or album.
    Show { scope: EntityScope, id: String },
    /// Add one track to the playlist.
    Add { track_id: String },
    /// Add every track of an artist or album to the playlist.
    AddAll { scope: EntityScope, id: String },
    /// Print the playlist in playback order.
    Playlist,
    /// Print the current playlist position.
    Current,
    /// Play the track at a 1-based playlist position, or resume.
    Play { position: Option<usize> },
    Pause,
    Resume,
    Next,
    Previous,
    Volume { direction: VolumeDirection },
    /// Remove the track at a 1-based playlist position.
    Remove { position: usize },
    /// Follow the current track until interrupted.
    Watch,
    /// Save `--catalog-url` / `--player-url` into the config file.
    Configure,
}

impl Cli {
    /// Joins the search words back into the raw query string.
    pub fn query_text(words: &[String]) -> String {
        words.join(" ")
    }
}
