//! Backend adapter abstractions and concrete implementations.
//!
//! The catalog server owns track metadata; the player server owns playlist
//! order and playback. Both are reached only through these traits.

pub mod catalog_server;
pub mod player_server;

use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::BackendResult;
use crate::model::{CatalogEntry, PlaylistAddEntry, Track};

/// Interface of the remote catalog server.
pub trait CatalogBackend: Send + Sync {
    fn list_artists(&self) -> BackendResult<Vec<CatalogEntry>>;
    fn list_albums(&self) -> BackendResult<Vec<CatalogEntry>>;
    /// Free-text song search.
    fn search_tracks(&self, term: &str) -> BackendResult<Vec<Track>>;
    fn tracks_by_artist(&self, artist_id: &str) -> BackendResult<Vec<Track>>;
    fn tracks_by_album(&self, album_id: &str) -> BackendResult<Vec<Track>>;
    /// Batch metadata lookup. Response order is not guaranteed to follow `ids`.
    fn tracks_info(&self, ids: &[String]) -> BackendResult<Vec<Track>>;
    fn path_of_track(&self, track_id: &str) -> BackendResult<String>;
}

/// Interface of the remote player server.
pub trait PlaybackBackend: Send + Sync {
    /// Track ids of the playlist, in playback order.
    fn playlist_state(&self) -> BackendResult<Vec<String>>;
    fn add_tracks(&self, entries: &[PlaylistAddEntry]) -> BackendResult<()>;
    fn remove(&self, index: usize) -> BackendResult<()>;
    /// Current playlist position, `None` when nothing is playing.
    fn current(&self) -> BackendResult<Option<usize>>;
    /// Plays the track at `index`, or resumes playback when `None`.
    fn play(&self, index: Option<usize>) -> BackendResult<()>;
    fn pause(&self) -> BackendResult<()>;
    fn next(&self) -> BackendResult<()>;
    fn previous(&self) -> BackendResult<()>;
    fn volume_up(&self) -> BackendResult<()>;
    fn volume_down(&self) -> BackendResult<()>;
}

/// Shared `ureq` agent carrying the per-call timeouts.
pub(crate) fn build_http_agent(http: &HttpConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_millis(http.connect_timeout_ms))
        .timeout_read(Duration::from_millis(http.read_timeout_ms))
        .timeout_write(Duration::from_millis(http.write_timeout_ms))
        .build()
}

pub(crate) fn endpoint_base(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}
