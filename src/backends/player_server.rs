//! Player server adapter implementation.

use log::debug;

use crate::backends::{build_http_agent, endpoint_base, PlaybackBackend};
use crate::config::{HttpConfig, PlayerConfig};
use crate::error::{BackendError, BackendResult};
use crate::model::{CurrentPosition, PlaylistAddEntry, PlaylistState};

const PLAYLIST_STATE: &str = "/playlist/state";
const PLAYLIST_ADD: &str = "/playlist/add";
const PLAYLIST_REMOVE: &str = "/playlist/remove";
const PLAYLIST_CURRENT: &str = "/playlist/current";
const MUSIC_PLAY: &str = "/music/play";
const MUSIC_PAUSE: &str = "/music/pause";
const MUSIC_NEXT: &str = "/music/next";
const MUSIC_PREVIOUS: &str = "/music/previous";
const VOLUME_UP: &str = "/control/volumeUp";
const VOLUME_DOWN: &str = "/control/volumeDown";

/// Player adapter backed by `ureq`.
pub struct PlayerServerAdapter {
    http_client: ureq::Agent,
    base_url: String,
}

impl PlayerServerAdapter {
    pub fn new(player: &PlayerConfig, http: &HttpConfig) -> Self {
        Self {
            http_client: build_http_agent(http),
            base_url: endpoint_base(&player.endpoint),
        }
    }

    fn url(&self, endpoint: &str, query: Option<(&str, usize)>) -> String {
        match query {
            Some((key, value)) => format!("{}{endpoint}?{key}={value}", self.base_url),
            None => format!("{}{endpoint}", self.base_url),
        }
    }

    fn get(&self, endpoint: &str, query: Option<(&str, usize)>) -> BackendResult<ureq::Response> {
        let url = self.url(endpoint, query);
        debug!("PlayerServer: GET {}", url);
        self.http_client
            .get(&url)
            .call()
            .map_err(|err| BackendError::from_ureq(endpoint, err))
    }

    // Transport controls: the response body is not consumed.
    fn fire(&self, endpoint: &str, query: Option<(&str, usize)>) -> BackendResult<()> {
        self.get(endpoint, query).map(|_| ())
    }
}

impl PlaybackBackend for PlayerServerAdapter {
    fn playlist_state(&self) -> BackendResult<Vec<String>> {
        let state: PlaylistState = self
            .get(PLAYLIST_STATE, None)?
            .into_json()
            .map_err(|err| BackendError::decode(PLAYLIST_STATE, err))?;
        Ok(state.ids)
    }

    fn add_tracks(&self, entries: &[PlaylistAddEntry]) -> BackendResult<()> {
        let url = self.url(PLAYLIST_ADD, None);
        debug!("PlayerServer: POST {} ({} tracks)", url, entries.len());
        self.http_client
            .post(&url)
            .send_json(entries)
            .map_err(|err| BackendError::from_ureq(PLAYLIST_ADD, err))?;
        Ok(())
    }

    fn remove(&self, index: usize) -> BackendResult<()> {
        self.fire(PLAYLIST_REMOVE, Some(("index", index)))
    }

    fn current(&self) -> BackendResult<Option<usize>> {
        let position: CurrentPosition = self
            .get(PLAYLIST_CURRENT, None)?
            .into_json()
            .map_err(|err| BackendError::decode(PLAYLIST_CURRENT, err))?;
        Ok(position.position())
    }

    fn play(&self, index: Option<usize>) -> BackendResult<()> {
        self.fire(MUSIC_PLAY, index.map(|index| ("index", index)))
    }

    fn pause(&self) -> BackendResult<()> {
        self.fire(MUSIC_PAUSE, None)
    }

    fn next(&self) -> BackendResult<()> {
        self.fire(MUSIC_NEXT, None)
    }

    fn previous(&self) -> BackendResult<()> {
        self.fire(MUSIC_PREVIOUS, None)
    }

    fn volume_up(&self) -> BackendResult<()> {
        self.fire(VOLUME_UP, None)
    }

    fn volume_down(&self) -> BackendResult<()> {
        self.fire(VOLUME_DOWN, None)
    }
}
