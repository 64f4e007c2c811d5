//! Catalog server adapter implementation.

use log::debug;
use serde::de::DeserializeOwned;

use crate::backends::{build_http_agent, endpoint_base, CatalogBackend};
use crate::config::{CatalogConfig, HttpConfig};
use crate::error::{BackendError, BackendResult};
use crate::model::{CatalogEntry, Track, TrackListingRow};

const LIST_BY_ARTIST: &str = "/listByArtist";
const LIST_BY_ALBUM: &str = "/listByOnlyAlbums";
const SEARCH: &str = "/search";
const MUSICS_INFO: &str = "/musicsInfo";
const PATH_OF_MUSIC: &str = "/pathOfMusic";

/// Catalog adapter backed by `ureq`.
pub struct CatalogServerAdapter {
    http_client: ureq::Agent,
    base_url: String,
    search_page_size: usize,
}

impl CatalogServerAdapter {
    pub fn new(catalog: &CatalogConfig, http: &HttpConfig) -> Self {
        Self {
            http_client: build_http_agent(http),
            base_url: endpoint_base(&catalog.endpoint),
            search_page_size: catalog.search_page_size,
        }
    }

    fn search_url(&self, term: &str) -> String {
        format!(
            "{}{SEARCH}?term={}&size={}",
            self.base_url,
            urlencoding::encode(term),
            self.search_page_size
        )
    }

    // Listing ids are already query fragments and are appended verbatim.
    fn listing_url(&self, route: &str, entity_id: &str) -> String {
        format!("{}{route}?{entity_id}", self.base_url)
    }

    fn tracks_info_url(&self, ids: &[String]) -> String {
        format!("{}{MUSICS_INFO}?ids=[{}]", self.base_url, ids.join(","))
    }

    fn path_url(&self, track_id: &str) -> String {
        format!(
            "{}{PATH_OF_MUSIC}?id={}",
            self.base_url,
            urlencoding::encode(track_id)
        )
    }

    fn get(&self, endpoint: &str, url: &str) -> BackendResult<ureq::Response> {
        debug!("CatalogServer: GET {}", url);
        self.http_client
            .get(url)
            .call()
            .map_err(|err| BackendError::from_ureq(endpoint, err))
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, url: &str) -> BackendResult<T> {
        self.get(endpoint, url)?
            .into_json::<T>()
            .map_err(|err| BackendError::decode(endpoint, err))
    }

    fn fetch_listing_tracks(&self, route: &str, entity_id: &str) -> BackendResult<Vec<Track>> {
        let rows: Vec<TrackListingRow> = self.get_json(route, &self.listing_url(route, entity_id))?;
        Ok(rows.into_iter().map(Track::from).collect())
    }
}

impl CatalogBackend for CatalogServerAdapter {
    fn list_artists(&self) -> BackendResult<Vec<CatalogEntry>> {
        self.get_json(LIST_BY_ARTIST, &format!("{}{LIST_BY_ARTIST}", self.base_url))
    }

    fn list_albums(&self) -> BackendResult<Vec<CatalogEntry>> {
        self.get_json(LIST_BY_ALBUM, &format!("{}{LIST_BY_ALBUM}", self.base_url))
    }

    fn search_tracks(&self, term: &str) -> BackendResult<Vec<Track>> {
        self.get_json(SEARCH, &self.search_url(term))
    }

    fn tracks_by_artist(&self, artist_id: &str) -> BackendResult<Vec<Track>> {
        self.fetch_listing_tracks(LIST_BY_ARTIST, artist_id)
    }

    fn tracks_by_album(&self, album_id: &str) -> BackendResult<Vec<Track>> {
        self.fetch_listing_tracks(LIST_BY_ALBUM, album_id)
    }

    fn tracks_info(&self, ids: &[String]) -> BackendResult<Vec<Track>> {
        self.get_json(MUSICS_INFO, &self.tracks_info_url(ids))
    }

    fn path_of_track(&self, track_id: &str) -> BackendResult<String> {
        self.get(PATH_OF_MUSIC, &self.path_url(track_id))?
            .into_string()
            .map_err(|err| BackendError::decode(PATH_OF_MUSIC, err))
    }
}
