//! Dispatches a raw query to the artist index, the album index, or remote song search.

use std::sync::Arc;

use log::{debug, warn};

use crate::backends::CatalogBackend;
use crate::model::{Kind, SearchResults};
use crate::search::SearchCatalog;

const ARTIST_PREFIX: &str = ":artist ";
const ALBUM_PREFIX: &str = ":album ";

/// Classified query. Only the two exact command prefixes are recognized;
/// everything else is a literal song query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRoute<'a> {
    Artist(&'a str),
    Album(&'a str),
    Song(&'a str),
}

impl<'a> QueryRoute<'a> {
    pub fn classify(raw_query: &'a str) -> Self {
        if let Some(rest) = raw_query.strip_prefix(ARTIST_PREFIX) {
            return Self::Artist(rest);
        }
        if let Some(rest) = raw_query.strip_prefix(ALBUM_PREFIX) {
            return Self::Album(rest);
        }
        Self::Song(raw_query)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Artist(_) => Kind::Artist,
            Self::Album(_) => Kind::Album,
            Self::Song(_) => Kind::Song,
        }
    }
}

pub struct HybridSearchRouter {
    indexes: SearchCatalog,
    catalog: Arc<dyn CatalogBackend>,
}

impl HybridSearchRouter {
    pub fn new(indexes: SearchCatalog, catalog: Arc<dyn CatalogBackend>) -> Self {
        Self { indexes, catalog }
    }

    /// Loads both indexes from `catalog` and wraps them in a router.
    pub fn load(catalog: Arc<dyn CatalogBackend>) -> Self {
        let indexes = SearchCatalog::load(catalog.as_ref());
        Self::new(indexes, catalog)
    }

    pub fn route(&self, raw_query: &str) -> SearchResults {
        let route = QueryRoute::classify(raw_query);
        debug!("HybridSearchRouter: {:?}", route);
        let kind = route.kind();
        let items = match route {
            QueryRoute::Artist(text) => self.indexes.artists.search(text),
            QueryRoute::Album(text) => self.indexes.albums.search(text),
            QueryRoute::Song(text) => match self.catalog.search_tracks(text) {
                Ok(tracks) => tracks,
                Err(err) => {
                    warn!("HybridSearchRouter: song search failed: {}", err);
                    Vec::new()
                }
            },
        };
        SearchResults { kind, items }
    }
}
