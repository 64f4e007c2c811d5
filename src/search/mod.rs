//! In-memory search over artist and album names plus query routing.
//!
//! Indexes are built once from the catalog listings and never refreshed; a
//! catalog change is only visible after the process restarts.

pub mod intersect;
pub mod name_dictionary;
pub mod router;
pub mod token_index;

use log::{info, warn};

use crate::backends::CatalogBackend;
use crate::error::BackendResult;
use crate::model::{CatalogEntry, Track};

pub use intersect::intersect_sorted;
pub use name_dictionary::NameDictionary;
pub use router::HybridSearchRouter;
pub use token_index::{normalize_words, TokenIndex};

/// Token table and name lookup built from one listing.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    tokens: TokenIndex,
    names: NameDictionary,
}

impl EntityIndex {
    pub fn build(entries: &[CatalogEntry]) -> Self {
        Self {
            tokens: TokenIndex::build(entries),
            names: NameDictionary::build(entries),
        }
    }

    /// Builds from a listing fetch, degrading to an empty index on failure.
    pub fn from_listing(label: &str, listing: BackendResult<Vec<CatalogEntry>>) -> Self {
        match listing {
            Ok(entries) => {
                let index = Self::build(&entries);
                if index.tokens.is_empty() {
                    warn!("SearchCatalog: {} listing is empty, nothing to index", label);
                    return index;
                }
                info!(
                    "SearchCatalog: indexed {} {} names into {} tokens",
                    index.names.len(),
                    label,
                    index.tokens.len()
                );
                index
            }
            Err(err) => {
                warn!(
                    "SearchCatalog: {} listing unavailable, {} search disabled: {}",
                    label, label, err
                );
                Self::default()
            }
        }
    }

    /// Ids whose names contain a word prefixed by every query term.
    ///
    /// Terms are normalized like names; the search stops at the first term
    /// that matches nothing or empties the running intersection.
    pub fn matching_ids(&self, query: &str) -> Vec<String> {
        let terms = normalize_words(query);
        let mut matched: Option<Vec<String>> = None;
        for term in &terms {
            let positions = self.tokens.prefix_search(term);
            if positions.is_empty() {
                return Vec::new();
            }
            let term_ids = self.tokens.ids_at(positions);
            let next = match matched {
                None => term_ids,
                Some(previous) => intersect_sorted(&previous, &term_ids),
            };
            if next.is_empty() {
                return Vec::new();
            }
            matched = Some(next);
        }
        matched.unwrap_or_default()
    }

    /// Multi-term AND search mapped to displayable rows.
    pub fn search(&self, query: &str) -> Vec<Track> {
        self.matching_ids(query)
            .iter()
            .map(|id| Track::named_entity(id, self.names.lookup(id)))
            .collect()
    }
}

/// Artist and album indexes held for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SearchCatalog {
    pub artists: EntityIndex,
    pub albums: EntityIndex,
}

impl SearchCatalog {
    pub fn load(catalog: &dyn CatalogBackend) -> Self {
        Self {
            artists: EntityIndex::from_listing("artist", catalog.list_artists()),
            albums: EntityIndex::from_listing("album", catalog.list_albums()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityIndex;
    use crate::error::BackendError;
    use crate::model::CatalogEntry;

    fn entry(name: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn artists() -> EntityIndex {
        EntityIndex::build(&[
            entry("Jean Michel Jarre", "a1"),
            entry("Jean Gold", "a2"),
            entry("Golden Oak", "a3"),
        ])
    }

    #[test]
    fn test_single_term_returns_whole_posting_list() {
        assert_eq!(artists().matching_ids("jean"), vec!["a1", "a2"]);
    }

    #[test]
    fn test_multi_term_query_intersects_terms() {
        let index = artists();
        assert_eq!(index.matching_ids("jean gold"), vec!["a2"]);
        let rows = index.search("jean gold");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "a2");
        assert_eq!(rows[0].artist, "Jean Gold");
        assert_eq!(rows[0].album, "Jean Gold");
        assert!(rows[0].title.is_empty());
    }

    #[test]
    fn test_term_order_does_not_change_result() {
        let index = artists();
        assert_eq!(index.matching_ids("gold jean"), index.matching_ids("jean gold"));
        assert_eq!(index.matching_ids("oak gol"), index.matching_ids("gol oak"));
    }

    #[test]
    fn test_query_terms_are_normalized() {
        let index = artists();
        assert_eq!(index.matching_ids("JEAN  Gold"), vec!["a2"]);
        assert_eq!(index.matching_ids("jean-michel"), vec!["a1"]);
    }

    #[test]
    fn test_unknown_term_short_circuits_to_empty() {
        let index = artists();
        assert!(index.matching_ids("jean zebra").is_empty());
        assert!(index.matching_ids("michel oak").is_empty());
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(artists().matching_ids("   ").is_empty());
    }

    #[test]
    fn test_empty_listing_builds_empty_index() {
        let index = EntityIndex::from_listing("album", Ok(Vec::new()));
        assert!(index.tokens.is_empty());
        assert!(index.matching_ids("gold").is_empty());
    }

    #[test]
    fn test_failed_listing_degrades_to_empty_index() {
        let index = EntityIndex::from_listing(
            "artist",
            Err(BackendError::Status {
                endpoint: "/listByArtist".to_string(),
                status: 500,
            }),
        );
        assert!(index.tokens.is_empty());
        assert!(index.search("jean").is_empty());
    }
}
