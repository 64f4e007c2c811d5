//! Payloads exchanged with the catalog and player servers, plus the result rows shown to users.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Entity type represented by a set of result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Song,
    Artist,
    Album,
}

/// Track metadata as served by the catalog server.
///
/// `path` stays empty until the path of the track has been resolved through
/// `/pathOfMusic`; it is only needed when submitting to the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub path: String,
}

impl Track {
    /// Placeholder row for an id the catalog did not describe.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Row describing an artist or album hit; both name columns carry the display name.
    pub fn named_entity(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            artist: name.to_string(),
            album: name.to_string(),
            path: String::new(),
        }
    }
}

/// Entry of the `/listByArtist` and `/listByOnlyAlbums` listings. `url` is the entity id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackListingInfos {
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub artist: String,
}

/// Track row of an artist or album listing (`/listByArtist?<id>`).
#[derive(Debug, Clone, Deserialize)]
pub struct TrackListingRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub infos: TrackListingInfos,
}

impl From<TrackListingRow> for Track {
    fn from(row: TrackListingRow) -> Self {
        Track {
            id: row.id,
            title: row.name,
            artist: row.infos.artist,
            album: row.infos.album,
            path: String::new(),
        }
    }
}

/// Body of `/playlist/state`: ids in playback order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistState {
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub ids: Vec<String>,
}

/// Body of `/playlist/current`. A negative `current` means nothing is playing.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPosition {
    #[serde(default)]
    pub current: i64,
}

impl CurrentPosition {
    pub fn position(&self) -> Option<usize> {
        usize::try_from(self.current).ok()
    }
}

/// One element of the JSON array posted to `/playlist/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistAddEntry {
    pub id: String,
    pub path: String,
}

impl From<&Track> for PlaylistAddEntry {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            path: track.path.clone(),
        }
    }
}

/// Rows produced by a routed query, tagged with what they represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub kind: Kind,
    pub items: Vec<Track>,
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

// Servers emit ids either as JSON numbers or strings; both become opaque strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected string or number id, got {value}")))
}

fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // An empty playlist may be encoded as `null`.
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    values
        .iter()
        .map(|value| {
            id_from_value(value).ok_or_else(|| {
                serde::de::Error::custom(format!("expected string or number id, got {value}"))
            })
        })
        .collect()
}
