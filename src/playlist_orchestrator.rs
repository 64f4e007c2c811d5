//! Playlist operations spanning the catalog server and the player server.
//!
//! The player server owns playlist order and the catalog server owns track
//! metadata. Nothing here caches either: every read fetches the order again
//! and joins it with freshly fetched metadata.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};

use crate::backends::{CatalogBackend, PlaybackBackend};
use crate::error::{BackendError, BackendResult};
use crate::model::{PlaylistAddEntry, Track};

/// What to do with a track whose path lookup failed during a bulk add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPathPolicy {
    /// Submit the track with an empty path so the rest of the batch goes through.
    /// The player receives an entry it cannot play.
    #[default]
    SubmitEmpty,
}

/// Outcome of one path lookup task.
#[derive(Debug)]
struct PathResolution {
    track_id: String,
    result: BackendResult<String>,
}

pub struct PlaylistOrchestrator {
    catalog: Arc<dyn CatalogBackend>,
    player: Arc<dyn PlaybackBackend>,
    unresolved_path_policy: UnresolvedPathPolicy,
}

impl PlaylistOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogBackend>, player: Arc<dyn PlaybackBackend>) -> Self {
        Self {
            catalog,
            player,
            unresolved_path_policy: UnresolvedPathPolicy::default(),
        }
    }

    /// Playlist tracks in the player's order.
    ///
    /// The batch metadata response is unordered, so rows are placed by the id
    /// sequence. Ids missing from the batch keep their slot as placeholders.
    pub fn get_playlist(&self) -> BackendResult<Vec<Track>> {
        let ids = self.player.playlist_state()?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let tracks = self.catalog.tracks_info(&ids)?;
        let tracks_by_id: HashMap<String, Track> = tracks
            .into_iter()
            .map(|track| (track.id.clone(), track))
            .collect();
        // Ids may repeat in a playlist, so rows are cloned out of the map.
        let ordered = ids
            .iter()
            .map(|id| match tracks_by_id.get(id) {
                Some(track) => track.clone(),
                None => {
                    warn!("PlaylistOrchestrator: no metadata for playlist track {}", id);
                    Track::unknown(id)
                }
            })
            .collect();
        Ok(ordered)
    }

    /// Resolves the track path, then adds it. A failed lookup skips the add.
    pub fn add(&self, track: &Track) -> BackendResult<()> {
        let path = self.catalog.path_of_track(&track.id)?;
        self.player.add_tracks(&[PlaylistAddEntry {
            id: track.id.clone(),
            path,
        }])
    }

    /// Resolves missing paths concurrently, waits for every lookup, then
    /// submits the batch in input order with a single call.
    pub fn add_all(&self, mut tracks: Vec<Track>) -> BackendResult<()> {
        if tracks.is_empty() {
            debug!("PlaylistOrchestrator: nothing to add");
            return Ok(());
        }
        let resolutions = self.resolve_paths(&tracks);
        for (track, resolution) in tracks.iter_mut().zip(resolutions) {
            track.path = self.apply_unresolved_path_policy(resolution);
        }
        let entries: Vec<PlaylistAddEntry> = tracks.iter().map(PlaylistAddEntry::from).collect();
        info!("PlaylistOrchestrator: adding {} tracks", entries.len());
        self.player.add_tracks(&entries)
    }

    pub fn show_artist(&self, artist_id: &str) -> BackendResult<Vec<Track>> {
        self.catalog.tracks_by_artist(artist_id)
    }

    pub fn show_album(&self, album_id: &str) -> BackendResult<Vec<Track>> {
        self.catalog.tracks_by_album(album_id)
    }

    pub fn add_all_by_artist(&self, artist_id: &str) -> BackendResult<()> {
        self.add_all(self.catalog.tracks_by_artist(artist_id)?)
    }

    pub fn add_all_by_album(&self, album_id: &str) -> BackendResult<()> {
        self.add_all(self.catalog.tracks_by_album(album_id)?)
    }

    pub fn play(&self, index: usize) -> BackendResult<()> {
        self.player.play(Some(index))
    }

    pub fn resume(&self) -> BackendResult<()> {
        self.player.play(None)
    }

    pub fn pause(&self) -> BackendResult<()> {
        self.player.pause()
    }

    pub fn next(&self) -> BackendResult<()> {
        self.player.next()
    }

    pub fn previous(&self) -> BackendResult<()> {
        self.player.previous()
    }

    pub fn volume_up(&self) -> BackendResult<()> {
        self.player.volume_up()
    }

    pub fn volume_down(&self) -> BackendResult<()> {
        self.player.volume_down()
    }

    pub fn remove(&self, index: usize) -> BackendResult<()> {
        self.player.remove(index)
    }

    pub fn current(&self) -> BackendResult<Option<usize>> {
        self.player.current()
    }

    // One scoped thread per track lacking a path; results come back in input order.
    fn resolve_paths(&self, tracks: &[Track]) -> Vec<PathResolution> {
        let catalog = self.catalog.as_ref();
        thread::scope(|scope| {
            let pending = tracks
                .iter()
                .map(|track| {
                    let lookup = track.path.is_empty().then(|| {
                        let track_id = track.id.clone();
                        thread::Builder::new()
                            .name("path-lookup".to_string())
                            .spawn_scoped(scope, move || catalog.path_of_track(&track_id))
                    });
                    (track, lookup)
                })
                .collect::<Vec<_>>();

            pending
                .into_iter()
                .map(|(track, lookup)| {
                    let result = match lookup {
                        None => Ok(track.path.clone()),
                        Some(Ok(handle)) => handle
                            .join()
                            .unwrap_or_else(|_| Err(path_lookup_failure("worker panicked"))),
                        Some(Err(err)) => Err(path_lookup_failure(&format!(
                            "worker could not start: {}",
                            err
                        ))),
                    };
                    PathResolution {
                        track_id: track.id.clone(),
                        result,
                    }
                })
                .collect()
        })
    }

    fn apply_unresolved_path_policy(&self, resolution: PathResolution) -> String {
        match (resolution.result, self.unresolved_path_policy) {
            (Ok(path), _) => path,
            (Err(err), UnresolvedPathPolicy::SubmitEmpty) => {
                warn!(
                    "PlaylistOrchestrator: submitting track {} without a path: {}",
                    resolution.track_id, err
                );
                String::new()
            }
        }
    }
}

fn path_lookup_failure(message: &str) -> BackendError {
    BackendError::Transport {
        endpoint: "/pathOfMusic".to_string(),
        message: format!("path lookup {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::{path_lookup_failure, PathResolution, PlaylistOrchestrator};
    use crate::backends::{CatalogBackend, PlaybackBackend};
    use crate::error::{BackendError, BackendResult};
    use crate::model::{CatalogEntry, PlaylistAddEntry, Track};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("title-{id}"),
            artist: "artist".to_string(),
            album: "album".to_string(),
            path: String::new(),
        }
    }

    fn status_error(endpoint: &str) -> BackendError {
        BackendError::Status {
            endpoint: endpoint.to_string(),
            status: 500,
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        batch_order: Vec<String>,
        fail_batch: bool,
        failing_paths: HashSet<String>,
        slow_path: Option<(String, Duration)>,
        listing: Vec<Track>,
        resolved_paths: AtomicUsize,
        batch_requests: Mutex<Vec<Vec<String>>>,
    }

    impl CatalogBackend for FakeCatalog {
        fn list_artists(&self) -> BackendResult<Vec<CatalogEntry>> {
            Ok(Vec::new())
        }

        fn list_albums(&self) -> BackendResult<Vec<CatalogEntry>> {
            Ok(Vec::new())
        }

        fn search_tracks(&self, _term: &str) -> BackendResult<Vec<Track>> {
            Ok(Vec::new())
        }

        fn tracks_by_artist(&self, _artist_id: &str) -> BackendResult<Vec<Track>> {
            Ok(self.listing.clone())
        }

        fn tracks_by_album(&self, _album_id: &str) -> BackendResult<Vec<Track>> {
            Ok(self.listing.clone())
        }

        fn tracks_info(&self, ids: &[String]) -> BackendResult<Vec<Track>> {
            self.batch_requests
                .lock()
                .expect("batch requests lock poisoned")
                .push(ids.to_vec());
            if self.fail_batch {
                return Err(status_error("/musicsInfo"));
            }
            Ok(self.batch_order.iter().map(|id| track(id)).collect())
        }

        fn path_of_track(&self, track_id: &str) -> BackendResult<String> {
            if let Some((slow_id, delay)) = &self.slow_path {
                if slow_id == track_id {
                    thread::sleep(*delay);
                }
            }
            let result = if self.failing_paths.contains(track_id) {
                Err(status_error("/pathOfMusic"))
            } else {
                Ok(format!("/music/{track_id}.mp3"))
            };
            self.resolved_paths.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    struct FakePlayer {
        ids: Vec<String>,
        fail_state: bool,
        catalog: Arc<FakeCatalog>,
        submissions: Mutex<Vec<Vec<PlaylistAddEntry>>>,
        resolved_at_submit: Mutex<Vec<usize>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakePlayer {
        fn new(catalog: Arc<FakeCatalog>, ids: &[&str]) -> Self {
            Self {
                ids: ids.iter().map(|id| id.to_string()).collect(),
                fail_state: false,
                catalog,
                submissions: Mutex::new(Vec::new()),
                resolved_at_submit: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) -> BackendResult<()> {
            self.calls.lock().expect("calls lock poisoned").push(call);
            Ok(())
        }

        fn submissions(&self) -> Vec<Vec<PlaylistAddEntry>> {
            self.submissions
                .lock()
                .expect("submissions lock poisoned")
                .clone()
        }
    }

    impl PlaybackBackend for FakePlayer {
        fn playlist_state(&self) -> BackendResult<Vec<String>> {
            if self.fail_state {
                return Err(BackendError::Transport {
                    endpoint: "/playlist/state".to_string(),
                    message: "timed out".to_string(),
                });
            }
            Ok(self.ids.clone())
        }

        fn add_tracks(&self, entries: &[PlaylistAddEntry]) -> BackendResult<()> {
            self.resolved_at_submit
                .lock()
                .expect("resolved lock poisoned")
                .push(self.catalog.resolved_paths.load(Ordering::SeqCst));
            self.submissions
                .lock()
                .expect("submissions lock poisoned")
                .push(entries.to_vec());
            Ok(())
        }

        fn remove(&self, index: usize) -> BackendResult<()> {
            self.record(format!("remove {index}"))
        }

        fn current(&self) -> BackendResult<Option<usize>> {
            Ok(Some(2))
        }

        fn play(&self, index: Option<usize>) -> BackendResult<()> {
            self.record(format!("play {index:?}"))
        }

        fn pause(&self) -> BackendResult<()> {
            self.record("pause".to_string())
        }

        fn next(&self) -> BackendResult<()> {
            self.record("next".to_string())
        }

        fn previous(&self) -> BackendResult<()> {
            self.record("previous".to_string())
        }

        fn volume_up(&self) -> BackendResult<()> {
            self.record("volume_up".to_string())
        }

        fn volume_down(&self) -> BackendResult<()> {
            self.record("volume_down".to_string())
        }
    }

    fn orchestrator(
        catalog: Arc<FakeCatalog>,
        player: Arc<FakePlayer>,
    ) -> PlaylistOrchestrator {
        PlaylistOrchestrator::new(catalog, player)
    }

    #[test]
    fn test_get_playlist_follows_player_order() {
        for batch_order in [["7", "3", "9"], ["9", "7", "3"], ["3", "9", "7"]] {
            let catalog = Arc::new(FakeCatalog {
                batch_order: batch_order.iter().map(|id| id.to_string()).collect(),
                ..FakeCatalog::default()
            });
            let player = Arc::new(FakePlayer::new(catalog.clone(), &["7", "3", "9"]));
            let playlist = orchestrator(catalog.clone(), player)
                .get_playlist()
                .expect("playlist should load");
            let ids: Vec<_> = playlist.iter().map(|track| track.id.as_str()).collect();
            assert_eq!(ids, vec!["7", "3", "9"]);
            assert_eq!(playlist[0].title, "title-7");
        }
    }

    #[test]
    fn test_get_playlist_requests_exact_id_set() {
        let catalog = Arc::new(FakeCatalog {
            batch_order: vec!["3".to_string(), "7".to_string()],
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &["7", "3"]));
        orchestrator(catalog.clone(), player)
            .get_playlist()
            .expect("playlist should load");
        let requests = catalog
            .batch_requests
            .lock()
            .expect("batch requests lock poisoned")
            .clone();
        assert_eq!(requests, vec![vec!["7".to_string(), "3".to_string()]]);
    }

    #[test]
    fn test_get_playlist_keeps_slot_for_missing_metadata() {
        let catalog = Arc::new(FakeCatalog {
            batch_order: vec!["9".to_string(), "7".to_string()],
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &["7", "3", "9", "7"]));
        let playlist = orchestrator(catalog, player)
            .get_playlist()
            .expect("playlist should load");
        let ids: Vec<_> = playlist.iter().map(|track| track.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "3", "9", "7"]);
        assert!(playlist[1].title.is_empty());
        assert_eq!(playlist[3].title, "title-7");
    }

    #[test]
    fn test_get_playlist_fails_when_player_fails() {
        let catalog = Arc::new(FakeCatalog::default());
        let mut player = FakePlayer::new(catalog.clone(), &["1"]);
        player.fail_state = true;
        let result = orchestrator(catalog.clone(), Arc::new(player)).get_playlist();
        assert!(matches!(result, Err(BackendError::Transport { .. })));
        assert!(catalog
            .batch_requests
            .lock()
            .expect("batch requests lock poisoned")
            .is_empty());
    }

    #[test]
    fn test_get_playlist_fails_when_catalog_batch_fails() {
        let catalog = Arc::new(FakeCatalog {
            fail_batch: true,
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &["1", "2"]));
        let result = orchestrator(catalog, player).get_playlist();
        assert!(matches!(result, Err(BackendError::Status { .. })));
    }

    #[test]
    fn test_add_resolves_path_then_submits_single_entry() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        orchestrator(catalog, player.clone())
            .add(&track("42"))
            .expect("add should succeed");
        assert_eq!(
            player.submissions(),
            vec![vec![PlaylistAddEntry {
                id: "42".to_string(),
                path: "/music/42.mp3".to_string(),
            }]]
        );
    }

    #[test]
    fn test_add_skips_submission_when_path_lookup_fails() {
        let catalog = Arc::new(FakeCatalog {
            failing_paths: HashSet::from(["42".to_string()]),
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let result = orchestrator(catalog, player.clone()).add(&track("42"));
        assert!(result.is_err());
        assert!(player.submissions().is_empty());
    }

    #[test]
    fn test_add_all_waits_for_slow_resolver_before_submitting() {
        let catalog = Arc::new(FakeCatalog {
            slow_path: Some(("2".to_string(), Duration::from_millis(200))),
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let tracks = vec![track("1"), track("2"), track("3"), track("4")];
        orchestrator(catalog, player.clone())
            .add_all(tracks)
            .expect("bulk add should succeed");

        let resolved_at_submit = player
            .resolved_at_submit
            .lock()
            .expect("resolved lock poisoned")
            .clone();
        assert_eq!(resolved_at_submit, vec![4]);
        let submissions = player.submissions();
        assert_eq!(submissions.len(), 1);
        let ids: Vec<_> = submissions[0].iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(submissions[0][1].path, "/music/2.mp3");
    }

    #[test]
    fn test_add_all_submits_empty_path_for_failed_lookup() {
        let catalog = Arc::new(FakeCatalog {
            failing_paths: HashSet::from(["2".to_string()]),
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        orchestrator(catalog, player.clone())
            .add_all(vec![track("1"), track("2"), track("3")])
            .expect("bulk add should succeed despite one failed lookup");
        let submissions = player.submissions();
        let paths: Vec<_> = submissions[0].iter().map(|entry| entry.path.as_str()).collect();
        assert_eq!(paths, vec!["/music/1.mp3", "", "/music/3.mp3"]);
    }

    #[test]
    fn test_add_all_keeps_already_resolved_paths() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let mut known = track("1");
        known.path = "/cache/1.flac".to_string();
        orchestrator(catalog.clone(), player.clone())
            .add_all(vec![known, track("2")])
            .expect("bulk add should succeed");
        assert_eq!(catalog.resolved_paths.load(Ordering::SeqCst), 1);
        let paths: Vec<_> = player.submissions()[0]
            .iter()
            .map(|entry| entry.path.clone())
            .collect();
        assert_eq!(paths, vec!["/cache/1.flac", "/music/2.mp3"]);
    }

    #[test]
    fn test_add_all_with_no_tracks_submits_nothing() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        orchestrator(catalog, player.clone())
            .add_all(Vec::new())
            .expect("empty bulk add should succeed");
        assert!(player.submissions().is_empty());
    }

    #[test]
    fn test_unstarted_lookup_worker_submits_empty_path() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let spawn_err = std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left");
        let resolution = PathResolution {
            track_id: "5".to_string(),
            result: Err(path_lookup_failure(&format!("worker could not start: {}", spawn_err))),
        };
        let path = orchestrator(catalog, player).apply_unresolved_path_policy(resolution);
        assert!(path.is_empty());
    }

    #[test]
    fn test_get_playlist_skips_batch_call_for_empty_playlist() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let playlist = orchestrator(catalog.clone(), player)
            .get_playlist()
            .expect("empty playlist should load");
        assert!(playlist.is_empty());
        assert!(catalog
            .batch_requests
            .lock()
            .expect("batch requests lock poisoned")
            .is_empty());
    }

    #[test]
    fn test_add_all_by_artist_uses_catalog_listing() {
        let catalog = Arc::new(FakeCatalog {
            listing: vec![track("10"), track("11")],
            ..FakeCatalog::default()
        });
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        orchestrator(catalog, player.clone())
            .add_all_by_artist("a1")
            .expect("artist bulk add should succeed");
        let ids: Vec<_> = player.submissions()[0]
            .iter()
            .map(|entry| entry.id.clone())
            .collect();
        assert_eq!(ids, vec!["10", "11"]);
    }

    #[test]
    fn test_transport_controls_forward_to_player() {
        let catalog = Arc::new(FakeCatalog::default());
        let player = Arc::new(FakePlayer::new(catalog.clone(), &[]));
        let orchestrator = orchestrator(catalog, player.clone());
        orchestrator.play(3).expect("play should succeed");
        orchestrator.resume().expect("resume should succeed");
        orchestrator.pause().expect("pause should succeed");
        orchestrator.next().expect("next should succeed");
        orchestrator.previous().expect("previous should succeed");
        orchestrator.volume_up().expect("volume up should succeed");
        orchestrator.volume_down().expect("volume down should succeed");
        orchestrator.remove(1).expect("remove should succeed");
        assert_eq!(orchestrator.current().expect("current should succeed"), Some(2));
        let calls = player.calls.lock().expect("calls lock poisoned").clone();
        assert_eq!(
            calls,
            vec![
                "play Some(3)",
                "play None",
                "pause",
                "next",
                "previous",
                "volume_up",
                "volume_down",
                "remove 1",
            ]
        );
    }
}
