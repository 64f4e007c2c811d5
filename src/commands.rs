//! Executes parsed commands against the remote servers and renders their output.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::backends::{CatalogBackend, PlaybackBackend};
use crate::cli::{Cli, Command, EntityScope, VolumeDirection};
use crate::config::Config;
use crate::model::{Kind, SearchResults, Track};
use crate::now_playing::{NowPlayingWatcher, PlayerEvent};
use crate::playlist_orchestrator::PlaylistOrchestrator;
use crate::search::HybridSearchRouter;

const NOTHING_PLAYING: &str = "Nothing playing";

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Remote collaborators and settings shared by every command.
pub struct Session {
    pub config: Config,
    pub catalog: Arc<dyn CatalogBackend>,
    pub player: Arc<dyn PlaybackBackend>,
    pub orchestrator: PlaylistOrchestrator,
}

impl Session {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogBackend>,
        player: Arc<dyn PlaybackBackend>,
    ) -> Self {
        let orchestrator = PlaylistOrchestrator::new(Arc::clone(&catalog), Arc::clone(&player));
        Self {
            config,
            catalog,
            player,
            orchestrator,
        }
    }
}

/// Playlist row as shown to users: 1-based position, title, artist.
pub fn format_playlist_row(position: usize, track: &Track) -> String {
    format!("{} - {} - {}", position + 1, track.title, track.artist)
}

pub fn format_track_row(track: &Track) -> String {
    format!("[{}] {} - {} ({})", track.id, track.title, track.artist, track.album)
}

pub fn render_search_results(results: &SearchResults) -> Vec<String> {
    results
        .items
        .iter()
        .map(|item| match results.kind {
            Kind::Song => format_track_row(item),
            Kind::Artist => format!("[{}] {}", item.id, item.artist),
            Kind::Album => format!("[{}] {}", item.id, item.album),
        })
        .collect()
}

pub fn render_playlist(tracks: &[Track], current: Option<usize>) -> Vec<String> {
    tracks
        .iter()
        .enumerate()
        .map(|(position, track)| {
            let marker = if current == Some(position) { ">" } else { " " };
            format!("{} {}", marker, format_playlist_row(position, track))
        })
        .collect()
}

/// Converts a 1-based playlist position into the player's 0-based play index.
pub fn play_index_from_position(position: usize) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| "playlist positions start at 1".to_string())
}

fn write_lines(out: &mut dyn Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn run_command(session: &Session, command: &Command, out: &mut dyn Write) -> CommandResult {
    let orchestrator = &session.orchestrator;
    match command {
        Command::Search { query } => {
            let router = HybridSearchRouter::load(Arc::clone(&session.catalog));
            let results = router.route(&Cli::query_text(query));
            if results.items.is_empty() {
                writeln!(out, "No results")?;
            }
            write_lines(out, &render_search_results(&results))?;
        }
        Command::Show { scope, id } => {
            let tracks = match scope {
                EntityScope::Artist => orchestrator.show_artist(id)?,
                EntityScope::Album => orchestrator.show_album(id)?,
            };
            let lines: Vec<String> = tracks.iter().map(format_track_row).collect();
            write_lines(out, &lines)?;
        }
        Command::Add { track_id } => {
            orchestrator.add(&Track::unknown(track_id))?;
            info!("Added track {}", track_id);
        }
        Command::AddAll { scope, id } => {
            match scope {
                EntityScope::Artist => orchestrator.add_all_by_artist(id)?,
                EntityScope::Album => orchestrator.add_all_by_album(id)?,
            }
            info!("Added all tracks of {:?} {}", scope, id);
        }
        Command::Playlist => {
            let tracks = orchestrator.get_playlist()?;
            let current = orchestrator.current();
            if let Err(err) = &current {
                warn!("Current position unavailable: {}", err);
            }
            let position = current.as_ref().ok().copied().flatten();
            write_lines(out, &render_playlist(&tracks, position))?;
            if matches!(current, Ok(None)) {
                writeln!(out, "{}", NOTHING_PLAYING)?;
            }
        }
        Command::Current => match orchestrator.current()? {
            Some(current) => writeln!(out, "{}", current + 1)?,
            None => writeln!(out, "{}", NOTHING_PLAYING)?,
        },
        Command::Play { position } => match position {
            Some(position) => orchestrator.play(play_index_from_position(*position)?)?,
            None => orchestrator.resume()?,
        },
        Command::Pause => orchestrator.pause()?,
        Command::Resume => orchestrator.resume()?,
        Command::Next => orchestrator.next()?,
        Command::Previous => orchestrator.previous()?,
        Command::Volume { direction } => match direction {
            VolumeDirection::Up => orchestrator.volume_up()?,
            VolumeDirection::Down => orchestrator.volume_down()?,
        },
        // The player's remove endpoint counts from 1, unlike play.
        Command::Remove { position } => orchestrator.remove(*position)?,
        Command::Watch => watch(session, out)?,
        Command::Configure => {
            return Err("configure is handled before connecting to the servers".into());
        }
    }
    Ok(())
}

fn watch(session: &Session, out: &mut dyn Write) -> CommandResult {
    let mut tracks = session.orchestrator.get_playlist()?;
    write_lines(out, &render_playlist(&tracks, None))?;

    let (bus_sender, mut bus_receiver) = broadcast::channel(64);
    let poll_interval = Duration::from_secs(session.config.watch.poll_interval_secs);
    let _watcher = NowPlayingWatcher::spawn(Arc::clone(&session.player), poll_interval, bus_sender)?;
    loop {
        match bus_receiver.blocking_recv() {
            Ok(PlayerEvent::CurrentChanged(None)) => {
                writeln!(out, "{}", NOTHING_PLAYING)?;
                out.flush()?;
            }
            Ok(PlayerEvent::CurrentChanged(Some(position))) => {
                if position >= tracks.len() {
                    tracks = session.orchestrator.get_playlist()?;
                }
                match tracks.get(position) {
                    Some(track) => writeln!(out, "Now playing: {}", format_playlist_row(position, track))?,
                    None => writeln!(out, "Now playing: position {}", position + 1)?,
                }
                out.flush()?;
            }
            Ok(PlayerEvent::PollFailed(message)) => {
                warn!("Current position poll failed: {}", message);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Watcher lagged behind by {} events", skipped);
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
