//! Background poller publishing the player's current position on an event bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::broadcast;

use crate::backends::PlaybackBackend;

/// Events published by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Current playlist position changed (or was observed for the first time).
    /// `None` means the player went idle.
    CurrentChanged(Option<usize>),
    PollFailed(String),
}

/// Handle to the polling thread. Dropping it stops polling after the current tick.
pub struct NowPlayingWatcher {
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl NowPlayingWatcher {
    /// Starts polling; events go to every receiver subscribed to `bus_sender`.
    pub fn spawn(
        player: Arc<dyn PlaybackBackend>,
        poll_interval: Duration,
        bus_sender: broadcast::Sender<PlayerEvent>,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);
        let worker = thread::Builder::new()
            .name("now-playing".to_string())
            .spawn(move || poll_loop(player, poll_interval, bus_sender, worker_running))?;
        Ok(Self {
            running,
            worker: Some(worker),
        })
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("NowPlayingWatcher: poller thread panicked");
            }
        }
    }
}

impl Drop for NowPlayingWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(
    player: Arc<dyn PlaybackBackend>,
    poll_interval: Duration,
    bus_sender: broadcast::Sender<PlayerEvent>,
    running: Arc<AtomicBool>,
) {
    let mut last_position = None;
    while running.load(Ordering::SeqCst) {
        match player.current() {
            Ok(position) if last_position != Some(position) => {
                debug!("NowPlayingWatcher: current position {:?}", position);
                last_position = Some(position);
                let _ = bus_sender.send(PlayerEvent::CurrentChanged(position));
            }
            Ok(_) => {}
            Err(err) => {
                let _ = bus_sender.send(PlayerEvent::PollFailed(err.to_string()));
            }
        }
        sleep_while_running(poll_interval, &running);
    }
}

// Sleeps in short slices so `stop()` does not wait a full interval.
fn sleep_while_running(total: Duration, running: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(50);
    let mut remaining = total;
    while !remaining.is_zero() && running.load(Ordering::SeqCst) {
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
}
