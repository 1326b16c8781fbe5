/*
* Newsdesk Player Module
*
* Cycles a fixed playlist of local promo videos through an external player
* process. "Ended" is the child exiting cleanly; the driver then advances
* the index (wrapping past the last entry) and spawns the next source.
*/

use std::io;
use std::process::{Child, Command, Stdio};

use tracing::{info, warn};

/// Fixed ordered list of video sources with a cyclic cursor.
#[derive(Debug, Clone)]
pub struct Playlist {
    sources: Vec<String>,
    current: usize,
}

impl Playlist {
    pub fn new(sources: Vec<String>) -> Self {
        Self { sources, current: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn current(&self) -> Option<&str> {
        self.sources.get(self.current).map(String::as_str)
    }

    /// Step to the next source, wrapping to the start past the last entry.
    pub fn advance(&mut self) -> Option<&str> {
        if self.sources.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.sources.len();
        self.current()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// 1-based `(position, total)` for the status line.
    pub fn position(&self) -> (usize, usize) {
        (self.current + 1, self.sources.len())
    }
}

/// Drives playback by handing each source to an external player command and
/// watching for the child to finish. Polled from the TUI tick.
pub struct VideoPlayer {
    playlist: Playlist,
    command: String,
    child: Option<Child>,
    enabled: bool,
}

impl VideoPlayer {
    pub fn new(sources: Vec<String>, command: impl Into<String>) -> Self {
        Self {
            playlist: Playlist::new(sources),
            command: command.into(),
            child: None,
            enabled: false,
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Whether a playback session is active.
    pub fn is_active(&self) -> bool {
        self.enabled && self.child.is_some()
    }

    /// Begin playback at the current index. A player that cannot be spawned
    /// disables the playlist for the session instead of erroring the app.
    pub fn start(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.enabled = true;
        self.spawn_current();
    }

    /// Check for end-of-playback. Returns the newly started source when the
    /// playlist advanced this tick.
    pub fn poll(&mut self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let finished = match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        warn!(%status, "player exited with an error, stopping playlist");
                        self.enabled = false;
                        self.child = None;
                        return None;
                    }
                    true
                }
                Ok(None) => false,
                Err(err) => {
                    warn!(%err, "could not poll player process");
                    false
                }
            },
            None => return None,
        };
        if !finished {
            return None;
        }
        self.child = None;
        let next = self.playlist.advance()?.to_string();
        self.spawn_current();
        if self.is_active() {
            Some(next)
        } else {
            None
        }
    }

    /// Kill any running player, e.g. when the dashboard exits.
    pub fn stop(&mut self) {
        self.enabled = false;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn spawn_current(&mut self) {
        let source = match self.playlist.current() {
            Some(source) => source.to_string(),
            None => {
                self.enabled = false;
                return;
            }
        };
        match spawn_player(&self.command, &source) {
            Ok(child) => {
                info!(source = %source, "playing video");
                self.child = Some(child);
            }
            Err(err) => {
                warn!(%err, command = %self.command, "could not start video player, disabling playlist");
                self.enabled = false;
                self.child = None;
            }
        }
    }
}

fn spawn_player(command: &str, source: &str) -> io::Result<Child> {
    Command::new(command)
        .arg(source)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}
