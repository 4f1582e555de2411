use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AudioSettings;
use crate::error::{Error, Result};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, Backend, BackendEvent, Ticket};

/// Handle to the audio thread. Clones talk to the same thread.
#[derive(Clone)]
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    join: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AudioPlayer {
    /// Open the default output device on a dedicated thread.
    ///
    /// Returns the player and the receiver on which play outcomes arrive.
    pub fn new(settings: AudioSettings) -> Result<(Self, Receiver<BackendEvent>)> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = mpsc::channel::<BackendEvent>();
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), String>>();

        let handle = spawn_audio_thread(rx, events_tx, ready_tx, settings);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(reason)) => return Err(Error::AudioOutput(reason)),
            Err(_) => return Err(Error::AudioOutput("audio thread exited".into())),
        }

        let player = Self {
            tx,
            join: Arc::new(Mutex::new(Some(handle))),
        };
        Ok((player, events_rx))
    }

    pub fn send(&self, cmd: AudioCmd) -> std::result::Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    pub fn toggle_pause(&self) {
        let _ = self.send(AudioCmd::TogglePause);
    }

    pub fn stop(&self) {
        let _ = self.send(AudioCmd::Stop);
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Backend for AudioPlayer {
    fn play_file(&mut self, ticket: Ticket, path: &Path) {
        let _ = self.send(AudioCmd::PlayFile {
            ticket,
            path: path.to_path_buf(),
        });
    }

    fn play_section(
        &mut self,
        ticket: Ticket,
        path: &Path,
        start: Duration,
        duration: Option<Duration>,
    ) {
        let _ = self.send(AudioCmd::PlaySection {
            ticket,
            path: path.to_path_buf(),
            start,
            duration,
        });
    }

    fn play(&mut self, ticket: Ticket) {
        let _ = self.send(AudioCmd::Replay(ticket));
    }
}
