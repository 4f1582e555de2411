use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::config::AudioSettings;

use super::sink::create_sink;
use super::types::{AudioCmd, BackendEvent, Ticket};

/// The request currently loaded, kept so `Replay` can rebuild it.
#[derive(Debug, Clone)]
struct Request {
    ticket: Ticket,
    path: PathBuf,
    start: Duration,
    duration: Option<Duration>,
}

struct Playback {
    sink: Option<Sink>,
    paused: bool,
    current: Option<Request>,
}

impl Playback {
    fn start(
        &mut self,
        stream: &OutputStream,
        request: Request,
        settings: &AudioSettings,
        events: &Sender<BackendEvent>,
    ) {
        let new_sink = match create_sink(stream, &request.path, request.start, request.duration) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("{e}");
                self.stop();
                self.current = Some(request.clone());
                let _ = events.send(BackendEvent::CannotLoadFile(request.ticket));
                return;
            }
        };
        // Keep the default volume sane even if crossfade is disabled.
        new_sink.set_volume(1.0);

        // Crossfade if currently playing a sink; otherwise just swap.
        if let Some(old_sink) = self.sink.take() {
            if !self.paused && settings.crossfade_ms > 0 && !old_sink.empty() {
                let steps = settings.crossfade_steps.max(1);
                old_sink.set_volume(1.0);
                new_sink.set_volume(0.0);
                new_sink.play();

                // Fade volumes in a short blocking loop; audio continues in
                // rodio's mixer thread.
                for step in 1..=steps {
                    let t = (step as f32) / (steps as f32);
                    old_sink.set_volume(1.0 - t);
                    new_sink.set_volume(t);
                    thread::sleep(Duration::from_millis((settings.crossfade_ms / steps).max(1)));
                }
            }
            old_sink.stop();
        }

        new_sink.play();
        self.sink = Some(new_sink);
        self.paused = false;
        self.current = Some(request);
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.paused = true;
    }

    fn toggle_pause(&mut self) {
        if let Some(ref s) = self.sink {
            if self.paused {
                s.play();
            } else {
                s.pause();
            }
            self.paused = !self.paused;
        }
    }

    /// Report the end of the current request once its sink drained.
    fn poll_finished(&mut self, events: &Sender<BackendEvent>) {
        let drained = !self.paused && self.sink.as_ref().is_some_and(|s| s.empty());
        if !drained {
            return;
        }
        self.sink = None;
        if let Some(req) = &self.current {
            let _ = events.send(BackendEvent::Finished(req.ticket));
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

/// Spawn the thread owning the output stream.
///
/// `ready` receives `Err` with a description when no output device could be
/// opened; the thread then exits.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<BackendEvent>,
    ready: Sender<Result<(), String>>,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; too noisy next to
        // the status line.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut playback = Playback {
            sink: None,
            paused: true,
            current: None,
        };

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(AudioCmd::PlayFile { ticket, path }) => {
                    let request = Request {
                        ticket,
                        path,
                        start: Duration::ZERO,
                        duration: None,
                    };
                    playback.start(&stream, request, &settings, &events);
                }
                Ok(AudioCmd::PlaySection {
                    ticket,
                    path,
                    start,
                    duration,
                }) => {
                    let request = Request {
                        ticket,
                        path,
                        start,
                        duration,
                    };
                    playback.start(&stream, request, &settings, &events);
                }
                Ok(AudioCmd::Replay(ticket)) => match playback.current.clone() {
                    Some(mut request) => {
                        request.ticket = ticket;
                        playback.start(&stream, request, &settings, &events);
                    }
                    None => log::debug!("replay requested with nothing loaded"),
                },
                Ok(AudioCmd::Stop) => playback.stop(),
                Ok(AudioCmd::TogglePause) => playback.toggle_pause(),
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    if let Some(ref s) = playback.sink {
                        // Fade out gently before stopping.
                        fade_out_sink(s, fade_out_ms);
                        s.stop();
                    }
                    break;
                }
                Err(RecvTimeoutError::Timeout) => playback.poll_finished(&events),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
