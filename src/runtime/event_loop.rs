use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};

use crate::audio::Ticket;
use crate::config;
use crate::library::TrackInfo;
use crate::nav::Notification;

use super::startup::Session;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Cursor row in the browsed view.
    pub cursor: usize,
    pub now_playing: Option<TrackInfo>,
    pub paused: bool,
    /// True while keys edit the filter query.
    pub filter_mode: bool,
    /// Last error worth showing, cleared by the next key.
    pub message: Option<String>,
}

impl EventLoopState {
    /// Apply navigator notifications in order.
    ///
    /// Returns `true` when the playing entry was reset and nothing new was
    /// requested, i.e. the output has to be silenced.
    fn apply_all(
        &mut self,
        notes: impl IntoIterator<Item = Notification>,
        pending: Option<Ticket>,
    ) -> bool {
        let mut reset = false;
        for note in notes {
            match note {
                Notification::NowPlaying(info) => {
                    self.now_playing = Some(info);
                    self.paused = false;
                    reset = false;
                }
                Notification::Reset => {
                    self.now_playing = None;
                    self.paused = false;
                    reset = true;
                }
                Notification::LoopModeChanged(mode) => {
                    log::debug!("loop mode is now {}", mode.label());
                }
            }
        }
        reset && pending.is_none()
    }

    /// Flip the paused flag; `false` when nothing is loaded to pause.
    fn toggle_pause(&mut self) -> bool {
        if self.now_playing.is_none() {
            return false;
        }
        self.paused = !self.paused;
        true
    }
}

/// Main terminal loop: feeds keys and backend outcomes to the navigator and
/// redraws the status line. Returns `Ok(())` when shutdown is requested.
pub fn run(
    out: &mut impl Write,
    settings: &config::Settings,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::default();

    loop {
        while let Ok(ev) = session.events.try_recv() {
            session.navigator.handle_backend_event(ev);
        }
        let pending = session.navigator.pending_ticket();
        if state.apply_all(session.notes.try_iter(), pending) {
            session.player.stop();
        }

        let count = session.view.row_count();
        state.cursor = state.cursor.min(count.saturating_sub(1));
        draw_status(out, session, &state)?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, session, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    session: &mut Session,
    state: &mut EventLoopState,
) -> bool {
    state.message = None;
    let view = &session.view;

    if state.filter_mode {
        match key.code {
            KeyCode::Esc => {
                view.set_filter("");
                state.filter_mode = false;
            }
            KeyCode::Enter => state.filter_mode = false,
            KeyCode::Backspace => {
                let mut query = view.filter();
                query.pop();
                view.set_filter(&query);
            }
            KeyCode::Char(c) if !c.is_control() => {
                let mut query = view.filter();
                query.push(c);
                view.set_filter(&query);
                state.cursor = 0;
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return quit(settings, session),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return quit(settings, session);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if state.cursor + 1 < view.row_count() {
                state.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => state.cursor = state.cursor.saturating_sub(1),
        KeyCode::Char('g') => state.cursor = 0,
        KeyCode::Char('G') => state.cursor = view.row_count().saturating_sub(1),
        KeyCode::Char('/') => state.filter_mode = true,
        KeyCode::Char('s') => view.set_sort(view.sort_key().next(), view.is_descending()),
        KeyCode::Char('S') => view.set_sort(view.sort_key(), !view.is_descending()),
        KeyCode::Char('r') => session.navigator.cycle_loop_mode(),
        KeyCode::Char('n') | KeyCode::Char('l') => session.navigator.play_next(),
        KeyCode::Char('p') | KeyCode::Char('h') => session.navigator.play_previous(),
        KeyCode::Char(' ') => {
            if state.toggle_pause() {
                session.player.toggle_pause();
            }
        }
        KeyCode::Enter => {
            let played = session
                .navigator
                .set_playing_view(Some(&**view))
                .and_then(|()| session.navigator.play_row(state.cursor));
            if let Err(e) = played {
                state.message = Some(e.to_string());
            }
        }
        _ => {}
    }

    false
}

fn quit(settings: &config::Settings, session: &mut Session) -> bool {
    if let Err(e) = session.navigator.save_state() {
        log::warn!("failed to save loop state: {e}");
    }
    session
        .player
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    true
}

fn draw_status(
    out: &mut impl Write,
    session: &Session,
    state: &EventLoopState,
) -> io::Result<()> {
    let view = &session.view;
    let count = view.row_count();

    let playing = match (&state.now_playing, state.paused) {
        (Some(info), true) => format!("paused: {}", info.title),
        (Some(info), false) => format!("playing: {}", info.title),
        (None, _) => "stopped".to_string(),
    };
    let cursor = match view.track(state.cursor) {
        Some(track) => format!("{}/{} {}", state.cursor + 1, count, track.display),
        None => format!("0/{count}"),
    };
    let arrow = if view.is_descending() { "v" } else { "^" };
    let filter = if state.filter_mode {
        format!(" | /{}_", view.filter())
    } else if view.filter().is_empty() {
        String::new()
    } else {
        format!(" | /{}", view.filter())
    };

    let mut line = format!(
        "{} [{}] {} | {} | sort: {} {}{}",
        view.collection().borrow().name(),
        session.navigator.loop_mode().label(),
        playing,
        cursor,
        view.sort_key().label(),
        arrow,
        filter,
    );
    if let Some(msg) = &state.message {
        line.push_str(" | ");
        line.push_str(msg);
    }

    let width = terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
    let line: String = line.chars().take(width.saturating_sub(1)).collect();

    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(line)
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn info(title: &str) -> TrackInfo {
        TrackInfo {
            path: PathBuf::from(format!("/music/{title}.mp3")),
            title: title.to_string(),
            artist: None,
            album: None,
            start: None,
            duration: None,
            play_count: 0,
        }
    }

    #[test]
    fn reset_without_a_new_request_stops_the_output() {
        let mut state = EventLoopState::default();
        state.apply_all([Notification::NowPlaying(info("a"))], Some(Ticket(1)));

        assert!(state.apply_all([Notification::Reset], None));
        assert!(state.now_playing.is_none());
    }

    #[test]
    fn reset_before_the_next_row_keeps_the_output() {
        let mut state = EventLoopState::default();
        let notes = [Notification::Reset, Notification::NowPlaying(info("b"))];

        assert!(!state.apply_all(notes, Some(Ticket(2))));
        assert_eq!(state.now_playing.as_ref().map(|i| i.title.as_str()), Some("b"));
    }

    #[test]
    fn reset_followed_by_loop_change_still_stops() {
        let mut state = EventLoopState::default();
        let notes = [
            Notification::Reset,
            Notification::LoopModeChanged(crate::nav::LoopMode::RepeatAll),
        ];
        assert!(state.apply_all(notes, None));
        assert!(!state.apply_all(std::iter::empty(), None));
    }

    #[test]
    fn pause_toggles_only_with_something_loaded() {
        let mut state = EventLoopState::default();
        assert!(!state.toggle_pause());
        assert!(!state.paused);

        state.apply_all([Notification::NowPlaying(info("a"))], Some(Ticket(1)));
        assert!(state.toggle_pause());
        assert!(state.paused);

        state.apply_all([Notification::Reset], None);
        assert!(!state.paused);
        assert!(!state.toggle_pause());
    }
}
