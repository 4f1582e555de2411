//! Playback backend boundary and the rodio-backed implementation.
//!
//! [`Backend`] is what the navigator talks to. [`AudioPlayer`] implements it by
//! forwarding requests to a dedicated audio thread, which reports outcomes as
//! [`BackendEvent`]s over a channel.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{AudioCmd, Backend, BackendEvent, Ticket};
