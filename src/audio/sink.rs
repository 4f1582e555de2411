//! Utilities for creating `rodio` sinks from play requests.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` limited to the requested section.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::{Error, Result};

/// Create a paused `Sink` playing `path` from `start`, for at most `duration`.
pub(super) fn create_sink(
    handle: &OutputStream,
    path: &Path,
    start: Duration,
    duration: Option<Duration>,
) -> Result<Sink> {
    let decode_err = |reason: String| Error::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| decode_err(e.to_string()))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| decode_err(e.to_string()))?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start);

    let sink = Sink::connect_new(handle.mixer());
    match duration {
        Some(d) => sink.append(source.take_duration(d)),
        None => sink.append(source),
    }
    sink.pause();
    Ok(sink)
}
