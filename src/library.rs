//! Track collections: rows, durable row handles, metadata parsing and
//! directory scanning.

mod analyze;
mod collection;
mod display;
mod model;
mod scan;

pub use analyze::{LoftyAnalyzer, TrackAnalyzer};
pub use collection::{Collection, CollectionId, Row, RowId, SharedCollection};
pub use display::DisplayFormat;
pub use model::{Decoration, TagInfo, Track, TrackInfo};
pub use scan::{audio_files, load_track, scan};

#[cfg(test)]
mod tests;
