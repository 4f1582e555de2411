/// What happens when the playing entry ends or the list runs out.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum LoopMode {
    /// Stop at either end of the list.
    #[default]
    NoRepeat,
    /// Replay the current entry when it finishes.
    RepeatTrack,
    /// Wrap around at either end of the list.
    RepeatAll,
}

impl LoopMode {
    /// Number of modes; stored states are taken modulo this.
    pub const COUNT: i64 = 3;

    /// Map any integer onto a mode, wrapping in both directions.
    pub fn from_index(index: i64) -> Self {
        match index.rem_euclid(Self::COUNT) {
            0 => LoopMode::NoRepeat,
            1 => LoopMode::RepeatTrack,
            _ => LoopMode::RepeatAll,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            LoopMode::NoRepeat => 0,
            LoopMode::RepeatTrack => 1,
            LoopMode::RepeatAll => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            LoopMode::NoRepeat => "no repeat",
            LoopMode::RepeatTrack => "repeat track",
            LoopMode::RepeatAll => "repeat all",
        }
    }
}
