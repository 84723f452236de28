/// Three-band equalizer settings
use serde::{Deserialize, Serialize};
use std::fmt;

/// Limit applied to every band, in dB (both directions)
pub const GAIN_LIMIT_DB: i32 = 12;

/// Equalizer band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Bass,
    Mid,
    Treble,
}

impl Band {
    /// All bands in signal-path order
    pub const ALL: [Band; 3] = [Band::Bass, Band::Mid, Band::Treble];

    pub fn name(&self) -> &'static str {
        match self {
            Band::Bass => "bass",
            Band::Mid => "mid",
            Band::Treble => "treble",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gains for the bass, mid, and treble bands in dB
///
/// A value object: every constructor clamps to
/// `[-GAIN_LIMIT_DB, GAIN_LIMIT_DB]` and updates produce a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawSettings")]
pub struct EqualizerSettings {
    bass: i32,
    mid: i32,
    treble: i32,
}

#[derive(Deserialize)]
struct RawSettings {
    #[serde(default)]
    bass: i32,
    #[serde(default)]
    mid: i32,
    #[serde(default)]
    treble: i32,
}

impl From<RawSettings> for EqualizerSettings {
    fn from(raw: RawSettings) -> Self {
        Self::new(raw.bass, raw.mid, raw.treble)
    }
}

fn clamp_gain(db: i32) -> i32 {
    db.clamp(-GAIN_LIMIT_DB, GAIN_LIMIT_DB)
}

impl EqualizerSettings {
    /// Create settings, clamping each gain to the allowed range
    pub fn new(bass: i32, mid: i32, treble: i32) -> Self {
        Self {
            bass: clamp_gain(bass),
            mid: clamp_gain(mid),
            treble: clamp_gain(treble),
        }
    }

    /// All bands at 0 dB
    pub const fn flat() -> Self {
        Self {
            bass: 0,
            mid: 0,
            treble: 0,
        }
    }

    /// Settings after a reset, always flat
    pub fn reset(&self) -> Self {
        Self::flat()
    }

    pub fn bass(&self) -> i32 {
        self.bass
    }

    pub fn mid(&self) -> i32 {
        self.mid
    }

    pub fn treble(&self) -> i32 {
        self.treble
    }

    /// Gain of a single band
    pub fn get(&self, band: Band) -> i32 {
        match band {
            Band::Bass => self.bass,
            Band::Mid => self.mid,
            Band::Treble => self.treble,
        }
    }

    /// Copy with one band replaced (clamped)
    pub fn with(&self, band: Band, db: i32) -> Self {
        let mut next = *self;
        match band {
            Band::Bass => next.bass = clamp_gain(db),
            Band::Mid => next.mid = clamp_gain(db),
            Band::Treble => next.treble = clamp_gain(db),
        }
        next
    }

    pub fn is_flat(&self) -> bool {
        *self == Self::flat()
    }
}

impl fmt::Display for EqualizerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bass: {:+}dB, Mid: {:+}dB, Treble: {:+}dB",
            self.bass, self.mid, self.treble
        )
    }
}
