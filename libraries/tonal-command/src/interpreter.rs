//! Keyword interpreter

use tonal_core::{Band, EqualizerSettings};

/// Named equalizer triple selected by keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub bass: i32,
    pub mid: i32,
    pub treble: i32,
}

impl Preset {
    pub fn settings(&self) -> EqualizerSettings {
        EqualizerSettings::new(self.bass, self.mid, self.treble)
    }
}

/// Presets in match order; the first hit wins
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "rock",
        keywords: &["rock", "energy"],
        bass: 6,
        mid: -2,
        treble: 8,
    },
    Preset {
        name: "jazz",
        keywords: &["jazz", "smooth"],
        bass: 3,
        mid: 5,
        treble: 2,
    },
    Preset {
        name: "electronic",
        keywords: &["electronic", "edm"],
        bass: 10,
        mid: -3,
        treble: 7,
    },
    Preset {
        name: "classical",
        keywords: &["classical", "acoustic"],
        bass: 0,
        mid: 3,
        treble: 4,
    },
    Preset {
        name: "reset",
        keywords: &["reset", "flat", "neutral"],
        bass: 0,
        mid: 0,
        treble: 0,
    },
];

const INCREASE: &[&str] = &["boost", "up", "more", "increase"];
const DECREASE: &[&str] = &["cut", "down", "less", "reduce"];

fn band_keywords(band: Band) -> &'static [&'static str] {
    match band {
        Band::Bass => &["bass"],
        Band::Mid => &["mid"],
        Band::Treble => &["treble", "high"],
    }
}

fn band_step(band: Band) -> i32 {
    match band {
        Band::Bass | Band::Treble => 10,
        Band::Mid => 8,
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Stateless command interpreter
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInterpreter;

impl CommandInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Map an utterance to absolute equalizer settings
    ///
    /// Returns `None` when the text holds no actionable command.
    pub fn interpret(&self, text: &str) -> Option<EqualizerSettings> {
        let text = text.to_lowercase();

        if let Some(preset) = Self::match_preset(&text) {
            return Some(preset.settings());
        }

        let mut settings = EqualizerSettings::flat();
        let mut changed = false;

        for band in Band::ALL {
            if !contains_any(&text, band_keywords(band)) {
                continue;
            }
            // Increase is checked first when both directions appear
            let delta = if contains_any(&text, INCREASE) {
                band_step(band)
            } else if contains_any(&text, DECREASE) {
                -band_step(band)
            } else {
                continue;
            };
            settings = settings.with(band, delta);
            changed = true;
        }

        changed.then_some(settings)
    }

    /// First preset whose keywords appear in already lowercased `text`
    pub fn match_preset(text: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| contains_any(text, p.keywords))
    }
}

/// Shorthand for `CommandInterpreter.interpret(text)`
pub fn interpret(text: &str) -> Option<EqualizerSettings> {
    CommandInterpreter.interpret(text)
}
