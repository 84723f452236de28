//! User-facing replies

use crate::interpreter::interpret;
use serde::Serialize;
use tonal_core::EqualizerSettings;

const HINTS: &str = "Try commands like:\n\
• \"boost bass\"\n\
• \"cut treble\"\n\
• \"rock preset\"\n\
• \"reset equalizer\"";

const GUIDANCE: &str = "I can control the equalizer! Try:\n\
• \"boost bass\" / \"cut bass\"\n\
• \"increase mid\" / \"reduce mid\"\n\
• \"boost treble\" / \"cut treble\"\n\
• Presets: \"rock\", \"jazz\", \"electronic\", \"classical\"\n\
• \"reset equalizer\"";

/// Outcome of handling one utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Settings to apply, absent when nothing matched
    pub settings: Option<EqualizerSettings>,
    pub message: String,
}

fn signed(db: i32) -> String {
    if db > 0 {
        format!("+{db}")
    } else {
        db.to_string()
    }
}

/// Confirmation for applied settings
pub fn reply(settings: &EqualizerSettings) -> String {
    format!(
        "Equalizer adjusted! Bass: {}dB, Mid: {}dB, Treble: {}dB\n\n{}",
        signed(settings.bass()),
        signed(settings.mid()),
        signed(settings.treble()),
        HINTS
    )
}

/// Help text for utterances without a command
pub fn guidance() -> &'static str {
    GUIDANCE
}

/// Interpret `text` and build the matching reply
pub fn respond(text: &str) -> Response {
    match interpret(text) {
        Some(settings) => Response {
            settings: Some(settings),
            message: reply(&settings),
        },
        None => Response {
            settings: None,
            message: guidance().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_shows_sign_for_positive_gains_only() {
        let message = reply(&EqualizerSettings::new(6, -2, 0));
        assert!(message.starts_with("Equalizer adjusted! Bass: +6dB, Mid: -2dB, Treble: 0dB"));
        assert!(message.contains("\"reset equalizer\""));
    }

    #[test]
    fn unmatched_text_gets_guidance() {
        let response = respond("what's up doc");
        // "up" alone names no band
        assert_eq!(response.settings, None);
        assert_eq!(response.message, guidance());
        assert!(guidance().contains("\"classical\""));
    }

    #[test]
    fn matched_text_gets_confirmation() {
        let response = respond("Rock preset");
        assert_eq!(response.settings, Some(EqualizerSettings::new(6, -2, 8)));
        assert!(response.message.contains("Treble: +8dB"));
    }
}
