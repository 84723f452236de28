//! Property-based tests for the command interpreter

use proptest::prelude::*;
use tonal_command::{interpret, respond, PRESETS};
use tonal_core::GAIN_LIMIT_DB;

proptest! {
    #[test]
    fn interpret_is_total(text in ".*") {
        if let Some(settings) = interpret(&text) {
            prop_assert!(settings.bass().abs() <= GAIN_LIMIT_DB);
            prop_assert!(settings.mid().abs() <= GAIN_LIMIT_DB);
            prop_assert!(settings.treble().abs() <= GAIN_LIMIT_DB);
        }
    }

    #[test]
    fn interpret_is_case_insensitive(text in "[a-zA-Z ]{0,40}") {
        prop_assert_eq!(interpret(&text), interpret(&text.to_uppercase()));
    }

    #[test]
    fn preset_keyword_overrides_surrounding_text(
        prefix in "[a-z ]{0,20}",
        index in 0..PRESETS.len(),
    ) {
        let preset = &PRESETS[index];
        let text = format!("{prefix} {}", preset.keywords[0]);
        let earlier = PRESETS[..index]
            .iter()
            .find(|p| p.keywords.iter().any(|k| text.contains(k)));

        let expected = earlier.unwrap_or(preset).settings();
        prop_assert_eq!(interpret(&text), Some(expected));
    }

    #[test]
    fn respond_always_has_a_message(text in ".*") {
        let response = respond(&text);
        prop_assert!(!response.message.is_empty());
        prop_assert_eq!(response.settings, interpret(&text));
    }
}

#[test]
fn response_serializes_settings() {
    let json = serde_json::to_value(respond("boost bass")).unwrap();
    assert_eq!(json["settings"]["bass"], 10);
    assert_eq!(json["settings"]["mid"], 0);
}
