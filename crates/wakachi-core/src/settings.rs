//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! [`crate::TokenizerBuilder`] seeds its parameters from here; individual
//! tokenizers may still override them.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::tokenizer::Mode;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub penalty: PenaltySettings,
    pub user_dict: UserDictSettings,
    pub tokenizer: TokenizerSettings,
}

/// Length penalties applied in search and extended modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PenaltySettings {
    pub kanji_length_threshold: usize,
    pub kanji_penalty: i64,
    pub other_length_threshold: usize,
    pub other_penalty: i64,
}

/// Cost and context ids given to user dictionary pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserDictSettings {
    pub word_cost_base: i32,
    pub minimum_word_cost: i32,
    pub left_id: u16,
    pub right_id: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerSettings {
    pub mode: Mode,
    /// Split input after 。 and 、 and tokenize each clause separately.
    pub split_clauses: bool,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_negative {
        ($section:ident . $field:ident) => {
            if s.$section.$field < 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be non-negative".to_string(),
                });
            }
        };
    }

    check_non_negative!(penalty.kanji_penalty);
    check_non_negative!(penalty.other_penalty);

    if s.user_dict.minimum_word_cost > 0 {
        return Err(SettingsError::InvalidValue {
            field: "user_dict.minimum_word_cost".to_string(),
            reason: "must not be positive".to_string(),
        });
    }
    if s.user_dict.minimum_word_cost == i32::MIN {
        return Err(SettingsError::InvalidValue {
            field: "user_dict.minimum_word_cost".to_string(),
            reason: "must be greater than i32::MIN".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.penalty.kanji_length_threshold, 2);
        assert_eq!(s.penalty.kanji_penalty, 3000);
        assert_eq!(s.penalty.other_length_threshold, 7);
        assert_eq!(s.penalty.other_penalty, 1700);
        assert_eq!(s.user_dict.word_cost_base, -100000);
        assert_eq!(s.user_dict.minimum_word_cost, i32::MIN / 2);
        assert_eq!(s.user_dict.left_id, 5);
        assert_eq!(s.user_dict.right_id, 5);
        assert_eq!(s.tokenizer.mode, Mode::Normal);
        assert!(s.tokenizer.split_clauses);
    }

    #[test]
    fn parse_valid_custom_toml() {
        let toml = r#"
[penalty]
kanji_length_threshold = 3
kanji_penalty = 1000
other_length_threshold = 5
other_penalty = 500

[user_dict]
word_cost_base = -5000
minimum_word_cost = -20000
left_id = 1
right_id = 1

[tokenizer]
mode = "search"
split_clauses = false
"#;
        let s = parse_settings_toml(toml).unwrap();
        assert_eq!(s.penalty.kanji_length_threshold, 3);
        assert_eq!(s.tokenizer.mode, Mode::Search);
        assert!(!s.tokenizer.split_clauses);
    }

    #[test]
    fn error_negative_penalty() {
        let toml = DEFAULT_SETTINGS_TOML.replace("kanji_penalty = 3000", "kanji_penalty = -1");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("penalty.kanji_penalty"));
    }

    #[test]
    fn error_positive_floor() {
        let toml = DEFAULT_SETTINGS_TOML.replace(
            "minimum_word_cost = -1073741824",
            "minimum_word_cost = 10",
        );
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("user_dict.minimum_word_cost"));
    }

    #[test]
    fn error_unknown_mode() {
        let toml = DEFAULT_SETTINGS_TOML.replace("mode = \"normal\"", "mode = \"greedy\"");
        assert!(matches!(
            parse_settings_toml(&toml),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn error_missing_section() {
        let toml = "[penalty]\nkanji_length_threshold = 2\n";
        assert!(matches!(
            parse_settings_toml(toml),
            Err(SettingsError::Parse(_))
        ));
    }
}
