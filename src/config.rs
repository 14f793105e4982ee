//! Layout configuration: defaults, optional JSON file, environment overrides.

use std::path::Path;

use serde::Deserialize;

/// Prefix for environment overrides, e.g. `SEQBOARD_MESSAGE_SPACING`.
pub const ENV_PREFIX: &str = "SEQBOARD_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config value `{field}` must be a positive number")]
    NotPositive { field: &'static str },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Numeric layout knobs, all in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Minimum participant box width.
    pub participant_width: f64,
    pub participant_height: f64,
    /// Distance between the left edges of adjacent participant slots.
    pub participant_spacing: f64,
    /// Vertical advance per message.
    pub message_spacing: f64,
    /// Vertical advance per note.
    pub note_spacing: f64,
    /// Outer canvas margin on every side.
    pub margin: f64,
    /// Minimum message label box width.
    pub label_width: f64,
    pub label_height: f64,
    /// Horizontal padding of block frames around their participants.
    pub block_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            participant_width: 120.0,
            participant_height: 40.0,
            participant_spacing: 200.0,
            message_spacing: 50.0,
            note_spacing: 40.0,
            margin: 40.0,
            label_width: 160.0,
            label_height: 20.0,
            block_padding: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Load defaults, then the optional JSON file, then `SEQBOARD_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an environment
    /// override is not a number, or a resulting value is not positive.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_json(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON object; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed input or unknown fields.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Override fields from `SEQBOARD_<FIELD>` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a set variable is not a number.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        for (field, slot) in self.fields_mut() {
            let key = format!("{ENV_PREFIX}{}", field.to_ascii_uppercase());
            if let Ok(value) = std::env::var(&key) {
                let parsed = value.trim().parse::<f64>();
                match parsed {
                    Ok(v) => *slot = v,
                    Err(_) => return Err(ConfigError::InvalidEnv { key, value }),
                }
            }
        }
        Ok(())
    }

    /// Every knob must be finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.fields().into_iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            Some((field, _)) => Err(ConfigError::NotPositive { field }),
            None => Ok(()),
        }
    }

    fn fields(&self) -> [(&'static str, f64); 9] {
        [
            ("participant_width", self.participant_width),
            ("participant_height", self.participant_height),
            ("participant_spacing", self.participant_spacing),
            ("message_spacing", self.message_spacing),
            ("note_spacing", self.note_spacing),
            ("margin", self.margin),
            ("label_width", self.label_width),
            ("label_height", self.label_height),
            ("block_padding", self.block_padding),
        ]
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut f64); 9] {
        [
            ("participant_width", &mut self.participant_width),
            ("participant_height", &mut self.participant_height),
            ("participant_spacing", &mut self.participant_spacing),
            ("message_spacing", &mut self.message_spacing),
            ("note_spacing", &mut self.note_spacing),
            ("margin", &mut self.margin),
            ("label_width", &mut self.label_width),
            ("label_height", &mut self.label_height),
            ("block_padding", &mut self.block_padding),
        ]
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
