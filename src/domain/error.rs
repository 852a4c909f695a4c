//! Domain error types.

/// Top-level error type for rotatrader.
#[derive(Debug, thiserror::Error)]
pub enum RotatraderError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Universe(#[from] crate::domain::universe::UniverseError),

    #[error("no usable price data for any of {requested} configured assets")]
    NoData { requested: usize },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RotatraderError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        RotatraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        RotatraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&RotatraderError> for std::process::ExitCode {
    fn from(err: &RotatraderError) -> Self {
        let code: u8 = match err {
            RotatraderError::Io(_) => 1,
            RotatraderError::ConfigParse { .. }
            | RotatraderError::ConfigMissing { .. }
            | RotatraderError::ConfigInvalid { .. } => 2,
            RotatraderError::Data { .. } => 3,
            RotatraderError::Universe(_) | RotatraderError::NoData { .. } => 5,
            RotatraderError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_message_names_section_and_key() {
        let err = RotatraderError::invalid("strategy", "momentum_window", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "invalid config value [strategy] momentum_window: must be at least 2"
        );
    }

    #[test]
    fn config_missing_message() {
        let err = RotatraderError::missing("universe", "codes");
        assert_eq!(err.to_string(), "missing config key [universe] codes");
    }

    #[test]
    fn no_data_message() {
        let err = RotatraderError::NoData { requested: 3 };
        assert_eq!(
            err.to_string(),
            "no usable price data for any of 3 configured assets"
        );
    }
}
