//! Error taxonomy for the arena core

use thiserror::Error;

/// Errors raised by arena construction and match setup.
///
/// Configuration problems surface eagerly when rules, encoders, strategies or
/// agents are built. Nothing in a running match is retried.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ArenaError {
    #[error("invalid configuration for `{param}`: {reason}")]
    InvalidConfig { param: &'static str, reason: String },

    #[error("invalid action `{0}`: expected cooperate or cheat")]
    InvalidAction(String),

    #[error("participant `{name}` declares an unsupported capability set")]
    UnsupportedParticipant { name: String },
}

impl ArenaError {
    pub(crate) fn config(param: &'static str, reason: impl Into<String>) -> Self {
        ArenaError::InvalidConfig {
            param,
            reason: reason.into(),
        }
    }
}

/// Check that a probability-like parameter lies in `[0, 1]`.
pub(crate) fn check_unit(param: &'static str, value: f64) -> Result<(), ArenaError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ArenaError::config(param, format!("{} is outside [0, 1]", value)))
    }
}

/// Check that a step-size parameter lies in `(0, 1]`.
pub(crate) fn check_step(param: &'static str, value: f64) -> Result<(), ArenaError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ArenaError::config(param, format!("{} is outside (0, 1]", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_unit_bounds() {
        assert!(check_unit("epsilon", 0.0).is_ok());
        assert!(check_unit("epsilon", 1.0).is_ok());
        assert!(check_unit("epsilon", -0.01).is_err());
        assert!(check_unit("epsilon", 1.01).is_err());
        assert!(check_unit("epsilon", f64::NAN).is_err());
    }

    #[test]
    fn test_check_step_excludes_zero() {
        assert!(check_step("alpha", 0.0).is_err());
        assert!(check_step("alpha", 1.0).is_ok());
        assert!(check_step("alpha", 0.5).is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = ArenaError::config("gamma", "1.5 is outside [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid configuration for `gamma`: 1.5 is outside [0, 1]"
        );
        assert_eq!(
            ArenaError::InvalidAction("7".into()).to_string(),
            "invalid action `7`: expected cooperate or cheat"
        );
    }
}
