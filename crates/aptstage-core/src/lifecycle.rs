use crate::CoreError;
use std::fmt;

/// Lifecycle of one configurer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    Configuring,
    Configured,
    Deconfiguring,
    Deconfigured,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unconfigured => "unconfigured",
            Phase::Configuring => "configuring",
            Phase::Configured => "configured",
            Phase::Deconfiguring => "deconfiguring",
            Phase::Deconfigured => "deconfigured",
        };
        f.write_str(name)
    }
}

/// Calling configure or deconfigure out of order is a programming error,
/// not a runtime condition to recover from.
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (Phase::Unconfigured, Phase::Configuring)
            | (Phase::Configuring, Phase::Configured)
            | (Phase::Configured, Phase::Deconfiguring)
            | (Phase::Deconfiguring, Phase::Deconfigured)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        assert!(validate_transition(Phase::Unconfigured, Phase::Configuring).is_ok());
        assert!(validate_transition(Phase::Configuring, Phase::Configured).is_ok());
        assert!(validate_transition(Phase::Configured, Phase::Deconfiguring).is_ok());
        assert!(validate_transition(Phase::Deconfiguring, Phase::Deconfigured).is_ok());
    }

    #[test]
    fn invalid_transitions() {
        assert!(validate_transition(Phase::Unconfigured, Phase::Deconfiguring).is_err());
        assert!(validate_transition(Phase::Configured, Phase::Configuring).is_err());
        assert!(validate_transition(Phase::Deconfigured, Phase::Configuring).is_err());
        assert!(validate_transition(Phase::Deconfigured, Phase::Deconfiguring).is_err());
        assert!(validate_transition(Phase::Configuring, Phase::Deconfiguring).is_err());
    }
}
