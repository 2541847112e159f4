use intake_core::errors::DomainError;
use intake_db::RepositoryError;
use thiserror::Error;

use crate::terminal::TerminalError;

/// Fatal session outcomes. Validation rejections and generation failures
/// never surface here.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("terminal failure: {0}")]
    Terminal(#[from] TerminalError),
    #[error("order could not be saved: {0}")]
    Persistence(#[source] RepositoryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SessionError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Terminal(TerminalError::Closed) => "input_closed",
            Self::Terminal(TerminalError::Io(_)) => "terminal_io",
            Self::Persistence(_) => "persistence",
            Self::Domain(_) => "domain",
        }
    }
}

#[cfg(test)]
mod tests {
    use intake_core::domain::order::FieldKey;
    use intake_core::errors::DomainError;
    use intake_db::RepositoryError;

    use super::SessionError;
    use crate::terminal::TerminalError;

    #[test]
    fn persistence_failure_is_distinct_from_other_classes() {
        let persistence =
            SessionError::Persistence(RepositoryError::Decode("disk full".to_string()));
        assert_eq!(persistence.error_class(), "persistence");
        assert!(persistence.to_string().contains("order could not be saved"));

        assert_eq!(SessionError::from(TerminalError::Closed).error_class(), "input_closed");
        assert_eq!(
            SessionError::from(DomainError::IncompleteRecord { missing: vec![FieldKey::Phone] })
                .error_class(),
            "domain"
        );
    }
}
