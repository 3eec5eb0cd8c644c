use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    EmptyDestination { index: usize },
    InvalidSessionId { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::EmptyDestination { index } => {
                write!(f, "destination #{index} must not be empty")
            }
            Self::InvalidSessionId { input } => write!(
                f,
                "invalid message session id: {input:?} (expected at least 32 characters of \
                 [A-Za-z0-9_])"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "message" };
        assert_eq!(err.to_string(), "message must not be empty");

        let err = ValidationError::EmptyDestination { index: 2 };
        assert_eq!(err.to_string(), "destination #2 must not be empty");

        let err = ValidationError::InvalidSessionId {
            input: "abc".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid message session id: \"abc\" (expected at least 32 characters of [A-Za-z0-9_])"
        );
    }
}
