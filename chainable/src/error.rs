use std::fmt::Display;

#[derive(Debug)]
pub enum ChainError {
    MissingCapability {
        name: String,
        arity: usize,
        target: &'static str,
    },
    ContextNotFound(String),
    InvalidArgument {
        name: String,
        message: String,
    },
    Operation(Box<dyn std::error::Error + Send + Sync>),
}

impl ChainError {
    pub fn missing(name: &str, arity: usize, target: &'static str) -> Self {
        ChainError::MissingCapability {
            name: name.to_string(),
            arity,
            target,
        }
    }

    pub fn invalid_argument(name: &str, message: impl Into<String>) -> Self {
        ChainError::InvalidArgument {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Boxes any caller error so it can travel through a chain.
    pub fn operation<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ChainError::Operation(err.into())
    }

    pub fn is_missing_capability(&self) -> bool {
        matches!(self, ChainError::MissingCapability { .. })
    }
}

impl Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::MissingCapability {
                name,
                arity,
                target,
            } => write!(
                f,
                "Missing capability: {} does not respond to `{}` with {} argument(s)",
                target, name, arity
            ),
            ChainError::ContextNotFound(name) => write!(f, "Context not found: {}", name),
            ChainError::InvalidArgument { name, message } => {
                write!(f, "Invalid argument for `{}`: {}", name, message)
            }
            ChainError::Operation(err) => write!(f, "Operation error: {}", err),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Operation(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<regex::Error> for ChainError {
    fn from(err: regex::Error) -> Self {
        ChainError::invalid_argument("regex", err.to_string())
    }
}
