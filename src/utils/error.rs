use std::fmt;

/// Failures surfaced by a `UserStore` implementation.
#[derive(Debug)]
pub enum StoreError {
    /// The id does not resolve to a stored user (includes malformed ids).
    NotFound(String),
    /// Unique index on `email` rejected the write.
    DuplicateEmail(String),
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "User not found: {}", id),
            StoreError::DuplicateEmail(email) => write!(f, "Duplicate email: {}", email),
            StoreError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Rejected create/update body.
#[derive(Debug, PartialEq)]
pub enum ValidationError {
    /// A required field is absent or falsy (answered with 400).
    MissingFields,
    /// A field is present but cannot be cast to its schema type (answered
    /// with 500, like a Mongoose CastError).
    Cast { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => write!(f, "Name, email, and age are required"),
            ValidationError::Cast { field, value } => {
                write!(f, "Cast failed for field '{}' with value {}", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Invalid process configuration detected at startup.
#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    UnknownStore(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(value) => write!(f, "Invalid PORT value: {}", value),
            ConfigError::UnknownStore(value) => {
                write!(f, "Unknown USER_STORE '{}' (expected 'mongo' or 'memory')", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
