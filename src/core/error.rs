use thiserror::Error;

/// Retrieval of the entity document failed.
///
/// Covers transport failures, non-success statuses, unreadable files and
/// bodies that are not JSON at all. Not subdivided further.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{location}: {detail}")]
pub struct FetchError {
    /// The source as the caller named it (path or URL)
    pub location: String,
    pub detail: String,
}

impl FetchError {
    pub fn new(location: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            detail: detail.into(),
        }
    }

    /// A response arrived but its status was not a success
    pub fn status(location: impl Into<String>, code: u16, reason: &str) -> Self {
        Self::new(location, format!("not found: {} {}", code, reason))
    }
}

/// The body was valid JSON but not shaped like an entity document
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid entity document at {path}: {message}")]
pub struct SchemaError {
    /// Dotted path to the offending value, `$` for the root
    pub path: String,
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Config error: {0}")]
    Config(String),
}

impl EntityError {
    pub fn is_fetch(&self) -> bool {
        matches!(self, EntityError::Fetch(_))
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, EntityError::Schema(_))
    }
}

pub type Result<T> = std::result::Result<T, EntityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = FetchError::status("readme.json", 404, "Not Found");
        assert_eq!(err.to_string(), "readme.json: not found: 404 Not Found");
    }

    #[test]
    fn test_entity_error_wraps_kinds() {
        let fetch: EntityError = FetchError::new("a.json", "boom").into();
        assert!(fetch.is_fetch());
        assert!(!fetch.is_schema());

        let schema: EntityError = SchemaError::new("$.lore", "expected a string").into();
        assert!(schema.is_schema());
        assert_eq!(
            schema.to_string(),
            "Schema error: invalid entity document at $.lore: expected a string"
        );
    }
}
