use thiserror::Error;

/// Result type alias using FabrikError
pub type Result<T> = std::result::Result<T, FabrikError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and host-facing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Name resolution exhausted every heuristic attempt without a match
    UnknownBlueprint,
    /// An identity key had no value after attribute resolution
    MissingIdentityValue,
    /// A label was read before anything was bound to it
    LabelNotFound,
    /// Post-create hook recursion exceeded the configured depth limit
    HookDepthExceeded,
    /// External store failure, passed through unmodified
    Persistence,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownBlueprint => "ERR_UNKNOWN_BLUEPRINT",
            ErrorKind::MissingIdentityValue => "ERR_MISSING_IDENTITY_VALUE",
            ErrorKind::LabelNotFound => "ERR_LABEL_NOT_FOUND",
            ErrorKind::HookDepthExceeded => "ERR_HOOK_DEPTH_EXCEEDED",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }
}

/// Error raised by the external persistence collaborator
///
/// The engine never wraps or reinterprets these: a store failure surfaces to
/// the caller exactly as the store produced it, since the store's error
/// semantics are the host's concern.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PersistenceError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PersistenceError {
    /// Create a new persistence error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying store error
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by blueprint registration, resolution, and creation
///
/// All errors surface synchronously to the immediate caller of
/// `resolve`/`create`; there is no built-in retry. Idempotent re-invocation
/// with the same identity-key values is the intended retry mechanism.
#[derive(Debug, Error)]
pub enum FabrikError {
    /// No registered blueprint or catalog entry matches the semantic name.
    /// `attempts` lists every type name the resolution heuristic tried,
    /// in order.
    #[error("No entity type matches '{name}' (tried: {attempts:?})")]
    UnknownBlueprint { name: String, attempts: Vec<String> },

    /// An identity key was absent from the resolved attribute bag
    #[error("Identity key '{field}' has no value after attribute resolution for blueprint '{blueprint}'")]
    MissingIdentityValue { blueprint: String, field: String },

    /// `get(label)` on a label with no binding in this blueprint
    #[error("No entity bound to label '{label}' in blueprint '{blueprint}'")]
    LabelNotFound { blueprint: String, label: String },

    /// A post-create hook chain recursed past the configured depth limit
    #[error("Post-create hook recursion reached depth {depth} in blueprint '{blueprint}'")]
    HookDepthExceeded { blueprint: String, depth: usize },

    /// External store failure, propagated unmodified
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl FabrikError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            FabrikError::UnknownBlueprint { .. } => ErrorKind::UnknownBlueprint,
            FabrikError::MissingIdentityValue { .. } => ErrorKind::MissingIdentityValue,
            FabrikError::LabelNotFound { .. } => ErrorKind::LabelNotFound,
            FabrikError::HookDepthExceeded { .. } => ErrorKind::HookDepthExceeded,
            FabrikError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let err = FabrikError::UnknownBlueprint {
            name: "widgets".to_string(),
            attempts: vec!["Widget".to_string()],
        };
        assert_eq!(err.code(), "ERR_UNKNOWN_BLUEPRINT");
        assert_eq!(err.kind(), ErrorKind::UnknownBlueprint);

        let err = FabrikError::Persistence(PersistenceError::new("constraint violated"));
        assert_eq!(err.code(), "ERR_PERSISTENCE");
    }

    #[test]
    fn persistence_error_passes_message_through() {
        let err: FabrikError = PersistenceError::new("unique index clash").into();
        assert_eq!(err.to_string(), "unique index clash");
    }
}
