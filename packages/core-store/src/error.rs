//! Error types for the mapping engine.

use kvorm_kv_store::KvError;

/// A boxed underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the mapping engine.
///
/// The first four variants are the classified outcomes. Failures of the
/// backing store are not reclassified: they travel as [`Error::Store`] and
/// should be treated as a transient/internal condition.
#[derive(Debug)]
pub enum Error {
    /// The integrator registered something unusable. Raised only while
    /// registering types, never while serving.
    Configuration {
        message: String,
        source: Option<BoxError>,
    },

    /// The request is malformed and the caller can fix it.
    BadRequest {
        message: String,
        source: Option<BoxError>,
    },

    /// The addressed type or record does not exist.
    NotFound {
        message: String,
        source: Option<BoxError>,
    },

    /// A defect in the engine itself.
    Internal {
        message: String,
        source: Option<BoxError>,
    },

    /// Failure reported by the backing store.
    Store(KvError),
}

/// Discriminant of [`Error`], for exhaustive classification at the boundary.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    BadRequest,
    NotFound,
    Internal,
    Store,
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause. No effect on [`Error::Store`].
    #[must_use]
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            Error::Configuration { source, .. }
            | Error::BadRequest { source, .. }
            | Error::NotFound { source, .. }
            | Error::Internal { source, .. } => *source = Some(cause.into()),
            Error::Store(_) => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::BadRequest { .. } => ErrorKind::BadRequest,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Internal { .. } => ErrorKind::Internal,
            Error::Store(_) => ErrorKind::Store,
        }
    }

    /// The message without the cause appended.
    pub fn message(&self) -> String {
        match self {
            Error::Configuration { message, .. }
            | Error::BadRequest { message, .. }
            | Error::NotFound { message, .. }
            | Error::Internal { message, .. } => message.clone(),
            Error::Store(e) => e.to_string(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Configuration { message, source }
            | Error::BadRequest { message, source }
            | Error::NotFound { message, source }
            | Error::Internal { message, source } => match source {
                Some(cause) => write!(f, "{}: {}", message, cause),
                None => write!(f, "{}", message),
            },
            Error::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration { source, .. }
            | Error::BadRequest { source, .. }
            | Error::NotFound { source, .. }
            | Error::Internal { source, .. } => source
                .as_deref()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            Error::Store(e) => Some(e),
        }
    }
}

impl From<KvError> for Error {
    fn from(e: KvError) -> Self {
        Error::Store(e)
    }
}
