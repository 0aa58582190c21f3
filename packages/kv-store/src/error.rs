//! Error types for the backend layer.
//!
//! Errors at this level are transport-focused. "Record not found" or "bad
//! field value" are not errors here - an empty hash and a zero delete count are
//! ordinary answers that the mapping layer interprets.

/// Errors raised by a [`KvStore`](crate::KvStore).
#[derive(Debug)]
pub enum KvError {
    /// Generic I/O or transport failure.
    ///
    /// Use this for network errors, broken connections, IPC failures, etc.
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The backend rejected the command.
    ///
    /// For example `INCR` against a key that holds a hash, or a counter that
    /// would overflow.
    Protocol { message: String },

    /// The store was closed and no longer accepts commands.
    Closed,
}

impl KvError {
    /// Create a protocol error from a message.
    pub fn protocol(message: impl Into<String>) -> Self {
        KvError::Protocol {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for KvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KvError::Transport(e) => write!(f, "transport error: {}", e),
            KvError::Protocol { message } => write!(f, "protocol error: {}", message),
            KvError::Closed => write!(f, "store is closed"),
        }
    }
}

impl std::error::Error for KvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KvError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KvError {
    fn from(e: std::io::Error) -> Self {
        KvError::Transport(Box::new(e))
    }
}
