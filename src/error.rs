use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure that aborts a whole capture.
///
/// Expected per-item conditions (an unreadable mount, a process that exited
/// mid-scan) never become a `CollectError`; collectors drop those items and
/// keep going. See [`crate::system::probe`].
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("{domain} collector I/O error: {source}")]
    Io {
        domain: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{domain} collector failed: {detail}")]
    Unexpected {
        domain: &'static str,
        detail: String,
    },

    #[error("collector task panicked or was cancelled: {0}")]
    Join(String),

    #[error("capture exceeded deadline of {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, CollectError>;

impl CollectError {
    pub fn io(domain: &'static str, source: io::Error) -> Self {
        CollectError::Io { domain, source }
    }

    pub fn unexpected<S: Into<String>>(domain: &'static str, detail: S) -> Self {
        CollectError::Unexpected {
            domain,
            detail: detail.into(),
        }
    }
}
