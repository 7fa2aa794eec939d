use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while composing or dispatching mail.
#[derive(Debug, Error)]
pub enum SmtpError {
    /// The transport could not be opened or authenticated.
    #[error("failed to connect to {host}:{port}: {reason}")]
    Connection { host: String, port: u16, reason: String },
    /// Bad caller input, such as an unknown provider or a malformed address.
    #[error("{reason}")]
    Validation { reason: String },
    /// The message is missing or not buildable.
    #[error("{reason}")]
    Message { reason: String },
    /// An attachment or inline image source could not be read.
    #[error("failed to read attachment {path:?}")]
    AttachmentIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A single recipient transmit failed. Recorded in the dispatch report, never raised.
    #[error("failed to send to {recipient}")]
    Send {
        recipient: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}
