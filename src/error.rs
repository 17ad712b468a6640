use thiserror::Error;

/// Errors surfaced while resolving the results container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchError {
    /// An element with the expected id exists but fails the structural
    /// check for a results container.
    #[error("element '#{id}' is present but is a <{tag}>, not a results container")]
    NotAContainer { id: String, tag: String },

    /// The mutation feed closed before the container appeared.
    #[error("mutation feed disconnected while waiting for '#{id}'")]
    FeedClosed { id: String },
}
