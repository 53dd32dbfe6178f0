//! Errors returned by channel operations.
//!
//! Send errors hand the rejected item back to the caller so it is never silently lost.

/// Error returned when a blocking send fails.
#[derive(thiserror::Error)]
pub enum SendError<T> {
    /// The channel was closed, or every receiver was dropped, before the item was delivered.
    #[error("Channel closed")]
    Closed(T),
}

impl<T> SendError<T> {
    /// Returns the item that could not be sent.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(t) => t,
        }
    }
}

impl<T> std::fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed(_t) => f.debug_tuple("SendError::Closed").finish_non_exhaustive(),
        }
    }
}

/// Error returned when a non-blocking send fails.
#[derive(thiserror::Error)]
pub enum TrySendError<T> {
    /// There is no room for the item right now.
    #[error("Full")]
    Full(T),
    /// The channel was closed, or every receiver was dropped.
    #[error("Channel closed")]
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Returns the item that could not be sent.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(t) | Self::Closed(t) => t,
        }
    }
}

impl<T> std::fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(_t) => f.debug_tuple("TrySendError::Full").finish_non_exhaustive(),
            Self::Closed(_t) => f
                .debug_tuple("TrySendError::Closed")
                .finish_non_exhaustive(),
        }
    }
}

impl<T> From<SendError<T>> for TrySendError<T> {
    fn from(e: SendError<T>) -> Self {
        match e {
            SendError::Closed(t) => Self::Closed(t),
        }
    }
}

/// Error returned when closing a channel fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CloseError {
    /// [`crate::Sender::close`] was already called on this channel.
    #[error("Channel already closed")]
    AlreadyClosed,
}

/// Error returned when a non-blocking receive finds nothing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    /// The channel is open but currently empty.
    #[error("Empty")]
    Empty,
    /// The channel is closed and every buffered item has been received.
    #[error("Channel closed")]
    Closed,
}
