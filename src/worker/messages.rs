//! Messages crossing into a worker thread.
//!
//! Every request carries the tracing span that was current when it was posted,
//! so spans opened by the worker are parented under the handler that asked for
//! the work even though they run on another thread.

/// One item in a worker's inbox.
#[derive(Debug)]
pub enum Envelope<M> {
    /// A unit of work.
    Request {
        /// The job-specific message.
        payload: M,

        /// Span current at the time of posting.
        parent: tracing::Span,
    },

    /// Ask the worker loop to exit after the requests queued before it.
    Shutdown,
}

impl<M> Envelope<M> {
    /// Wraps a payload, capturing the current span as parent.
    #[must_use]
    pub fn request(payload: M) -> Self {
        Self::Request {
            payload,
            parent: tracing::Span::current(),
        }
    }
}
