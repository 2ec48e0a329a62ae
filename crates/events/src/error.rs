/// Failure to hand a notification to its transport.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    /// The event on the bus is not a notification this dispatcher understands.
    #[error("Not a notification event: {0}")]
    Unroutable(String),
}
