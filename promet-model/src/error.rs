use thiserror::Error;

/// Errors raised while constructing metrics or recording observations.
///
/// Every variant is raised synchronously at the call site and leaves the
/// metric state untouched.  Writer I/O failures are not represented here;
/// the writers surface [`std::io::Error`] directly, with whatever bytes
/// already reached the sink left in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    /// A metric name that violates `[a-zA-Z_:][a-zA-Z0-9_:]*`, or a label
    /// name that is reserved for the exposition format's own use.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A label that violates the data model: bad or duplicate name, a name
    /// with the reserved `__` prefix, or a value containing a NUL byte.
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// An observation amount the metric cannot accept, such as a negative
    /// counter increment or `NaN` where a number is required.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A builder was finalized without a mandatory field.
    #[error("missing required field: {0}")]
    MissingRequired(&'static str),

    /// A metric was registered under a name that is already taken.
    #[error("metric `{0}` is already registered")]
    DuplicateName(String),
}
