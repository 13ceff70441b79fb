use num_bigint::BigUint;
use thiserror::Error;

/// Why a reconstruction request failed.
///
/// Every error is terminal for the call. The caller corrects the input and
/// tries again; nothing is retried internally and no partial result is
/// returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request was rejected before any arithmetic took place.
    #[error("input error: {0}")]
    Input(#[from] InputError),
    /// The power sums are not the power sums of any multiset over the field.
    #[error("invalid reconstruction: {0}")]
    InvalidReconstruction(#[from] ReconstructionError),
    /// The field arithmetic or factorization faulted.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected between {min} and {max} values, got {count}")]
    CountOutOfRange { count: usize, min: usize, max: usize },
    #[error("expected {expected} power sums, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("prime {prime} must be larger than the number of values {count}")]
    PrimeTooSmall { prime: BigUint, count: usize },
    #[error("malformed base-10 numeral {0:?}")]
    MalformedNumeral(String),
    #[error("malformed power sum encoding: {0}")]
    MalformedEncoding(String),
    #[error("{0} is null")]
    NullArgument(&'static str),
    #[error("output buffer {0} is null")]
    NullBuffer(usize),
    #[error("encoded value {value} is longer than the {limit} bytes reserved for it")]
    OutputTooLong { value: String, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    #[error("irreducible factor of degree {degree} is not a monic linear factor")]
    NonLinearFactor { degree: usize },
    #[error("factors account for {found} roots, expected {expected}")]
    RootCountMismatch { found: usize, expected: usize },
}

/// Coarse classification of a [SolveError], for callers that only need to
/// know which stage rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    InvalidReconstruction,
    Internal,
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::Input(_) => ErrorKind::Input,
            SolveError::InvalidReconstruction(_) => ErrorKind::InvalidReconstruction,
            SolveError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        SolveError::Internal(msg.into())
    }
}
