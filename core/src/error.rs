use thiserror::Error;

/// Invalid caller input. Unmatched queries are reported through
/// [`crate::SearchOutcome`], never as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown retrieval mode: {0} (expected boolean, ranked or boosted)")]
    UnknownMode(String),

    #[error("unknown term policy: {0} (expected strict or extend)")]
    UnknownPolicy(String),

    #[error("invalid price band {min}..={max}: bounds must satisfy 1 <= min <= max <= 4")]
    InvalidPriceBand { min: u8, max: u8 },

    #[error("result count must be at least 1")]
    ZeroResultCount,

    #[error("boosted mode requires a filter request")]
    MissingFilter,
}
