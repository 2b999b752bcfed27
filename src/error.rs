use thiserror::Error;

/// Errors surfaced by the analysis and simulation layers.
///
/// Both variants are validation failures reported synchronously; nothing
/// here is retried. A bucket that never reaches the entry threshold is a
/// `TradeOutcome::NoEntry` classification, not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A requested aggregate would divide by a zero total. Callers must
    /// branch on this rather than receive NaN.
    #[error("insufficient data: no qualifying trades for this configuration")]
    InsufficientData,

    /// A threshold or simulation parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
