pub mod market;
pub mod outcome;

pub use market::{BucketSeries, MarketRecord, PricePoint, MIN_HISTORY_POINTS};
pub use outcome::{OutcomeProbs, ThresholdParams, TradeOutcome, TradePayouts};
