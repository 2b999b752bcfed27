pub mod loader;

pub use loader::{load_markets, summarize, MarketSummary};
