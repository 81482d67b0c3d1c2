pub mod cancel;
pub mod crawler;
pub mod price;
pub mod scorer;
pub mod throttle;

pub use cancel::{CancellationCoordinator, CrawlState};
pub use crawler::{CrawlController, CrawlReport};
pub use price::{PriceBasis, PriceSet};
pub use scorer::{ExactFieldOrFallbackFirst, MatchPolicy, MatchScorer, ScoredBestOf};
pub use throttle::Throttle;
