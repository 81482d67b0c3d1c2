pub mod catalog;
pub mod record;
pub mod search;

pub use catalog::{normalize_id, CatalogEntry, CatalogKey};
pub use record::{EnrichedRecord, RECORD_HEADERS};
pub use search::{Offer, SearchPage, SearchRequest, SearchResult};
