pub mod dates;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod links;
pub mod recency;
pub mod sources;

pub use dates::parse_date_string;
pub use error::{ExtractError, FetchError, ScraperError};
pub use extract::extract_article;
pub use fetch::{FetcherConfig, PageFetcher};
pub use links::{extract_links, MAX_LINKS};
pub use recency::filter_recent;
pub use sources::{build_sources, NewsSource, RiaSource, MAX_DETAIL_PAGES};
