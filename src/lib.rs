pub mod config;
pub mod errors;
pub mod logging;
pub mod merge;
pub mod merging;
pub mod norm;
pub mod pipeline;
pub mod regression;
pub mod scored;
pub mod selection;

pub use errors::{FedRankError, Result};
pub use merge::merge_sorted;
pub use scored::{sort_scored, ScoredItem, SortOrder};
