// Copycheck Core Services
// Segmentation, scoring, search and reporting behind the checker pipeline

pub mod analysis;
pub mod checker;
pub mod config_store;
pub mod search;

pub use analysis::*;
pub use checker::{PlagiarismChecker, ProgressObserver};
pub use config_store::*;
pub use search::{clean_query, GoogleSearchClient, SearchConfig, SearchError, SearchProvider};
