//! Pipeline entry points.
//!
//! - `run_crawl`: Crawl the configured forum and persist one archive document

pub mod crawl;

pub use crawl::run_crawl;
