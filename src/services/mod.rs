// src/services/mod.rs

//! Crawl services: fetching, extraction, accumulation, and coordination.

mod accumulator;
mod coordinator;
mod fetcher;
mod parser;
mod tree;

pub use accumulator::ThreadAccumulator;
pub use coordinator::CrawlCoordinator;
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use parser::{BoardLink, PageContent, PageParser};
pub use tree::ForumTree;
