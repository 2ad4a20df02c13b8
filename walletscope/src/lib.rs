pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod provider;
pub mod tracing;
pub mod utils;
pub mod view;

pub use cache::AggregationCache;
pub use cache::CacheKey;
pub use error::Result;
pub use graph::GraphLayout;
pub use view::WalletView;
