pub mod cache;
pub mod config;
pub mod layout;
pub mod provider;
pub mod request;

pub use anyhow::anyhow;
pub use anyhow::Context;
pub use anyhow::Error;
pub use anyhow::Result;
pub use cache::CacheError;
pub use cache::FetchError;
pub use config::ConfigError;
pub use layout::LayoutError;
pub use provider::ProviderError;
pub use request::RequestError;

// For consistent error handling with location info
#[macro_export]
macro_rules! err_with_loc {
  ($err:expr) => {
    anyhow::anyhow!($err).context(format!("at {}:{}", file!(), line!()))
  };
}
