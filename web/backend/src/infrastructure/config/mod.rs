pub mod app_config;

pub use app_config::AppConfig;
pub use app_config::ServerConfig;
