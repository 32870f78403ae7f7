pub mod client;
pub mod config;
pub mod error;
pub mod explore;
pub mod logging;
pub mod scraper;
pub mod utils;

pub use crate::client::{Client, ClientBuilder, ClientResponse};
pub use crate::config::Config;
pub use crate::error::{AppError, ClientError, ConfigError, ExtractError, Result};
pub use crate::explore::Explore;
pub use crate::scraper::Scraper;
