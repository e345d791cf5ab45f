pub mod config;
pub mod types;

pub use config::FilterConfig;
pub use types::*;
