pub mod config;
pub mod evaluate;
