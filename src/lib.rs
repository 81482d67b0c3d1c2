pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod service;

pub use crate::config::AppConfig;
pub use crate::service::{CancellationCoordinator, CrawlController, CrawlReport};
