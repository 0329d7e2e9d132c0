//! Core business logic: rate acquisition, favorites, ranking and derivation

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod currency;
pub mod error;
pub mod favorites;
pub mod format;
pub mod log;
pub mod metals;
pub mod rate_manager;
pub mod rates;
pub mod ranking;

// Re-export main types for cleaner imports
pub use error::RateError;
pub use rate_manager::{RateCacheManager, RateSnapshot};
pub use rates::{RateProvider, RateTable};
