pub mod config;
pub mod connectors;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod normalize;
