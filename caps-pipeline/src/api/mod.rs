//! HTTP API handlers for caps-pipeline

pub mod health;
pub mod pipeline;

pub use health::health_routes;
pub use pipeline::pipeline_routes;
