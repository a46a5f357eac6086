//! HTTP API handlers for gbeat-sl

pub mod health;
pub mod slogan;

pub use health::health_routes;
pub use slogan::slogan_routes;
