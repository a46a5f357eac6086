//! HTTP API handlers for gbeat-fx

pub mod fix;
pub mod health;

pub use fix::fix_routes;
pub use health::health_routes;
