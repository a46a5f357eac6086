//! HTTP API handlers for gbeat-rc

pub mod health;
pub mod rhythm;
pub mod song;
pub mod status;

pub use health::health_routes;
pub use rhythm::rhythm_routes;
pub use song::song_routes;
pub use status::status_routes;
