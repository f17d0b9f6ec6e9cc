pub mod errors;
pub mod models;
pub mod service;
pub mod tracker;

pub use errors::*;
pub use models::*;
pub use service::ShutdownOrchestrator;
pub use tracker::{ConnectionTracker, TrackerHandle};
