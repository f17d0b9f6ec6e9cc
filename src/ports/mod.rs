pub mod handler;
pub mod server;
pub mod tracking;
pub mod trigger;

pub use handler::{Body, RequestHandler};
pub use server::ServerPort;
pub use tracking::{TrackedConnection, TrackingPort};
pub use trigger::TerminationTrigger;
