pub mod hyper_server;
pub mod trigger;

pub use hyper_server::{HyperConnection, HyperServer, StaticResponder};
pub use trigger::*;
