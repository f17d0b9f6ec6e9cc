mod body;
mod connection;
mod io;
mod responder;
mod server;

pub use connection::HyperConnection;
pub use responder::StaticResponder;
pub use server::HyperServer;
