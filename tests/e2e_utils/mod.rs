#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod client;
pub mod graceful_server;

pub use client::{read_until_closed, read_until_contains, send_get};
pub use graceful_server::{TestGracefulServer, RESPONSE_BODY};
