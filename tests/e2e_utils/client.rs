#![cfg(test)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Open a connection and send a keep-alive GET request on it.
pub async fn send_get(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr)
        .await
        .expect("Should be able to connect to the server");

    let request = format!("GET / HTTP/1.1\r\nHost: {}\r\n\r\n", addr);
    stream
        .write_all(request.as_bytes())
        .await
        .expect("Should be able to write the request");

    stream
}

/// Read everything until the server closes the connection.
pub async fn read_until_closed(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match timeout(Duration::from_secs(5), stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => data.extend_from_slice(&chunk[..n]),
            // A reset counts as closed too
            Ok(Err(_)) => break,
            Err(_) => panic!("server kept the connection open"),
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// Read until `needle` shows up, leaving the connection open.
pub async fn read_until_contains(stream: &mut TcpStream, needle: &str) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    while !String::from_utf8_lossy(&data).contains(needle) {
        let n = timeout(Duration::from_secs(5), stream.read(&mut chunk))
            .await
            .expect("Should receive a response within timeout")
            .expect("Should be able to read the response");
        assert!(n > 0, "connection closed before {:?} arrived", needle);
        data.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&data).into_owned()
}
