use std::time::Duration;

/// Address used when the caller leaves the bind address empty.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:80";

/// Turns a caller-facing bind address into something `TcpListener::bind` accepts.
///
/// An empty address means the default HTTP port, and a bare `:port` binds every interface.
pub fn normalize_bind_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.is_empty() {
        return DEFAULT_BIND_ADDR.to_string();
    }
    match addr.strip_prefix(':') {
        Some("http") => DEFAULT_BIND_ADDR.to_string(),
        Some(port) => format!("0.0.0.0:{}", port),
        None => addr.to_string(),
    }
}

/// How the connection tracker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerOutcome {
    /// Every tracked connection went idle or closed after a drain request.
    Drained,
    /// A force-kill closed the remaining connections.
    Killed { closed: usize },
    /// All event senders went away before a drain or kill was requested.
    Abandoned { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    /// Zero waits for in-flight connections forever.
    pub drain_timeout_ms: u64,
    pub handle_sigterm: bool,
    pub response_body: String,
    pub response_delay_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            drain_timeout_ms: 10_000,
            handle_sigterm: true,
            response_body: "ok\n".to_string(),
            response_delay_ms: 0,
        }
    }
}

impl ServerConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}
