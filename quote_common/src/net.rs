//! Shared networking constants and helpers used by client and server.

/// Default HTTP port of the quote service.
pub const DEFAULT_PORT: u16 = 9000;
/// Default bind host; the service is meant to sit next to its consumers.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Default base URL a client uses to reach a local quote service.
pub fn default_base_url() -> String {
    format!("http://{}", addr(DEFAULT_HOST, DEFAULT_PORT))
}
