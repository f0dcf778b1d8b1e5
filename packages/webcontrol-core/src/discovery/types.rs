//! Shared types for SDDP device discovery.

use std::collections::BTreeMap;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during discovery.
///
/// Receive errors inside the collection window are not fatal and never
/// surface here.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to create or bind the UDP socket.
    #[error("failed to bind UDP socket: {0}")]
    SocketBind(#[source] std::io::Error),

    /// Failed to join the multicast group.
    #[error("failed to join multicast group: {0}")]
    JoinGroup(#[source] std::io::Error),

    /// Failed to send the search datagram.
    #[error("failed to send SDDP search: {0}")]
    SendSearch(#[source] std::io::Error),
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// One announce datagram received during a discovery window.
///
/// Serialized with the parsed headers flattened next to `ip`, `port` and
/// `raw`, which is the shape the web UI consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// Sender address.
    pub ip: IpAddr,
    /// Sender port.
    pub port: u16,
    /// Full datagram text.
    pub raw: String,
    /// Lower-cased header names to trimmed values.
    #[serde(flatten)]
    pub headers: BTreeMap<String, String>,
}

impl DiscoveredDevice {
    /// Builds an entry from a received datagram.
    pub fn from_datagram(ip: IpAddr, port: u16, raw: String) -> Self {
        let headers = parse_sddp_headers(&raw);
        Self {
            ip,
            port,
            raw,
            headers,
        }
    }

    /// Looks up a header by its lower-case name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Parses the header lines of an SDDP datagram.
///
/// Each line is split on its first colon; the left side, trimmed and
/// lower-cased, becomes the key and the trimmed right side the value. Lines
/// without a colon (such as the method line), a colon in first position, or
/// an empty key are skipped. A repeated key keeps the last value.
pub fn parse_sddp_headers(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| {
            let idx = line.find(':').filter(|&i| i > 0)?;
            let key = line[..idx].trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), line[idx + 1..].trim().to_string()))
        })
        .collect()
}

/// Locates devices on the local network.
///
/// Used by the API layer so handlers can be tested without sockets.
#[async_trait]
pub trait DeviceDiscovery: Send + Sync {
    /// Runs one discovery window and returns every announce received, in
    /// arrival order.
    async fn discover(&self) -> DiscoveryResult<Vec<DiscoveredDevice>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::Ipv4Addr;

    #[test]
    fn parses_status_and_host() {
        let headers = parse_sddp_headers("STATUS: ALIVE\r\nHOST: device1\r\n\r\n");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["status"], "ALIVE");
        assert_eq!(headers["host"], "device1");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let headers = parse_sddp_headers(
            "NOTIFY ALIVE SDDP/1.0\r\nFrom: \"192.168.1.20:1902\"\r\nHost: \"control4-core-abc\"\r\n",
        );
        assert_eq!(headers["from"], "\"192.168.1.20:1902\"");
        assert_eq!(headers["host"], "\"control4-core-abc\"");
        assert!(!headers.keys().any(|k| k.contains("notify")));
    }

    #[test]
    fn skips_non_conforming_lines() {
        let headers = parse_sddp_headers(":leading colon\r\n   : blank key\r\nno colon here\r\nType: c4:director\r\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["type"], "c4:director");
    }

    #[test]
    fn later_duplicate_wins() {
        let headers = parse_sddp_headers("Max-Age: 10\r\nMAX-AGE: 1800\r\n");
        assert_eq!(headers["max-age"], "1800");
    }

    #[test]
    fn accepts_bare_newlines() {
        let headers = parse_sddp_headers("Status: ALIVE\nHost: device1\n");
        assert_eq!(headers["host"], "device1");
    }

    #[test]
    fn device_serializes_headers_flat() {
        let device = DiscoveredDevice::from_datagram(
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)),
            1902,
            "STATUS: ALIVE\r\nHOST: device1\r\n\r\n".into(),
        );
        assert_eq!(device.header("status"), Some("ALIVE"));
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({
                "ip": "192.168.1.20",
                "port": 1902,
                "raw": "STATUS: ALIVE\r\nHOST: device1\r\n\r\n",
                "status": "ALIVE",
                "host": "device1"
            })
        );
    }
}
