//! SDDP multicast discovery.
//!
//! Sends one `SEARCH * SDDP/1.0` datagram to 239.255.255.250:1902 and collects
//! every reply that arrives on the same socket for a fixed window. Devices
//! answer unicast back to the sending socket/port.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

use super::types::{DeviceDiscovery, DiscoveredDevice, DiscoveryError, DiscoveryResult};
use crate::protocol_constants::{
    SDDP_MULTICAST_ADDR, SDDP_MULTICAST_TTL, SDDP_PORT, SDDP_RECV_BUFFER_SIZE, SDDP_WINDOW_MS,
};

/// Configuration for SDDP discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Where the search datagram is sent. The group is only joined when this
    /// is a multicast address.
    pub target: SocketAddrV4,
    /// Local interface address to bind (and join the group on).
    pub bind_addr: Ipv4Addr,
    /// Collection window, measured from socket bind.
    pub window: Duration,
    /// Multicast TTL for the search datagram.
    pub multicast_ttl: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            target: SocketAddrV4::new(Ipv4Addr::from(SDDP_MULTICAST_ADDR), SDDP_PORT),
            bind_addr: Ipv4Addr::UNSPECIFIED,
            window: Duration::from_millis(SDDP_WINDOW_MS),
            multicast_ttl: SDDP_MULTICAST_TTL,
        }
    }
}

/// Builds the search datagram. `Host` always names the search target.
fn build_search_message(target: &SocketAddrV4) -> String {
    format!(
        "SEARCH * SDDP/1.0\r\n\
         Host: {}\r\n\
         Man: \"sddp:discover\"\r\n\
         Type: sddp:all\r\n\r\n",
        target
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Socket Guard
// ─────────────────────────────────────────────────────────────────────────────

/// The discovery socket, owned by exactly one discovery call.
///
/// Closed when dropped, on every exit path.
struct SearchSocket {
    socket: UdpSocket,
    local: Option<SocketAddr>,
}

impl SearchSocket {
    /// Creates, configures and binds the socket, joining the multicast group
    /// when the target is one.
    fn open(config: &DiscoveryConfig) -> DiscoveryResult<Self> {
        let bind_addr = SocketAddr::new(config.bind_addr.into(), 0);

        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(DiscoveryError::SocketBind)?;

        if let Err(e) = socket.set_reuse_address(true) {
            log::warn!("[SDDP] Failed to set SO_REUSEADDR: {}", e);
        }

        #[cfg(unix)]
        if let Err(e) = socket.set_reuse_port(true) {
            log::warn!("[SDDP] Failed to set SO_REUSEPORT: {}", e);
        }

        if let Err(e) = socket.set_multicast_ttl_v4(config.multicast_ttl) {
            log::warn!("[SDDP] Failed to set multicast TTL: {}", e);
        }

        socket
            .set_nonblocking(true)
            .map_err(DiscoveryError::SocketBind)?;

        socket
            .bind(&bind_addr.into())
            .map_err(DiscoveryError::SocketBind)?;

        let group = *config.target.ip();
        if group.is_multicast() {
            socket
                .join_multicast_v4(&group, &config.bind_addr)
                .map_err(DiscoveryError::JoinGroup)?;
        }

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket).map_err(DiscoveryError::SocketBind)?;
        let local = socket.local_addr().ok();
        log::debug!("[SDDP] Discovery socket bound on {:?}", local);

        Ok(Self { socket, local })
    }

    async fn send_search(&self, target: SocketAddrV4) -> DiscoveryResult<()> {
        let msg = build_search_message(&target);
        self.socket
            .send_to(msg.as_bytes(), target)
            .await
            .map_err(DiscoveryError::SendSearch)?;
        log::trace!("[SDDP] Sent search to {}", target);
        Ok(())
    }

    /// Collects datagrams until `deadline`, in arrival order.
    async fn collect_until(&self, deadline: Instant) -> Vec<DiscoveredDevice> {
        let mut found = Vec::new();
        let mut buf = vec![0u8; SDDP_RECV_BUFFER_SIZE];

        loop {
            match timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Ok(Ok((amt, src))) => {
                    let text = String::from_utf8_lossy(&buf[..amt]).into_owned();
                    let device = DiscoveredDevice::from_datagram(src.ip(), src.port(), text);
                    log::debug!(
                        "[SDDP] Response from {}:{} ({} header(s))",
                        device.ip,
                        device.port,
                        device.headers.len()
                    );
                    found.push(device);
                }
                Ok(Err(e)) => {
                    log::warn!("[SDDP] Socket recv error: {}", e);
                }
                Err(_) => break,
            }
        }

        found
    }
}

impl Drop for SearchSocket {
    fn drop(&mut self) {
        log::trace!("[SDDP] Closing discovery socket {:?}", self.local);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// SDDP implementation of [`DeviceDiscovery`].
///
/// Each call opens its own socket; nothing is shared between calls.
pub struct SddpDiscovery {
    config: DiscoveryConfig,
}

impl SddpDiscovery {
    #[must_use]
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DeviceDiscovery for SddpDiscovery {
    async fn discover(&self) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        let socket = SearchSocket::open(&self.config)?;
        let deadline = Instant::now() + self.config.window;

        socket.send_search(self.config.target).await?;
        let found = socket.collect_until(deadline).await;
        drop(socket);

        log::info!(
            "[SDDP] Discovery complete: {} response(s) in {}ms",
            found.len(),
            self.config.window.as_millis()
        );
        Ok(found)
    }
}
