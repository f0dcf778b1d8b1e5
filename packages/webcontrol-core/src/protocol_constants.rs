//! Fixed protocol constants and endpoint defaults.
//!
//! Values in the first two sections are defined by the cloud service and the
//! SDDP protocol. They are only defaults: components receive them through
//! their configuration structs so tests can point at local doubles.

// ─────────────────────────────────────────────────────────────────────────────
// Cloud Authentication Service
// ─────────────────────────────────────────────────────────────────────────────

/// Account login endpoint (POST, JSON body).
pub const CLOUD_AUTH_URL: &str = "https://apis.control4.com/authentication/v1/rest";

/// Controller authorization endpoint used to mint director tokens (POST).
pub const CLOUD_CONTROLLER_AUTH_URL: &str =
    "https://apis.control4.com/authentication/v1/rest/authorization";

/// Account listing endpoint (GET, bearer auth).
pub const CLOUD_ACCOUNTS_URL: &str = "https://apis.control4.com/account/v3/rest/accounts";

/// Application identifier sent with every login.
pub const APPLICATION_KEY: &str = "78f6791373d61bea49fdb9fb8897f1f3af193f11";

/// Service name requested when minting a controller-scoped token.
pub const DIRECTOR_SERVICE: &str = "director";

// ─────────────────────────────────────────────────────────────────────────────
// SDDP Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// SDDP multicast group.
pub const SDDP_MULTICAST_ADDR: [u8; 4] = [239, 255, 255, 250];

/// SDDP port. Note this is not the SSDP port (1900).
pub const SDDP_PORT: u16 = 1902;

/// How long a discovery call listens for announces (milliseconds).
pub const SDDP_WINDOW_MS: u64 = 4000;

/// Multicast TTL for the search datagram.
pub const SDDP_MULTICAST_TTL: u32 = 4;

/// Receive buffer for a single announce datagram.
pub const SDDP_RECV_BUFFER_SIZE: usize = 8192;

// ─────────────────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum number of redirect hops followed by the request client.
pub const MAX_REDIRECTS: usize = 5;

/// Per-request timeout for outbound HTTP calls (seconds).
///
/// Applies to each redirect hop individually.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "webcontrol";

/// Device name presented to the cloud service during login.
pub const CLIENT_DEVICE_NAME: &str = "WebControl4";

/// Device UUID presented to the cloud service during login.
pub const CLIENT_DEVICE_UUID: &str = "0000000000000001";

/// Default port for the relay's own HTTP server.
pub const DEFAULT_BIND_PORT: u16 = 3000;
