//! LAN discovery of director devices.
//!
//! - `types` - `DiscoveredDevice`, header parsing, errors and the
//!   `DeviceDiscovery` trait
//! - `sddp` - SDDP multicast search/announce implementation

pub mod sddp;
pub mod types;

pub use sddp::{DiscoveryConfig, SddpDiscovery};
pub use types::{
    parse_sddp_headers, DeviceDiscovery, DiscoveredDevice, DiscoveryError, DiscoveryResult,
};
