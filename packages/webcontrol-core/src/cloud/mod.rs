//! Cloud authentication service client.

pub mod gateway;
pub mod types;

pub use gateway::{CloudAuthGateway, CloudError, CloudFailure, CloudResult};
pub use types::{AccountToken, CloudConfig, DeviceIdentity, DirectorToken};
