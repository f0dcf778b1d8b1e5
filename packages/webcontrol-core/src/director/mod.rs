//! Director REST API proxy.

pub mod proxy;

pub use proxy::{DirectorProxy, ProxyError, ProxyResult, ProxyTarget};
