//! netlb remote controller client
//!
//! Client for the network controller's VIP, real, equipment, IP and
//! environment operations. The engine consumes the `NetworkApi` trait;
//! `HttpNetworkApi` is the production implementation.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod model;

pub use api::{ApiResult, NetworkApi};
pub use config::NetworkApiConfig;
pub use error::NetworkApiError;
pub use http::HttpNetworkApi;
pub use model::{Equipment, Ipv4, RealIp, Vip, VipEnvironment, VipPayload};
