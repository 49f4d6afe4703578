//! Controller-side data model
//!
//! Transient mirrors of the controller's VIP, real, equipment and IP
//! records. The controller owns this state; these values live only
//! for the duration of one command.

use serde::{Deserialize, Serialize};

/// Remote equipment record, referenced by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
}

/// Remote IPv4 record. An IP may be bound to several equipments
/// (shared IP), so lookups must match the dotted-quad literal rather
/// than assume one IP per equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4 {
    pub id: i64,
    pub oct1: u8,
    pub oct2: u8,
    pub oct3: u8,
    pub oct4: u8,
    #[serde(default)]
    pub equipments: Vec<String>,
}

impl Ipv4 {
    /// Dotted-quad literal for this record.
    pub fn address(&self) -> String {
        format!("{}.{}.{}.{}", self.oct1, self.oct2, self.oct3, self.oct4)
    }
}

/// One backend binding as the controller stores it: a single
/// vip-port/real-port pair per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealIp {
    pub ip_id: i64,
    pub name: String,
    pub real_ip: String,
    pub vip_port: u16,
    pub real_port: u16,
}

/// VIP environment triple; scopes IP allocation and carries the
/// denormalized names the VIP attribute operations take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipEnvironment {
    pub id: i64,
    pub finality: String,
    pub client: String,
    pub environment_name: String,
}

/// Remote VIP record.
///
/// `created` tracks whether the VIP was activated in load-balancer
/// equipment; a VIP can exist in validated state without being
/// created there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vip {
    pub id: Option<i64>,
    #[serde(default)]
    pub ip_id: Option<i64>,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub finality: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub cache: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub persistence: String,
    #[serde(default)]
    pub healthcheck_type: String,
    #[serde(default)]
    pub healthcheck: String,
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub max_conn: u32,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub business_area: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_ports: Vec<String>,
    #[serde(default)]
    pub reals: Vec<RealIp>,
    #[serde(default)]
    pub created: bool,
}

impl Vip {
    /// Whether a (ip id, port pair) binding is already attached.
    pub fn has_real_binding(&self, ip_id: i64, vip_port: u16, real_port: u16) -> bool {
        self.reals
            .iter()
            .any(|r| r.ip_id == ip_id && r.vip_port == vip_port && r.real_port == real_port)
    }
}

/// Denormalized attribute set consumed by the controller's VIP add and
/// alter operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VipPayload {
    pub ip_id: i64,
    pub finality: String,
    pub client: String,
    pub environment: String,
    pub cache: String,
    pub method: String,
    pub persistence: String,
    pub healthcheck_type: String,
    pub healthcheck: String,
    pub timeout: u32,
    pub host: String,
    pub max_conn: u32,
    pub business_area: String,
    pub service_name: String,
    pub service_ports: Vec<String>,
    pub reals: Vec<RealIp>,
}
