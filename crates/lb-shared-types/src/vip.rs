//! Desired-state and result shapes for VIP provisioning

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::ports::expand_port_pairs;

/// Whether the caller wants the load-balancer rule present or gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    Add,
    Revoke,
}

/// Session persistence requested for a VIP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistencePolicy {
    pub method: String,
}

/// Controller literal for "none" (cache and persistence).
pub const NONE_VALUE: &str = "(nenhum)";

impl PersistencePolicy {
    /// Controller-side persistence value for this policy.
    pub fn controller_value(&self) -> String {
        match self.method.to_ascii_lowercase().as_str() {
            "cookie" => "cookie".to_string(),
            "source-ip" | "sourceip" | "source_ip" => "source-ip".to_string(),
            "" | "none" => NONE_VALUE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Health check requested for a VIP.
///
/// `check` is either a bare expectation/path or a complete HTTP
/// request line; the engine qualifies it with the VIP host before
/// handing it to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthcheckPolicy {
    pub check: String,
    #[serde(default)]
    pub response_timeout: u32,
    #[serde(default)]
    pub check_interval: u32,
    #[serde(default)]
    pub unhealthy_threshold: u32,
    #[serde(default)]
    pub healthy_threshold: u32,
}

/// A backend server that should be attached to (or detached from) a
/// VIP. `revoked` selects removal; `environment_id` scopes the IP
/// lookup on the controller side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealSpec {
    pub vm_name: String,
    pub ip: String,
    pub ports: Vec<String>,
    #[serde(default)]
    pub revoked: bool,
    pub environment_id: i64,
}

/// Desired state for one VIP, supplied by the caller per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VipSpec {
    #[serde(default)]
    pub vip_id: Option<i64>,
    pub address: String,
    pub host: String,
    pub method_bal: String,
    pub vip_environment_id: i64,
    #[serde(default)]
    pub business_area: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub cache: Option<String>,
    pub ports: Vec<String>,
    #[serde(default)]
    pub reals: Vec<RealSpec>,
    pub rule_state: RuleState,
    #[serde(default)]
    pub persistence_policy: Option<PersistencePolicy>,
    #[serde(default)]
    pub healthcheck_policy: Option<HealthcheckPolicy>,
}

impl VipSpec {
    /// Parse-level validation. Runs before any remote call so that a
    /// malformed spec produces no partial remote work.
    pub fn validate(&self) -> Result<(), SpecError> {
        parse_ipv4(&self.address)?;
        expand_port_pairs(&self.ports)?;
        for real in &self.reals {
            parse_ipv4(&real.ip)?;
            expand_port_pairs(&real.ports)?;
        }
        Ok(())
    }

    /// Controller-side balancing method for the caller-supplied name.
    pub fn controller_balancing_method(&self) -> String {
        match self.method_bal.as_str() {
            "roundrobin" => "round-robin".to_string(),
            "leastconn" => "least-conn".to_string(),
            other => other.to_string(),
        }
    }
}

fn parse_ipv4(value: &str) -> Result<Ipv4Addr, SpecError> {
    value.parse::<Ipv4Addr>().map_err(|_| SpecError::InvalidIpv4 {
        value: value.to_string(),
    })
}

/// One backend entry in a VIP result; all port pairs for the same
/// backend IP are grouped under a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealResult {
    pub ip: String,
    pub vm_name: String,
    pub ports: Vec<String>,
}

/// Caller-facing view of a converged VIP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VipResult {
    pub id: i64,
    pub ip: String,
    pub name: String,
    pub method: String,
    pub cache: String,
    pub persistence: String,
    pub healthcheck_type: String,
    pub healthcheck: String,
    pub max_conn: u32,
    pub ports: Vec<String>,
    pub reals: Vec<RealResult>,
}

/// VIP environment triple as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipEnvironmentResult {
    pub id: i64,
    pub finality: String,
    pub client: String,
    pub environment_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> VipSpec {
        VipSpec {
            vip_id: None,
            address: "192.168.1.15".to_string(),
            host: "vip.domain.com".to_string(),
            method_bal: "leastconn".to_string(),
            vip_environment_id: 123,
            business_area: "vipbusiness".to_string(),
            service_name: "vipservice".to_string(),
            cache: None,
            ports: vec!["80:8080".to_string()],
            reals: vec![],
            rule_state: RuleState::Add,
            persistence_policy: None,
            healthcheck_policy: None,
        }
    }

    #[test]
    fn validates_address_and_ports() {
        assert!(spec().validate().is_ok());

        let mut bad_addr = spec();
        bad_addr.address = "300.1.2.3".to_string();
        assert!(matches!(
            bad_addr.validate(),
            Err(SpecError::InvalidIpv4 { .. })
        ));

        let mut bad_ports = spec();
        bad_ports.ports = vec!["80-8080".to_string()];
        assert!(matches!(
            bad_ports.validate(),
            Err(SpecError::MalformedPortPair { .. })
        ));
    }

    #[test]
    fn validates_real_entries() {
        let mut s = spec();
        s.reals = vec![RealSpec {
            vm_name: "vm-1".to_string(),
            ip: "10.0.0.54".to_string(),
            ports: vec!["80:8080:90".to_string()],
            revoked: false,
            environment_id: 546,
        }];
        assert!(s.validate().is_err());
    }

    #[test]
    fn translates_balancing_method() {
        let mut s = spec();
        assert_eq!(s.controller_balancing_method(), "least-conn");
        s.method_bal = "roundrobin".to_string();
        assert_eq!(s.controller_balancing_method(), "round-robin");
        s.method_bal = "weighted".to_string();
        assert_eq!(s.controller_balancing_method(), "weighted");
    }

    #[test]
    fn translates_persistence_method() {
        let cookie = PersistencePolicy {
            method: "Cookie".to_string(),
        };
        assert_eq!(cookie.controller_value(), "cookie");

        let source = PersistencePolicy {
            method: "SourceIp".to_string(),
        };
        assert_eq!(source.controller_value(), "source-ip");

        let none = PersistencePolicy {
            method: String::new(),
        };
        assert_eq!(none.controller_value(), NONE_VALUE);
    }
}
