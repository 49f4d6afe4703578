//! Port pair parsing and expansion
//!
//! A VIP forwards traffic from a public port to a backend port. The
//! controller exposes per-port-pair operations for reals, so the
//! "80:8080" strings carried by commands are expanded into individual
//! pairs before remote calls are issued. Expansion preserves input
//! order; it determines the order remote calls go out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// A single (public port, backend port) mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortPair {
    pub vip_port: u16,
    pub real_port: u16,
}

impl FromStr for PortPair {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| SpecError::MalformedPortPair {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.split(':');
        let vip_part = parts.next().unwrap_or_default();
        let real_part = parts.next().ok_or_else(|| malformed("missing ':' separator"))?;
        if parts.next().is_some() {
            return Err(malformed("more than one ':' separator"));
        }

        let vip_port =
            parse_port(vip_part).ok_or_else(|| malformed("public port is not a valid port"))?;
        let real_port =
            parse_port(real_part).ok_or_else(|| malformed("backend port is not a valid port"))?;

        Ok(PortPair { vip_port, real_port })
    }
}

impl fmt::Display for PortPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vip_port, self.real_port)
    }
}

fn parse_port(s: &str) -> Option<u16> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => None,
        Ok(port) => Some(port),
    }
}

/// Expand a list of "pub:priv" strings into pairs, preserving order.
pub fn expand_port_pairs(ports: &[String]) -> Result<Vec<PortPair>, SpecError> {
    ports.iter().map(|p| p.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_round_trips() {
        let pair: PortPair = "80:8080".parse().unwrap();
        assert_eq!(pair.vip_port, 80);
        assert_eq!(pair.real_port, 8080);
        assert_eq!(pair.to_string(), "80:8080");
    }

    #[test]
    fn expansion_preserves_input_order() {
        let ports = vec!["443:8443".to_string(), "80:8080".to_string()];
        let pairs = expand_port_pairs(&ports).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].to_string(), "443:8443");
        assert_eq!(pairs[1].to_string(), "80:8080");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = "80-8080".parse::<PortPair>().unwrap_err();
        assert!(matches!(err, SpecError::MalformedPortPair { .. }));
    }

    #[test]
    fn rejects_extra_separator() {
        assert!("80:8080:90".parse::<PortPair>().is_err());
    }

    #[test]
    fn rejects_out_of_range_ports() {
        assert!("0:8080".parse::<PortPair>().is_err());
        assert!("80:0".parse::<PortPair>().is_err());
        assert!("65536:80".parse::<PortPair>().is_err());
        assert!("abc:80".parse::<PortPair>().is_err());
    }

    #[test]
    fn one_bad_entry_fails_the_whole_expansion() {
        let ports = vec!["80:8080".to_string(), "80-8080".to_string()];
        assert!(expand_port_pairs(&ports).is_err());
    }
}
