//! Caller-facing VIP result assembly
//!
//! Pure transformation of the controller VIP record into the result
//! shape; no remote calls.

use indexmap::IndexMap;
use netlb_client::Vip;
use netlb_shared_types::{PortPair, RealResult, VipResult};

/// Map a controller VIP onto the caller-facing result.
///
/// The controller stores one port pair per real record; callers expect
/// all pairs for the same backend IP grouped under one entry, so the
/// records are regrouped by ip id in first-seen order.
pub fn build_vip_result(vip: &Vip) -> VipResult {
    let mut grouped: IndexMap<i64, RealResult> = IndexMap::new();
    for real in &vip.reals {
        let entry = grouped.entry(real.ip_id).or_insert_with(|| RealResult {
            ip: real.real_ip.clone(),
            vm_name: real.name.clone(),
            ports: Vec::new(),
        });
        entry.ports.push(
            PortPair {
                vip_port: real.vip_port,
                real_port: real.real_port,
            }
            .to_string(),
        );
    }

    VipResult {
        id: vip.id.unwrap_or_default(),
        ip: vip.ips.first().cloned().unwrap_or_default(),
        name: vip.host.clone(),
        method: vip.method.clone(),
        cache: vip.cache.clone(),
        persistence: vip.persistence.clone(),
        healthcheck_type: vip.healthcheck_type.clone(),
        healthcheck: vip.healthcheck.clone(),
        max_conn: vip.max_conn,
        ports: vip.service_ports.clone(),
        reals: grouped.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netlb_client::RealIp;

    fn vip_with_reals(reals: Vec<RealIp>) -> Vip {
        Vip {
            id: Some(987),
            ip_id: Some(345),
            ips: vec!["192.168.1.15".to_string()],
            finality: "BACKEND".to_string(),
            client: "CLIENT".to_string(),
            environment: "TESTAPI".to_string(),
            cache: "(nenhum)".to_string(),
            method: "least-conn".to_string(),
            persistence: "(nenhum)".to_string(),
            healthcheck_type: "TCP".to_string(),
            healthcheck: String::new(),
            timeout: 5,
            max_conn: 0,
            host: "vip.domain.com".to_string(),
            business_area: "vipbusiness".to_string(),
            service_name: "vipservice".to_string(),
            service_ports: vec!["80:8080".to_string(), "443:8443".to_string()],
            reals,
            created: true,
        }
    }

    fn real(ip_id: i64, ip: &str, vip_port: u16, real_port: u16) -> RealIp {
        RealIp {
            ip_id,
            name: format!("vm-{}", ip_id),
            real_ip: ip.to_string(),
            vip_port,
            real_port,
        }
    }

    #[test]
    fn maps_vip_fields_one_to_one() {
        let result = build_vip_result(&vip_with_reals(vec![]));
        assert_eq!(result.id, 987);
        assert_eq!(result.ip, "192.168.1.15");
        assert_eq!(result.name, "vip.domain.com");
        assert_eq!(result.method, "least-conn");
        assert_eq!(result.cache, "(nenhum)");
        assert_eq!(result.ports.len(), 2);
        assert!(result.reals.is_empty());
    }

    #[test]
    fn groups_real_records_by_ip_id() {
        let vip = vip_with_reals(vec![
            real(101, "10.0.0.54", 80, 8080),
            real(102, "10.0.0.55", 80, 8080),
            real(101, "10.0.0.54", 443, 8443),
        ]);
        let result = build_vip_result(&vip);

        assert_eq!(result.reals.len(), 2);
        assert_eq!(result.reals[0].ip, "10.0.0.54");
        assert_eq!(
            result.reals[0].ports,
            vec!["80:8080".to_string(), "443:8443".to_string()]
        );
        assert_eq!(result.reals[1].ip, "10.0.0.55");
        assert_eq!(result.reals[1].ports, vec!["80:8080".to_string()]);
    }

    #[test]
    fn single_pair_real_keeps_one_entry() {
        let vip = vip_with_reals(vec![real(101, "10.170.10.2", 80, 8080)]);
        let result = build_vip_result(&vip);
        assert_eq!(result.reals.len(), 1);
        assert_eq!(result.reals[0].ports.len(), 1);
        assert_eq!(result.reals[0].vm_name, "vm-101");
    }
}
