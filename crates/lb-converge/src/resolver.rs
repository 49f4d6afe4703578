//! Equipment and IP resolution
//!
//! Translates a real's (equipment name, IP literal) into the
//! controller-side identifiers a real-server binding needs. Purely a
//! read path of two sequential remote lookups; registration of new
//! equipment is a separate flow (see `registry`).

use netlb_client::{Equipment, Ipv4, NetworkApi};

use crate::error::ConvergeError;

/// Resolve `equipment_name` and the bound IP matching `ip_literal`.
///
/// An equipment may carry several IPs and an IP may be shared by
/// several equipments, so the match is on the exact dotted-quad
/// literal. A missing equipment or an unmatched literal is a hard
/// error: issuing a real operation with a guessed ip id would silently
/// corrupt the remote load-balancer configuration.
pub async fn resolve_equipment_ip(
    api: &dyn NetworkApi,
    equipment_name: &str,
    ip_literal: &str,
) -> Result<(Equipment, Ipv4), ConvergeError> {
    let equipment = api
        .find_equipment_by_name(equipment_name)
        .await?
        .ok_or_else(|| ConvergeError::NotFound {
            resource: format!("equipment '{}'", equipment_name),
        })?;

    let ips = api.find_ips_by_equipment(equipment.id).await?;
    let ip = ips
        .into_iter()
        .find(|ip| ip.address() == ip_literal)
        .ok_or_else(|| ConvergeError::NotFound {
            resource: format!("IP {} on equipment '{}'", ip_literal, equipment_name),
        })?;

    Ok((equipment, ip))
}
