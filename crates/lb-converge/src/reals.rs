//! Real server reconciliation
//!
//! Brings one backend to its desired state on a VIP. The decision is
//! computed fresh from the `revoked` flag on every call; there is no
//! persisted state machine. Each port pair is one remote call, issued
//! in input order, and earlier pairs are not rolled back when a later
//! one fails.

use netlb_client::{NetworkApi, Vip};
use netlb_shared_types::{expand_port_pairs, RealSpec};

use crate::error::ConvergeError;
use crate::resolver::resolve_equipment_ip;

/// A real the converge could not bring to its desired state. Reals are
/// processed independently; one failure does not stop the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealFailure {
    pub ip: String,
    pub vm_name: String,
    pub reason: String,
}

/// Reconcile one real against `vip`.
///
/// revoked=false ensures every port-pair binding is present, skipping
/// pairs the fetched VIP already carries. revoked=true removes every
/// pair; a binding already absent remote-side is the controller's own
/// idempotent success, while application errors propagate.
pub async fn reconcile_real(
    api: &dyn NetworkApi,
    vip: &Vip,
    real: &RealSpec,
) -> Result<(), ConvergeError> {
    let vip_id = vip.id.ok_or_else(|| ConvergeError::Precondition {
        message: "cannot reconcile reals on a VIP without an id".to_string(),
    })?;

    let (equipment, ip) = resolve_equipment_ip(api, &real.vm_name, &real.ip).await?;
    let pairs = expand_port_pairs(&real.ports)?;

    for pair in pairs {
        if real.revoked {
            api.remove_real(vip_id, ip.id, equipment.id, pair.vip_port, pair.real_port)
                .await?;
            log::info!("removed real {} {} from VIP {}", real.ip, pair, vip_id);
        } else if vip.has_real_binding(ip.id, pair.vip_port, pair.real_port) {
            log::debug!(
                "real {} {} already bound to VIP {}, nothing to do",
                real.ip,
                pair,
                vip_id
            );
        } else {
            api.add_real(vip_id, ip.id, equipment.id, pair.vip_port, pair.real_port)
                .await?;
            log::info!("bound real {} {} to VIP {}", real.ip, pair, vip_id);
        }
    }

    Ok(())
}
