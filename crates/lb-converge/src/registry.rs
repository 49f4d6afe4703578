//! Equipment and IP registration
//!
//! Keeps the controller inventory in step with the hypervisor: every VM
//! that backs a VIP exists in the controller as an equipment of the VM
//! type, with its NIC IPs associated to it.

use netlb_client::{Equipment, NetworkApi};
use netlb_shared_types::{RegisterEquipmentAndIp, UnregisterEquipmentAndIp};

use crate::error::ConvergeError;

/// Controller equipment type for virtual machines.
const VM_EQUIPMENT_TYPE: i64 = 10;

/// Ensure the VM equipment exists and its NIC IP is registered and
/// associated with it. Both steps are find-or-create, so replaying the
/// command is harmless.
pub async fn register_equipment_and_ip(
    api: &dyn NetworkApi,
    cmd: &RegisterEquipmentAndIp,
) -> Result<String, ConvergeError> {
    let equipment = match api.find_equipment_by_name(&cmd.vm_name).await? {
        Some(equipment) => equipment,
        None => {
            log::info!("registering equipment {} in the controller", cmd.vm_name);
            api.insert_equipment(
                &cmd.vm_name,
                VM_EQUIPMENT_TYPE,
                cmd.equipment_model_id,
                cmd.equipment_group_id,
            )
            .await?
        }
    };

    register_nic_ip(api, cmd, &equipment).await?;

    Ok(format!(
        "registered equipment {} with IP {}",
        cmd.vm_name, cmd.nic_ip
    ))
}

async fn register_nic_ip(
    api: &dyn NetworkApi,
    cmd: &RegisterEquipmentAndIp,
    equipment: &Equipment,
) -> Result<(), ConvergeError> {
    match api
        .find_ip_by_ip_and_environment(&cmd.nic_ip, cmd.environment_id)
        .await?
    {
        None => {
            log::info!("registering IP {} for {}", cmd.nic_ip, cmd.vm_name);
            api.save_ipv4(&cmd.nic_ip, equipment.id, &cmd.nic_description, cmd.network_id)
                .await?;
        }
        Some(ip) => {
            // The search result carries no equipment list, so re-read
            // the record before deciding whether to associate.
            let ip = api.get_ipv4(ip.id).await?;
            if ip.equipments.iter().any(|name| name == &cmd.vm_name) {
                log::debug!("IP {} already associated with {}", cmd.nic_ip, cmd.vm_name);
            } else {
                api.assoc_ipv4(ip.id, equipment.id, cmd.network_id).await?;
            }
        }
    }
    Ok(())
}

/// Remove a NIC IP from the VM equipment, and the equipment itself once
/// its last IP is gone. Missing records are treated as already removed.
pub async fn unregister_equipment_and_ip(
    api: &dyn NetworkApi,
    cmd: &UnregisterEquipmentAndIp,
) -> Result<String, ConvergeError> {
    let equipment = match api.find_equipment_by_name(&cmd.vm_name).await? {
        Some(equipment) => equipment,
        None => {
            log::warn!(
                "equipment {} not found in the controller, nothing to unregister",
                cmd.vm_name
            );
            return Ok(format!("equipment {} already removed", cmd.vm_name));
        }
    };

    if let (Some(nic_ip), Some(environment_id)) = (&cmd.nic_ip, cmd.environment_id) {
        match api
            .find_ip_by_ip_and_environment(nic_ip, environment_id)
            .await?
        {
            Some(ip) => {
                api.remove_equipment_ip(equipment.id, ip.id).await?;
            }
            None => {
                log::warn!("IP {} not found in environment {}", nic_ip, environment_id);
            }
        }
    }

    let remaining = api.find_ips_by_equipment(equipment.id).await?;
    if remaining.is_empty() {
        log::info!("removing equipment {}, no IPs left", cmd.vm_name);
        api.delete_equipment(equipment.id).await?;
    }

    Ok(format!("unregistered IP from equipment {}", cmd.vm_name))
}
