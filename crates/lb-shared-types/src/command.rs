//! Agent command and answer envelopes
//!
//! One sealed variant per command kind; the resource dispatches them
//! through a single exhaustive match. Every command produces an
//! `Answer` value; failures never cross the boundary as errors.

use serde::{Deserialize, Serialize};

use crate::vip::{VipEnvironmentResult, VipResult, VipSpec};

/// Commands accepted by the network resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum NetworkCommand {
    AddOrRemoveVip(VipSpec),
    RegisterEquipmentAndIp(RegisterEquipmentAndIp),
    UnregisterEquipmentAndIp(UnregisterEquipmentAndIp),
    ListVipEnvironments,
}

/// Register a VM as controller equipment and bind its NIC IP.
///
/// Reals can only reference equipment that went through this flow; the
/// VIP converger never creates equipment on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterEquipmentAndIp {
    pub vm_name: String,
    pub nic_ip: String,
    #[serde(default)]
    pub nic_description: String,
    pub environment_id: i64,
    pub network_id: i64,
    pub equipment_model_id: i64,
    pub equipment_group_id: i64,
}

/// Release a VM's NIC IP and drop the equipment record once its last
/// IP is gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnregisterEquipmentAndIp {
    pub vm_name: String,
    #[serde(default)]
    pub nic_ip: Option<String>,
    #[serde(default)]
    pub environment_id: Option<i64>,
}

/// Outcome of one command: a definite success/failure signal plus
/// enough detail to diagnose a failure without server-side logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub result: bool,
    pub details: String,
    /// Controller application error code, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vip: Option<VipResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<VipEnvironmentResult>>,
}

impl Answer {
    pub fn success(details: impl Into<String>) -> Self {
        Answer {
            result: true,
            details: details.into(),
            error_code: None,
            vip: None,
            environments: None,
        }
    }

    pub fn failure(details: impl Into<String>) -> Self {
        Answer {
            result: false,
            details: details.into(),
            error_code: None,
            vip: None,
            environments: None,
        }
    }

    pub fn remote_error(code: i32, description: impl Into<String>) -> Self {
        Answer {
            result: false,
            details: description.into(),
            error_code: Some(code),
            vip: None,
            environments: None,
        }
    }

    pub fn with_vip(vip: VipResult) -> Self {
        Answer {
            result: true,
            details: "VIP converged".to_string(),
            error_code: None,
            vip: Some(vip),
            environments: None,
        }
    }

    pub fn with_environments(environments: Vec<VipEnvironmentResult>) -> Self {
        Answer {
            result: true,
            details: format!("{} VIP environments", environments.len()),
            error_code: None,
            vip: None,
            environments: Some(environments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips_through_json() {
        let raw = r#"{
            "command": "unregister_equipment_and_ip",
            "vm_name": "vm-42",
            "nic_ip": "10.0.0.54",
            "environment_id": 546
        }"#;
        let command: NetworkCommand = serde_json::from_str(raw).unwrap();
        match &command {
            NetworkCommand::UnregisterEquipmentAndIp(cmd) => {
                assert_eq!(cmd.vm_name, "vm-42");
                assert_eq!(cmd.nic_ip.as_deref(), Some("10.0.0.54"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let encoded = serde_json::to_string(&command).unwrap();
        let decoded: NetworkCommand = serde_json::from_str(&encoded).unwrap();
        assert!(matches!(
            decoded,
            NetworkCommand::UnregisterEquipmentAndIp(_)
        ));
    }

    #[test]
    fn answer_constructors() {
        assert!(Answer::success("ok").result);
        assert!(!Answer::failure("nope").result);

        let remote = Answer::remote_error(116, "VIP no longer exists");
        assert!(!remote.result);
        assert_eq!(remote.error_code, Some(116));
        assert_eq!(remote.details, "VIP no longer exists");
    }
}
