//! netlb shared types
//!
//! Plain data carried between the agent boundary and the convergence
//! engine: commands, answers and the caller-facing VIP model.

pub mod command;
pub mod error;
pub mod ports;
pub mod vip;

pub use command::{Answer, NetworkCommand, RegisterEquipmentAndIp, UnregisterEquipmentAndIp};
pub use error::SpecError;
pub use ports::{expand_port_pairs, PortPair};
pub use vip::{
    HealthcheckPolicy, PersistencePolicy, RealResult, RealSpec, RuleState, VipEnvironmentResult,
    VipResult, VipSpec, NONE_VALUE,
};
