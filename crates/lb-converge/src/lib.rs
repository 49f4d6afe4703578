//! netlb convergence engine
//!
//! Given a desired VIP state, computes and applies the minimal set of
//! remote operations to converge the network controller's actual state
//! to it: VIP create/update, per-port-pair real bindings, and the
//! equipment/IP registration the bindings depend on.

pub mod converger;
pub mod error;
pub mod reals;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod response;


pub use converger::{build_healthcheck_string, ConvergeReport, VipConverger};
pub use error::ConvergeError;
pub use reals::{reconcile_real, RealFailure};
pub use registry::{register_equipment_and_ip, unregister_equipment_and_ip};
pub use resolver::resolve_equipment_ip;
pub use resource::NetworkResource;
pub use response::build_vip_result;
