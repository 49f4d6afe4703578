//! Remote controller client surface
//!
//! Method-level contract of the network controller. The engine issues
//! these calls strictly in sequence; retry and timeout policy lives in
//! the implementation, not in callers.

use async_trait::async_trait;

use crate::error::NetworkApiError;
use crate::model::{Equipment, Ipv4, Vip, VipEnvironment, VipPayload};

pub type ApiResult<T> = Result<T, NetworkApiError>;

#[async_trait]
pub trait NetworkApi: Send + Sync {
    // VIP operations
    async fn get_vips_by_ip(&self, ip: &str) -> ApiResult<Vec<Vip>>;
    async fn get_vip_by_id(&self, vip_id: i64) -> ApiResult<Vip>;
    async fn add_vip(&self, payload: &VipPayload) -> ApiResult<Vip>;
    async fn alter_vip(&self, vip_id: i64, payload: &VipPayload) -> ApiResult<Vip>;
    /// Consistency validation in the controller database.
    async fn validate_vip(&self, vip_id: i64) -> ApiResult<()>;
    /// Activation in the load-balancer equipment; distinct from the
    /// database add and must follow it.
    async fn create_vip(&self, vip_id: i64) -> ApiResult<()>;
    async fn alter_vip_persistence(&self, vip_id: i64, persistence: &str) -> ApiResult<()>;
    async fn alter_vip_healthcheck(
        &self,
        vip_id: i64,
        healthcheck_type: &str,
        healthcheck: &str,
        healthcheck_id: i64,
    ) -> ApiResult<()>;
    async fn add_real(
        &self,
        vip_id: i64,
        ip_id: i64,
        equipment_id: i64,
        vip_port: u16,
        real_port: u16,
    ) -> ApiResult<()>;
    async fn remove_real(
        &self,
        vip_id: i64,
        ip_id: i64,
        equipment_id: i64,
        vip_port: u16,
        real_port: u16,
    ) -> ApiResult<()>;

    // Equipment operations
    async fn find_equipment_by_name(&self, name: &str) -> ApiResult<Option<Equipment>>;
    async fn insert_equipment(
        &self,
        name: &str,
        type_id: i64,
        model_id: i64,
        group_id: i64,
    ) -> ApiResult<Equipment>;
    async fn delete_equipment(&self, equipment_id: i64) -> ApiResult<()>;
    async fn remove_equipment_ip(&self, equipment_id: i64, ip_id: i64) -> ApiResult<()>;

    // IP operations
    async fn find_ip_by_ip_and_environment(
        &self,
        ip: &str,
        environment_id: i64,
    ) -> ApiResult<Option<Ipv4>>;
    async fn find_ips_by_equipment(&self, equipment_id: i64) -> ApiResult<Vec<Ipv4>>;
    /// Check (and allocate on first use) a VIP front-end IP in the
    /// given environment.
    async fn check_vip_ip(&self, ip: &str, environment_id: i64) -> ApiResult<Ipv4>;
    async fn save_ipv4(
        &self,
        ip: &str,
        equipment_id: i64,
        description: &str,
        network_id: i64,
    ) -> ApiResult<Ipv4>;
    async fn assoc_ipv4(&self, ip_id: i64, equipment_id: i64, network_id: i64) -> ApiResult<()>;
    async fn get_ipv4(&self, ip_id: i64) -> ApiResult<Ipv4>;

    // Environment operations
    async fn get_vip_environment(&self, environment_id: i64) -> ApiResult<Option<VipEnvironment>>;
    async fn list_vip_environments(&self) -> ApiResult<Vec<VipEnvironment>>;
}
