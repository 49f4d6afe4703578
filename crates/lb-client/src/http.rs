//! HTTP driver for the network controller API
//!
//! JSON over HTTP with basic auth. Responses use an envelope of
//! `{ data, error_code, error_description }`; application errors are
//! surfaced verbatim as `NetworkApiError::ErrorCode` and never retried
//! here. Transient transport failures are retried a bounded number of
//! times per the client configuration.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiResult, NetworkApi};
use crate::config::NetworkApiConfig;
use crate::error::NetworkApiError;
use crate::model::{Equipment, Ipv4, Vip, VipEnvironment, VipPayload};

/// Controller response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct HttpNetworkApi {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    retries: u32,
}

impl HttpNetworkApi {
    /// Build the client once from configuration; the instance is
    /// immutable afterwards and owned by the resource that drives it.
    pub fn new(config: &NetworkApiConfig) -> Result<Self, NetworkApiError> {
        let client = Client::builder()
            .timeout(config.read_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            retries: config.number_of_retries,
        })
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Envelope> {
        let url = format!("{}/api{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .basic_auth(&self.username, Some(&self.password));
            if let Some(body) = &body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => return self.decode(response).await,
                Err(err) if err.is_connect() || err.is_timeout() => {
                    if attempt >= self.retries {
                        return Err(err.into());
                    }
                    attempt += 1;
                    log::warn!(
                        "controller request to {} failed ({}), retry {}/{}",
                        url,
                        err,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(
                        250 * u64::from(attempt),
                    ))
                    .await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn decode(&self, response: reqwest::Response) -> ApiResult<Envelope> {
        let status = response.status();
        let text = response.text().await?;

        let envelope = if text.trim().is_empty() {
            Envelope {
                data: None,
                error_code: None,
                error_description: None,
            }
        } else {
            match serde_json::from_str::<Envelope>(&text) {
                Ok(envelope) => envelope,
                Err(err) if status.is_success() => return Err(err.into()),
                Err(_) => {
                    return Err(NetworkApiError::Api {
                        message: format!("controller request failed: {} - {}", status, text),
                    })
                }
            }
        };

        if let Some(code) = envelope.error_code {
            return Err(NetworkApiError::ErrorCode {
                code,
                description: envelope.error_description.unwrap_or_default(),
            });
        }

        if !status.is_success() {
            return Err(NetworkApiError::Api {
                message: format!("controller request failed: {}", status),
            });
        }

        Ok(envelope)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let envelope = self.send(method, path, body).await?;
        let data = envelope.data.ok_or_else(|| NetworkApiError::Api {
            message: format!("controller response for {} carried no data", path),
        })?;
        Ok(serde_json::from_value(data)?)
    }

    async fn request_unit(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<()> {
        self.send(method, path, body).await.map(|_| ())
    }
}

#[async_trait]
impl NetworkApi for HttpNetworkApi {
    async fn get_vips_by_ip(&self, ip: &str) -> ApiResult<Vec<Vip>> {
        let path = format!("/vip/?ip={}", urlencoding::encode(ip));
        self.request(Method::GET, &path, None).await
    }

    async fn get_vip_by_id(&self, vip_id: i64) -> ApiResult<Vip> {
        self.request(Method::GET, &format!("/vip/{}/", vip_id), None)
            .await
    }

    async fn add_vip(&self, payload: &VipPayload) -> ApiResult<Vip> {
        self.request(Method::POST, "/vip/", Some(serde_json::to_value(payload)?))
            .await
    }

    async fn alter_vip(&self, vip_id: i64, payload: &VipPayload) -> ApiResult<Vip> {
        self.request(
            Method::PUT,
            &format!("/vip/{}/", vip_id),
            Some(serde_json::to_value(payload)?),
        )
        .await
    }

    async fn validate_vip(&self, vip_id: i64) -> ApiResult<()> {
        self.request_unit(Method::PUT, &format!("/vip/{}/validate/", vip_id), None)
            .await
    }

    async fn create_vip(&self, vip_id: i64) -> ApiResult<()> {
        self.request_unit(Method::PUT, &format!("/vip/{}/create/", vip_id), None)
            .await
    }

    async fn alter_vip_persistence(&self, vip_id: i64, persistence: &str) -> ApiResult<()> {
        self.request_unit(
            Method::PUT,
            &format!("/vip/{}/persistence/", vip_id),
            Some(json!({ "persistence": persistence })),
        )
        .await
    }

    async fn alter_vip_healthcheck(
        &self,
        vip_id: i64,
        healthcheck_type: &str,
        healthcheck: &str,
        healthcheck_id: i64,
    ) -> ApiResult<()> {
        self.request_unit(
            Method::PUT,
            &format!("/vip/{}/healthcheck/", vip_id),
            Some(json!({
                "healthcheck_type": healthcheck_type,
                "healthcheck": healthcheck,
                "healthcheck_id": healthcheck_id,
            })),
        )
        .await
    }

    async fn add_real(
        &self,
        vip_id: i64,
        ip_id: i64,
        equipment_id: i64,
        vip_port: u16,
        real_port: u16,
    ) -> ApiResult<()> {
        self.request_unit(
            Method::POST,
            &format!("/vip/{}/real/", vip_id),
            Some(json!({
                "ip_id": ip_id,
                "equipment_id": equipment_id,
                "vip_port": vip_port,
                "real_port": real_port,
            })),
        )
        .await
    }

    async fn remove_real(
        &self,
        vip_id: i64,
        ip_id: i64,
        equipment_id: i64,
        vip_port: u16,
        real_port: u16,
    ) -> ApiResult<()> {
        self.request_unit(
            Method::DELETE,
            &format!("/vip/{}/real/", vip_id),
            Some(json!({
                "ip_id": ip_id,
                "equipment_id": equipment_id,
                "vip_port": vip_port,
                "real_port": real_port,
            })),
        )
        .await
    }

    async fn find_equipment_by_name(&self, name: &str) -> ApiResult<Option<Equipment>> {
        let path = format!("/equipment/?name={}", urlencoding::encode(name));
        let equipments: Vec<Equipment> = self.request(Method::GET, &path, None).await?;
        Ok(equipments.into_iter().find(|e| e.name == name))
    }

    async fn insert_equipment(
        &self,
        name: &str,
        type_id: i64,
        model_id: i64,
        group_id: i64,
    ) -> ApiResult<Equipment> {
        self.request(
            Method::POST,
            "/equipment/",
            Some(json!({
                "name": name,
                "type_id": type_id,
                "model_id": model_id,
                "group_id": group_id,
            })),
        )
        .await
    }

    async fn delete_equipment(&self, equipment_id: i64) -> ApiResult<()> {
        self.request_unit(Method::DELETE, &format!("/equipment/{}/", equipment_id), None)
            .await
    }

    async fn remove_equipment_ip(&self, equipment_id: i64, ip_id: i64) -> ApiResult<()> {
        self.request_unit(
            Method::DELETE,
            &format!("/equipment/{}/ip/{}/", equipment_id, ip_id),
            None,
        )
        .await
    }

    async fn find_ip_by_ip_and_environment(
        &self,
        ip: &str,
        environment_id: i64,
    ) -> ApiResult<Option<Ipv4>> {
        let path = format!(
            "/ip/?ip={}&environment={}",
            urlencoding::encode(ip),
            environment_id
        );
        let ips: Vec<Ipv4> = self.request(Method::GET, &path, None).await?;
        Ok(ips.into_iter().next())
    }

    async fn find_ips_by_equipment(&self, equipment_id: i64) -> ApiResult<Vec<Ipv4>> {
        self.request(Method::GET, &format!("/ip/?equipment={}", equipment_id), None)
            .await
    }

    async fn check_vip_ip(&self, ip: &str, environment_id: i64) -> ApiResult<Ipv4> {
        self.request(
            Method::POST,
            "/ip/check-vip/",
            Some(json!({ "ip": ip, "environment_id": environment_id })),
        )
        .await
    }

    async fn save_ipv4(
        &self,
        ip: &str,
        equipment_id: i64,
        description: &str,
        network_id: i64,
    ) -> ApiResult<Ipv4> {
        self.request(
            Method::POST,
            "/ip/",
            Some(json!({
                "ip": ip,
                "equipment_id": equipment_id,
                "description": description,
                "network_id": network_id,
            })),
        )
        .await
    }

    async fn assoc_ipv4(&self, ip_id: i64, equipment_id: i64, network_id: i64) -> ApiResult<()> {
        self.request_unit(
            Method::PUT,
            &format!("/ip/{}/equipment/", ip_id),
            Some(json!({ "equipment_id": equipment_id, "network_id": network_id })),
        )
        .await
    }

    async fn get_ipv4(&self, ip_id: i64) -> ApiResult<Ipv4> {
        self.request(Method::GET, &format!("/ip/{}/", ip_id), None)
            .await
    }

    async fn get_vip_environment(&self, environment_id: i64) -> ApiResult<Option<VipEnvironment>> {
        let path = format!("/vip-environment/?id={}", environment_id);
        let environments: Vec<VipEnvironment> = self.request(Method::GET, &path, None).await?;
        Ok(environments.into_iter().next())
    }

    async fn list_vip_environments(&self) -> ApiResult<Vec<VipEnvironment>> {
        self.request(Method::GET, "/vip-environment/", None).await
    }
}
