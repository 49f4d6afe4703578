//! VIP state convergence
//!
//! Diff-and-converge against the controller's system of record: one
//! strictly sequential chain of remote calls per command. Ordering is
//! a correctness requirement (add before validate before create,
//! alter before validate). There is no cross-request state in the
//! engine and no internal locking; callers that may converge the same
//! address concurrently must serialize externally, e.g. with a keyed
//! mutex per VIP address.

use std::sync::Arc;

use netlb_client::{Ipv4, NetworkApi, RealIp, Vip, VipEnvironment, VipPayload};
use netlb_shared_types::{expand_port_pairs, VipSpec, NONE_VALUE};

use crate::error::ConvergeError;
use crate::reals::{reconcile_real, RealFailure};

const DEFAULT_HEALTHCHECK_TYPE: &str = "TCP";
const DEFAULT_TIMEOUT: u32 = 5;
const DEFAULT_MAX_CONN: u32 = 0;

/// Outcome of one converge: the re-fetched final VIP state plus the
/// reals that could not be brought to their desired state.
#[derive(Debug)]
pub struct ConvergeReport {
    pub vip: Vip,
    pub real_failures: Vec<RealFailure>,
}

pub struct VipConverger {
    api: Arc<dyn NetworkApi>,
    /// Pre-registered controller-side healthcheck id, fixed per
    /// deployment and supplied through agent configuration.
    healthcheck_id: i64,
}

impl VipConverger {
    pub fn new(api: Arc<dyn NetworkApi>, healthcheck_id: i64) -> Self {
        Self {
            api,
            healthcheck_id,
        }
    }

    /// Converge the controller state for `spec`'s address to the
    /// desired state and return the re-fetched result.
    pub async fn converge(&self, spec: &VipSpec) -> Result<ConvergeReport, ConvergeError> {
        spec.validate()?;

        let existing = self.find_existing(spec).await?;
        let environment = self.vip_environment(spec.vip_environment_id).await?;
        // The front-end IP is checked (and allocated on first use)
        // against the target environment in both branches.
        let vip_ip = self
            .api
            .check_vip_ip(&spec.address, spec.vip_environment_id)
            .await?;

        let mut real_failures = Vec::new();
        let vip_id = match &existing {
            None => {
                self.add_fresh(spec, &environment, &vip_ip, &mut real_failures)
                    .await?
            }
            Some(current) => {
                let vip_id = current.id.ok_or_else(|| ConvergeError::Precondition {
                    message: format!(
                        "controller returned a VIP for {} without an id",
                        spec.address
                    ),
                })?;

                let payload = self.update_payload(current, spec, &environment, &vip_ip);
                self.api.alter_vip(vip_id, &payload).await?;

                for real in &spec.reals {
                    if let Err(err) = reconcile_real(self.api.as_ref(), current, real).await {
                        log::warn!(
                            "real {} ({}) on VIP {} not reconciled: {}",
                            real.ip,
                            real.vm_name,
                            vip_id,
                            err
                        );
                        real_failures.push(RealFailure {
                            ip: real.ip.clone(),
                            vm_name: real.vm_name.clone(),
                            reason: err.to_string(),
                        });
                    }
                }

                self.api.validate_vip(vip_id).await?;
                // Activation happens once. The decision is a pure
                // function of the state fetched at the start of this
                // converge, never cached across calls.
                if !current.created {
                    self.api.create_vip(vip_id).await?;
                }
                vip_id
            }
        };

        self.apply_persistence(vip_id, spec, existing.as_ref()).await?;
        self.apply_healthcheck(vip_id, spec, existing.as_ref()).await?;

        // Final state may differ from the locally assembled attributes
        // after remote-side normalization.
        let vip = self.api.get_vip_by_id(vip_id).await?;
        Ok(ConvergeReport { vip, real_failures })
    }

    /// Revoke every real of the rule. The VIP object itself stays; its
    /// removal is a separate controller operation. A VIP already gone
    /// is a tolerable inconsistency, not an error.
    pub async fn revoke(&self, spec: &VipSpec) -> Result<Option<ConvergeReport>, ConvergeError> {
        spec.validate()?;

        let mut vips = self.api.get_vips_by_ip(&spec.address).await?;
        let current = match vips.len() {
            0 => {
                log::warn!(
                    "VIP for {} no longer exists in the controller, nothing to revoke",
                    spec.address
                );
                return Ok(None);
            }
            1 => vips.remove(0),
            n => {
                return Err(ConvergeError::Precondition {
                    message: format!(
                        "{} VIPs registered for address {}, expected at most one",
                        n, spec.address
                    ),
                })
            }
        };
        let vip_id = current.id.ok_or_else(|| ConvergeError::Precondition {
            message: format!(
                "controller returned a VIP for {} without an id",
                spec.address
            ),
        })?;

        let mut real_failures = Vec::new();
        for real in &spec.reals {
            let mut real = real.clone();
            real.revoked = true;
            if let Err(err) = reconcile_real(self.api.as_ref(), &current, &real).await {
                log::warn!(
                    "real {} ({}) on VIP {} not revoked: {}",
                    real.ip,
                    real.vm_name,
                    vip_id,
                    err
                );
                real_failures.push(RealFailure {
                    ip: real.ip.clone(),
                    vm_name: real.vm_name.clone(),
                    reason: err.to_string(),
                });
            }
        }

        self.api.validate_vip(vip_id).await?;

        let vip = self.api.get_vip_by_id(vip_id).await?;
        Ok(Some(ConvergeReport { vip, real_failures }))
    }

    async fn find_existing(&self, spec: &VipSpec) -> Result<Option<Vip>, ConvergeError> {
        if let Some(vip_id) = spec.vip_id {
            return Ok(Some(self.api.get_vip_by_id(vip_id).await?));
        }

        let mut vips = self.api.get_vips_by_ip(&spec.address).await?;
        match vips.len() {
            0 => Ok(None),
            1 => Ok(Some(vips.remove(0))),
            n => Err(ConvergeError::Precondition {
                message: format!(
                    "{} VIPs registered for address {}, expected at most one",
                    n, spec.address
                ),
            }),
        }
    }

    async fn vip_environment(
        &self,
        environment_id: i64,
    ) -> Result<VipEnvironment, ConvergeError> {
        self.api
            .get_vip_environment(environment_id)
            .await?
            .ok_or_else(|| ConvergeError::NotFound {
                resource: format!("VIP environment {}", environment_id),
            })
    }

    /// First add: the controller accepts the initial real set inline,
    /// avoiding one remote call per (real, pair) for a fresh VIP, then
    /// validate and create in that order.
    async fn add_fresh(
        &self,
        spec: &VipSpec,
        environment: &VipEnvironment,
        vip_ip: &Ipv4,
        real_failures: &mut Vec<RealFailure>,
    ) -> Result<i64, ConvergeError> {
        let reals = self.initial_reals(spec, real_failures).await?;

        let payload = VipPayload {
            ip_id: vip_ip.id,
            finality: environment.finality.clone(),
            client: environment.client.clone(),
            environment: environment.environment_name.clone(),
            cache: spec.cache.clone().unwrap_or_else(|| NONE_VALUE.to_string()),
            method: spec.controller_balancing_method(),
            // Persistence and healthcheck start at their defaults and
            // are adjusted by the dedicated alter operations afterwards.
            persistence: NONE_VALUE.to_string(),
            healthcheck_type: DEFAULT_HEALTHCHECK_TYPE.to_string(),
            healthcheck: String::new(),
            timeout: DEFAULT_TIMEOUT,
            host: spec.host.clone(),
            max_conn: DEFAULT_MAX_CONN,
            business_area: spec.business_area.clone(),
            service_name: spec.service_name.clone(),
            service_ports: spec.ports.clone(),
            reals,
        };

        let vip = self.api.add_vip(&payload).await?;
        let vip_id = vip.id.ok_or_else(|| ConvergeError::Precondition {
            message: "controller returned a freshly added VIP without an id".to_string(),
        })?;
        log::info!("added VIP {} for {}", vip_id, spec.address);

        self.api.validate_vip(vip_id).await?;
        self.api.create_vip(vip_id).await?;
        Ok(vip_id)
    }

    /// Pre-resolve the inline reals for a first add: one record per
    /// (non-revoked real, port pair), in spec order. A real that fails
    /// resolution is skipped and reported, the rest still go in.
    async fn initial_reals(
        &self,
        spec: &VipSpec,
        real_failures: &mut Vec<RealFailure>,
    ) -> Result<Vec<RealIp>, ConvergeError> {
        let mut reals = Vec::new();
        for real in spec.reals.iter().filter(|r| !r.revoked) {
            let found = match self
                .api
                .find_ip_by_ip_and_environment(&real.ip, real.environment_id)
                .await?
            {
                Some(ip) => ip,
                None => {
                    let reason = format!(
                        "IP {} not found in environment {}",
                        real.ip, real.environment_id
                    );
                    log::warn!("skipping real {} ({}): {}", real.ip, real.vm_name, reason);
                    real_failures.push(RealFailure {
                        ip: real.ip.clone(),
                        vm_name: real.vm_name.clone(),
                        reason,
                    });
                    continue;
                }
            };

            for pair in expand_port_pairs(&real.ports)? {
                reals.push(RealIp {
                    ip_id: found.id,
                    name: real.vm_name.clone(),
                    real_ip: real.ip.clone(),
                    vip_port: pair.vip_port,
                    real_port: pair.real_port,
                });
            }
        }
        Ok(reals)
    }

    /// Attribute set for the alter call. Fields the spec supplies
    /// override; everything else is read off the fetched VIP
    /// (partial-update semantics). Persistence and healthcheck are
    /// preserved here and adjusted by their dedicated operations.
    fn update_payload(
        &self,
        current: &Vip,
        spec: &VipSpec,
        environment: &VipEnvironment,
        vip_ip: &Ipv4,
    ) -> VipPayload {
        VipPayload {
            ip_id: vip_ip.id,
            finality: environment.finality.clone(),
            client: environment.client.clone(),
            environment: environment.environment_name.clone(),
            cache: spec.cache.clone().unwrap_or_else(|| current.cache.clone()),
            method: spec.controller_balancing_method(),
            persistence: current.persistence.clone(),
            healthcheck_type: current.healthcheck_type.clone(),
            healthcheck: current.healthcheck.clone(),
            timeout: if current.timeout == 0 {
                DEFAULT_TIMEOUT
            } else {
                current.timeout
            },
            host: spec.host.clone(),
            max_conn: current.max_conn,
            business_area: spec.business_area.clone(),
            service_name: spec.service_name.clone(),
            service_ports: spec.ports.clone(),
            reals: current.reals.clone(),
        }
    }

    async fn apply_persistence(
        &self,
        vip_id: i64,
        spec: &VipSpec,
        current: Option<&Vip>,
    ) -> Result<(), ConvergeError> {
        let policy = match &spec.persistence_policy {
            Some(policy) => policy,
            None => return Ok(()),
        };

        let desired = policy.controller_value();
        let current_value = current.map(|v| v.persistence.as_str()).unwrap_or(NONE_VALUE);
        if desired != current_value {
            self.api.alter_vip_persistence(vip_id, &desired).await?;
            log::info!("persistence on VIP {} set to {}", vip_id, desired);
        }
        Ok(())
    }

    async fn apply_healthcheck(
        &self,
        vip_id: i64,
        spec: &VipSpec,
        current: Option<&Vip>,
    ) -> Result<(), ConvergeError> {
        let policy = match &spec.healthcheck_policy {
            Some(policy) => policy,
            None => return Ok(()),
        };

        let healthcheck = build_healthcheck_string(&policy.check, &spec.host);
        let healthcheck_type = if healthcheck.is_empty() { "TCP" } else { "HTTP" };

        let differs = match current {
            Some(vip) => {
                vip.healthcheck != healthcheck || vip.healthcheck_type != healthcheck_type
            }
            None => !healthcheck.is_empty(),
        };
        if differs {
            self.api
                .alter_vip_healthcheck(vip_id, healthcheck_type, &healthcheck, self.healthcheck_id)
                .await?;
            log::info!(
                "healthcheck on VIP {} set to {} ({})",
                vip_id,
                healthcheck,
                healthcheck_type
            );
        }
        Ok(())
    }
}

/// Host-qualified healthcheck expectation handed to the controller.
///
/// A complete HTTP request line passes through untouched; a bare
/// path or expectation is wrapped into a GET against `host`. The
/// `\r\n` separators are sent in their escaped form, as the controller
/// expects them.
pub fn build_healthcheck_string(check: &str, host: &str) -> String {
    if check.is_empty() {
        return String::new();
    }
    if check.starts_with("GET ") || check.starts_with("POST ") {
        return check.to_string();
    }
    format!("GET {} HTTP/1.0\\r\\nHost: {}\\r\\n\\r\\n", check, host)
}

#[cfg(test)]
mod tests {
    use super::build_healthcheck_string;

    #[test]
    fn empty_check_stays_empty() {
        assert_eq!(build_healthcheck_string("", "vip.domain.com"), "");
    }

    #[test]
    fn bare_path_is_wrapped_with_host() {
        assert_eq!(
            build_healthcheck_string("/health.html", "vip.domain.com"),
            "GET /health.html HTTP/1.0\\r\\nHost: vip.domain.com\\r\\n\\r\\n"
        );
    }

    #[test]
    fn full_request_line_passes_through() {
        let check = "GET /ping HTTP/1.1\\r\\n\\r\\n";
        assert_eq!(build_healthcheck_string(check, "vip.domain.com"), check);
    }
}
