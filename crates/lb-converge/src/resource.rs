//! Command dispatch boundary
//!
//! Single entry point of the agent: every command is answered, never
//! errored. Errors from the engine are folded into `Answer` values here
//! so callers only ever deal with one shape.

use std::sync::Arc;

use netlb_client::{HttpNetworkApi, NetworkApi, NetworkApiConfig, NetworkApiError};
use netlb_shared_types::{
    Answer, NetworkCommand, RuleState, VipEnvironmentResult, VipSpec,
};

use crate::converger::{ConvergeReport, VipConverger};
use crate::error::ConvergeError;
use crate::registry::{register_equipment_and_ip, unregister_equipment_and_ip};
use crate::response::build_vip_result;

pub struct NetworkResource {
    api: Arc<dyn NetworkApi>,
    converger: VipConverger,
}

impl NetworkResource {
    pub fn new(config: &NetworkApiConfig, healthcheck_id: i64) -> anyhow::Result<Self> {
        config.validate()?;
        let api: Arc<dyn NetworkApi> = Arc::new(HttpNetworkApi::new(config)?);
        Ok(Self::with_api(api, healthcheck_id))
    }

    pub fn with_api(api: Arc<dyn NetworkApi>, healthcheck_id: i64) -> Self {
        let converger = VipConverger::new(Arc::clone(&api), healthcheck_id);
        Self { api, converger }
    }

    /// Execute one command. Always returns an `Answer`; a failed
    /// command produces `result: false` with diagnostic details.
    pub async fn execute(&self, command: NetworkCommand) -> Answer {
        match command {
            NetworkCommand::AddOrRemoveVip(spec) => self.execute_vip(&spec).await,
            NetworkCommand::RegisterEquipmentAndIp(cmd) => {
                match register_equipment_and_ip(self.api.as_ref(), &cmd).await {
                    Ok(details) => Answer::success(details),
                    Err(err) => failure_answer(err),
                }
            }
            NetworkCommand::UnregisterEquipmentAndIp(cmd) => {
                match unregister_equipment_and_ip(self.api.as_ref(), &cmd).await {
                    Ok(details) => Answer::success(details),
                    Err(err) => failure_answer(err),
                }
            }
            NetworkCommand::ListVipEnvironments => match self.api.list_vip_environments().await {
                Ok(environments) => Answer::with_environments(
                    environments
                        .into_iter()
                        .map(|env| VipEnvironmentResult {
                            id: env.id,
                            finality: env.finality,
                            client: env.client,
                            environment_name: env.environment_name,
                        })
                        .collect(),
                ),
                Err(err) => failure_answer(ConvergeError::Remote(err)),
            },
        }
    }

    async fn execute_vip(&self, spec: &VipSpec) -> Answer {
        match spec.rule_state {
            RuleState::Add => match self.converger.converge(spec).await {
                Ok(report) => report_answer(report),
                Err(err) => failure_answer(err),
            },
            RuleState::Revoke => match self.converger.revoke(spec).await {
                Ok(Some(report)) => report_answer(report),
                Ok(None) => Answer::success(format!(
                    "VIP for {} no longer exists",
                    spec.address
                )),
                Err(err) => failure_answer(err),
            },
        }
    }
}

fn report_answer(report: ConvergeReport) -> Answer {
    if report.real_failures.is_empty() {
        return Answer::with_vip(build_vip_result(&report.vip));
    }
    let details: Vec<String> = report
        .real_failures
        .iter()
        .map(|f| format!("real {} ({}): {}", f.ip, f.vm_name, f.reason))
        .collect();
    Answer::failure(details.join("; "))
}

fn failure_answer(err: ConvergeError) -> Answer {
    log::error!("command failed: {}", err);
    match err {
        ConvergeError::Remote(NetworkApiError::ErrorCode { code, description }) => {
            Answer::remote_error(code, description)
        }
        other => Answer::failure(other.to_string()),
    }
}
