use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use log::{debug, info, warn};

use crate::chain::{
    connect_http, ContractGateway, JsonRpcConnector, JsonRpcGateway, WalletConnector,
};
use crate::config::AppConfig;
use crate::entity::Deployment;
use crate::interactor::{StakeInteractor, StakeOrchestrator};

/// How long a chat's finished or unused orchestrator is kept for `/status`.
const IDLE_RETENTION_HOURS: i64 = 24;

/// ServiceContainer provides access to core application dependencies
pub struct ServiceContainer {
    // Chain access
    connector: Arc<dyn WalletConnector>,
    gateway: Arc<dyn ContractGateway>,

    // Contracts of the connected chain, resolved once at startup
    deployment: Deployment,

    // One orchestrator per chat
    orchestrators: Mutex<HashMap<i64, Arc<StakeOrchestrator>>>,
}

impl ServiceContainer {
    /// Connects to the node named in `config` and resolves the deployment
    /// of the chain it serves.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let settings = config.gateway_settings();
        let provider = connect_http(&config.rpc_url, settings.poll_interval)?;
        let connector = Arc::new(JsonRpcConnector::new(
            provider.clone(),
            config.account_address()?,
        ));

        let chain_id = connector
            .chain_id()
            .await
            .with_context(|| format!("Failed to reach node at {}", config.rpc_url))?;
        let account = connector.account().await?;
        let deployment = config.resolve(chain_id)?;

        info!(
            "Connected to chain {} ({}) as {}",
            chain_id, deployment.network, account
        );
        if deployment.is_placeholder() {
            warn!("Chain {} has no TokenFarm deployment configured", chain_id);
        } else {
            info!(
                "TokenFarm at {} accepting {} token(s)",
                deployment.token_farm,
                deployment.tokens.len()
            );
        }

        let gateway = Arc::new(JsonRpcGateway::new(Arc::new(provider), account, settings));

        Ok(Self::new(connector, gateway, deployment))
    }

    pub fn new(
        connector: Arc<dyn WalletConnector>,
        gateway: Arc<dyn ContractGateway>,
        deployment: Deployment,
    ) -> Self {
        Self {
            connector,
            gateway,
            deployment,
            orchestrators: Mutex::new(HashMap::new()),
        }
    }

    // Accessor methods

    pub fn connector(&self) -> Arc<dyn WalletConnector> {
        self.connector.clone()
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment.clone()
    }

    /// The orchestrator owning `chat_id`'s stake state, created on first use.
    /// Other chats idle for longer than a day are forgotten on the way.
    pub fn orchestrator(&self, chat_id: i64) -> Arc<StakeOrchestrator> {
        let mut orchestrators = self.orchestrators.lock().unwrap_or_else(|e| e.into_inner());
        prune_idle(
            &mut orchestrators,
            chat_id,
            TimeDelta::hours(IDLE_RETENTION_HOURS),
        );

        orchestrators
            .entry(chat_id)
            .or_insert_with(|| {
                Arc::new(StakeOrchestrator::new(
                    self.gateway.clone(),
                    self.deployment.chain_id,
                    self.deployment.token_farm,
                ))
            })
            .clone()
    }
}

/// Drops orchestrators, other than `keep`'s, with no request in flight and
/// no state change for `retention`.
fn prune_idle(
    orchestrators: &mut HashMap<i64, Arc<StakeOrchestrator>>,
    keep: i64,
    retention: TimeDelta,
) {
    let now = Utc::now();
    let before = orchestrators.len();

    orchestrators.retain(|chat_id, orchestrator| {
        let state = orchestrator.state();
        *chat_id == keep || state.is_in_flight() || now - state.updated_at < retention
    });

    if orchestrators.len() < before {
        debug!("Forgot {} idle chat(s)", before - orchestrators.len());
    }
}
