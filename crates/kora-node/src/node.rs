//! Kora node wiring
//!
//! Owns the stores, services, chain client, and directory; spawns the
//! directory refresh task, the JSON-RPC server, and the metrics
//! exporter, and tears everything down on ctrl-c.

use crate::config::KoraConfig;
use crate::metrics::{MetricsServer, NodeMetrics};
use crate::rpc_server::RpcServer;

use async_trait::async_trait;
use kora_chain::{ChainConfig, DelegationSubmitter, RpcStakingClient, StakeRecorder, StakingClient};
use kora_core::{Result, Stake};
use kora_directory::OrchestratorDirectory;
use kora_economics::{EarningsEstimator, RateProvider};
use kora_gateway::{
    AssistantClient, HttpAssistantClient, HttpOnrampClient, OnrampClient, OnrampConfig,
};
use kora_marketplace::{
    OpportunityService, ReferralService, RoleRequestService, SubmissionService,
};
use kora_storage::{
    NotificationStore, OpportunityStore, ProfileStore, ReferralStore, RoleRequestStore,
    StakeStore, SubmissionStore,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Node lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Everything the RPC handlers reach for
pub struct NodeContext {
    pub node_name: String,
    pub version: &'static str,
    pub default_currency: String,

    pub rates: RateProvider,
    pub estimator: EarningsEstimator,
    pub directory: Arc<OrchestratorDirectory>,
    pub submitter: Arc<DelegationSubmitter>,

    pub stakes: Arc<StakeStore>,
    pub profiles: Arc<ProfileStore>,
    pub notifications: Arc<NotificationStore>,

    pub opportunities: OpportunityService,
    pub submissions: SubmissionService,
    pub referrals: ReferralService,
    pub roles: RoleRequestService,

    pub onramp: Option<Arc<dyn OnrampClient>>,
    pub assistant: Option<Arc<dyn AssistantClient>>,

    pub metrics: NodeMetrics,
}

/// [`StakeRecorder`] over the stake store
///
/// Inserts the new record and returns the user's complete stake list,
/// reloaded from the store.
struct StoreStakeRecorder {
    stakes: Arc<StakeStore>,
}

#[async_trait]
impl StakeRecorder for StoreStakeRecorder {
    async fn record_stake(&self, stake: Stake) -> Result<Vec<Stake>> {
        let user_id = stake.user_id;
        self.stakes.insert(stake)?;
        Ok(self.stakes.list_by_user(&user_id))
    }
}

/// The Kora node
pub struct KoraNode {
    config: KoraConfig,
    ctx: Arc<NodeContext>,
    state: Arc<RwLock<NodeState>>,
}

impl KoraNode {
    /// Build a node over the live chain client
    pub fn new(config: KoraConfig) -> anyhow::Result<Self> {
        let chain_config = ChainConfig {
            rpc_url: config.chain.rpc_url.clone(),
            bonding_manager: config.chain.bonding_manager.clone(),
            token: config.chain.token.clone(),
            poll_interval_ms: config.chain.poll_interval_ms,
            max_poll_attempts: config.chain.max_poll_attempts,
        };
        let client: Arc<dyn StakingClient> = Arc::new(RpcStakingClient::new(chain_config)?);
        let ctx = Self::build_context(&config, client)?;
        Ok(Self {
            config,
            ctx,
            state: Arc::new(RwLock::new(NodeState::Starting)),
        })
    }

    /// Build a node over an injected chain client
    pub fn with_client(
        config: KoraConfig,
        client: Arc<dyn StakingClient>,
    ) -> anyhow::Result<Self> {
        let ctx = Self::build_context(&config, client)?;
        Ok(Self {
            config,
            ctx,
            state: Arc::new(RwLock::new(NodeState::Starting)),
        })
    }

    fn build_context(
        config: &KoraConfig,
        client: Arc<dyn StakingClient>,
    ) -> anyhow::Result<Arc<NodeContext>> {
        let metrics = NodeMetrics::new()?;
        let rates = RateProvider::new();

        let stakes = Arc::new(StakeStore::new());
        let opportunities_store = Arc::new(OpportunityStore::new());
        let submissions_store = Arc::new(SubmissionStore::new());
        let profiles = Arc::new(ProfileStore::new());
        let notifications = Arc::new(NotificationStore::new());
        let referrals_store = Arc::new(ReferralStore::new());
        let role_requests = Arc::new(RoleRequestStore::new());

        let recorder: Arc<dyn StakeRecorder> = Arc::new(StoreStakeRecorder {
            stakes: stakes.clone(),
        });
        let submitter = Arc::new(DelegationSubmitter::new(client, recorder, rates));

        let directory = Arc::new(OrchestratorDirectory::with_provider(
            None,
            Duration::from_secs(config.directory.refresh_interval_secs),
        ));
        let refresh_counter = metrics.directory_refreshes.clone();
        directory.set_refresh_hook(Box::new(move || refresh_counter.inc()));

        let onramp: Option<Arc<dyn OnrampClient>> = if config.gateway.onramp_enabled {
            Some(Arc::new(HttpOnrampClient::new(OnrampConfig {
                api_url: config.gateway.onramp_api_url.clone(),
                api_key: config.gateway.onramp_api_key.clone(),
                return_url: config.gateway.onramp_return_url.clone(),
            })))
        } else {
            None
        };
        let assistant: Option<Arc<dyn AssistantClient>> = if config.gateway.assistant_enabled {
            Some(Arc::new(HttpAssistantClient::new(
                config.gateway.assistant_api_url.clone(),
                config.gateway.assistant_api_key.clone(),
                config.gateway.assistant_model.clone(),
            )))
        } else {
            None
        };

        Ok(Arc::new(NodeContext {
            node_name: config.node.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
            default_currency: config.economics.default_currency.clone(),
            rates,
            estimator: EarningsEstimator::new(rates),
            directory,
            submitter,
            stakes,
            profiles: profiles.clone(),
            notifications: notifications.clone(),
            opportunities: OpportunityService::new(
                opportunities_store.clone(),
                profiles.clone(),
            ),
            submissions: SubmissionService::new(
                submissions_store,
                opportunities_store,
                profiles.clone(),
                notifications.clone(),
            ),
            referrals: ReferralService::new(
                referrals_store,
                profiles.clone(),
                notifications.clone(),
            ),
            roles: RoleRequestService::new(role_requests, profiles, notifications),
            onramp,
            assistant,
            metrics,
        }))
    }

    pub fn state(&self) -> NodeState {
        *self.state.read()
    }

    pub fn context(&self) -> Arc<NodeContext> {
        self.ctx.clone()
    }

    /// Run the node until ctrl-c
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tracing::info!("Starting {}...", self.config.node.name);
        *self.state.write() = NodeState::Starting;

        let (directory_shutdown_tx, directory_shutdown_rx) = mpsc::channel(1);
        let directory_handle = self.ctx.directory.spawn_refresh_task(directory_shutdown_rx);

        let rpc_handle = if self.config.rpc.enabled {
            let server = RpcServer::new(&self.config.rpc, self.ctx.clone());
            Some(tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    tracing::error!("RPC server error: {}", e);
                }
            }))
        } else {
            None
        };

        let metrics_handle = if self.config.metrics.enabled {
            let server = MetricsServer::new(&self.config.metrics, &self.ctx.metrics);
            Some(tokio::spawn(async move {
                if let Err(e) = server.run().await {
                    tracing::error!("Metrics server error: {}", e);
                }
            }))
        } else {
            None
        };

        *self.state.write() = NodeState::Running;
        self.print_startup_banner();

        self.wait_for_shutdown().await;

        *self.state.write() = NodeState::Stopping;
        tracing::info!("Shutting down...");

        let _ = directory_shutdown_tx.send(()).await;
        let _ = directory_handle.await;

        if let Some(handle) = rpc_handle {
            handle.abort();
        }
        if let Some(handle) = metrics_handle {
            handle.abort();
        }

        *self.state.write() = NodeState::Stopped;
        tracing::info!("Node stopped");
        Ok(())
    }

    fn print_startup_banner(&self) {
        tracing::info!("{} v{} is running", self.config.node.name, self.ctx.version);
        tracing::info!("Default currency: {}", self.config.economics.default_currency);
        tracing::info!(
            "Directory refresh interval: {}s",
            self.config.directory.refresh_interval_secs
        );
        if self.config.rpc.enabled {
            tracing::info!("JSON-RPC: http://{}", self.config.rpc.listen_addr);
        }
        if self.config.metrics.enabled {
            tracing::info!("Metrics: http://{}/metrics", self.config.metrics.listen_addr);
        }
        tracing::info!("Press Ctrl+C to stop the node");
    }

    async fn wait_for_shutdown(&self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(e) => {
                    tracing::error!("Failed to install signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
