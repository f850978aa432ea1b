//! JSON-RPC server
//!
//! HTTP/1.1 over raw TCP with per-IP rate limiting and permissive CORS.
//! Every product operation is exposed as a `kora_*` method; structured
//! errors map to JSON-RPC error objects carrying the kora error code.

use crate::config::RpcSettings;
use crate::node::NodeContext;

use kora_chain::LocalSigner;
use kora_core::{
    KoraError, OpportunityId, OpportunityKind, OpportunityStatus, OrchestratorAddress,
    SubmissionId, SubmissionStatus, UserId,
};
use kora_gateway::ChatTurn;
use kora_storage::OpportunityFilter;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use uuid::Uuid;

/// JSON-RPC server
pub struct RpcServer {
    config: RpcSettings,
    rate_limiter: Arc<RateLimiter>,
    handlers: Arc<RpcHandlers>,
}

/// Per-IP sliding-window rate limiter
pub struct RateLimiter {
    requests_per_second: u32,
    burst: u32,
    request_counts: RwLock<HashMap<String, RequestCounter>>,
}

#[derive(Clone, Default)]
struct RequestCounter {
    count: u32,
    window_start: i64,
}

/// Counters idle this long are evicted from the rate limiter map
const STALE_AFTER_SECS: i64 = 10;

impl RateLimiter {
    fn new(requests_per_second: u32, burst: u32) -> Self {
        Self {
            requests_per_second,
            burst,
            request_counts: RwLock::new(HashMap::new()),
        }
    }

    async fn check(&self, ip: &str) -> bool {
        self.check_at(ip, chrono::Utc::now().timestamp()).await
    }

    async fn check_at(&self, ip: &str, now: i64) -> bool {
        let mut counts = self.request_counts.write().await;
        // evict counters whose window has long expired so the map does
        // not grow one entry per client IP forever
        counts.retain(|_, c| now - c.window_start < STALE_AFTER_SECS);
        let counter = counts.entry(ip.to_string()).or_default();

        if now - counter.window_start >= 1 {
            counter.count = 0;
            counter.window_start = now;
        }
        if counter.count >= self.requests_per_second + self.burst {
            return false;
        }
        counter.count += 1;
        true
    }
}

impl RpcServer {
    pub fn new(config: &RpcSettings, ctx: Arc<NodeContext>) -> Self {
        Self {
            config: config.clone(),
            rate_limiter: Arc::new(RateLimiter::new(
                config.requests_per_second,
                config.burst,
            )),
            handlers: Arc::new(RpcHandlers { ctx }),
        }
    }

    /// Run the server
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr: SocketAddr = self.config.listen_addr.parse()?;

        tracing::info!("Starting JSON-RPC server on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        loop {
            let (mut stream, peer_addr) = listener.accept().await?;

            let handlers = self.handlers.clone();
            let rate_limiter = self.rate_limiter.clone();
            let metrics = handlers.ctx.metrics.clone();
            let limit = self.config.requests_per_second;

            metrics.active_connections.inc();

            tokio::spawn(async move {
                let peer_ip = peer_addr.ip().to_string();

                if !rate_limiter.check(&peer_ip).await {
                    metrics.rpc_rate_limited.inc();
                    let _ = stream
                        .write_all(rate_limited_response(limit).as_bytes())
                        .await;
                    metrics.active_connections.dec();
                    return;
                }

                if let Err(e) = handle_connection(stream, handlers).await {
                    tracing::error!("Connection error from {}: {}", peer_addr, e);
                }

                metrics.active_connections.dec();
            });
        }
    }
}

/// 429 reply for throttled connections, carrying the structured error
/// code so clients can tell throttling from a network failure
fn rate_limited_response(limit: u32) -> String {
    let err = KoraError::RateLimitExceeded { limit };
    let body = json!({
        "jsonrpc": "2.0",
        "error": {
            "code": err.code(),
            "message": err.to_string(),
            "recoverable": err.is_recoverable()
        },
        "id": Value::Null
    })
    .to_string();
    format!(
        "HTTP/1.1 429 Too Many Requests\r\n\
        Content-Type: application/json\r\n\
        Access-Control-Allow-Origin: *\r\n\
        Content-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

async fn handle_connection(
    mut stream: tokio::net::TcpStream,
    handlers: Arc<RpcHandlers>,
) -> anyhow::Result<()> {
    let mut buf = vec![0u8; 64 * 1024];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buf[..n]);
    handlers.ctx.metrics.rpc_requests.inc();

    let response = if request.starts_with("OPTIONS") {
        "HTTP/1.1 204 No Content\r\n\
        Access-Control-Allow-Origin: *\r\n\
        Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
        Access-Control-Allow-Headers: Content-Type\r\n\r\n"
            .to_string()
    } else if request.starts_with("POST") || request.starts_with("GET /") {
        let body_start = request.find("\r\n\r\n").map(|i| i + 4).unwrap_or(0);
        let body = &request[body_start..];

        let json_response = handlers.handle_json_rpc(body).await;
        format!(
            "HTTP/1.1 200 OK\r\n\
            Content-Type: application/json\r\n\
            Access-Control-Allow-Origin: *\r\n\
            Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
            Access-Control-Allow-Headers: Content-Type\r\n\
            Content-Length: {}\r\n\r\n{}",
            json_response.len(),
            json_response
        )
    } else {
        "HTTP/1.1 404 Not Found\r\n\r\n".to_string()
    };

    stream.write_all(response.as_bytes()).await?;
    Ok(())
}

/// Method dispatch over the node context
pub struct RpcHandlers {
    pub(crate) ctx: Arc<NodeContext>,
}

impl RpcHandlers {
    /// Handle one JSON-RPC request body
    pub async fn handle_json_rpc(&self, body: &str) -> String {
        let request: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(_) => return self.node_info(),
        };

        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let id = request.get("id").cloned().unwrap_or(json!(1));
        let params = request.get("params").cloned().unwrap_or(json!({}));

        match self.dispatch(method, &params).await {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id
            })
            .to_string(),
            Err(e) => {
                self.ctx.metrics.rpc_failures.inc();
                json!({
                    "jsonrpc": "2.0",
                    "error": {
                        "code": e.code(),
                        "message": e.to_string(),
                        "recoverable": e.is_recoverable()
                    },
                    "id": id
                })
                .to_string()
            }
        }
    }

    async fn dispatch(&self, method: &str, params: &Value) -> Result<Value, KoraError> {
        match method {
            "kora_version" => Ok(json!({
                "name": self.ctx.node_name,
                "version": self.ctx.version,
            })),
            "kora_health" => Ok(json!({"status": "healthy"})),

            // === Economics ===
            "kora_estimateEarnings" => {
                let principal = f64_param(params, "principal")?;
                let apy = f64_param(params, "apy")?;
                let fee = params.get("fee").and_then(|v| v.as_f64()).unwrap_or(0.0);
                let currency = opt_str_param(params, "currency")
                    .unwrap_or(&self.ctx.default_currency);
                let projection = self.ctx.estimator.project(principal, apy, fee, currency);
                Ok(serde_json::to_value(projection).unwrap_or(Value::Null))
            }

            // === Directory ===
            "kora_listOrchestrators" => {
                let limit = params
                    .get("limit")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(50) as usize;
                let list = self.ctx.directory.list(limit);
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }

            // === Staking ===
            "kora_delegate" => {
                self.ctx.metrics.delegations_submitted.inc();
                let user_id = user_id_param(params, "user_id")?;
                let signer = LocalSigner::from_label(str_param(params, "wallet")?);
                let address = orchestrator_param(params)?;
                let orchestrator =
                    self.ctx
                        .directory
                        .get(&address)
                        .ok_or_else(|| KoraError::NotFound {
                            entity: "orchestrator",
                            id: address.to_hex(),
                        })?;
                let amount = f64_param(params, "amount")?;
                let currency = opt_str_param(params, "currency")
                    .unwrap_or(&self.ctx.default_currency);

                let receipt = match self
                    .ctx
                    .submitter
                    .delegate(&signer, user_id, &orchestrator, amount, currency)
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        self.ctx.metrics.delegations_failed.inc();
                        return Err(e);
                    }
                };
                Ok(json!({
                    "stake": receipt.stake,
                    "tx_hash": receipt.tx_hash.to_hex(),
                    "approval_tx": receipt.approval_tx.map(|t| t.to_hex()),
                    "stakes": receipt.stakes,
                }))
            }
            "kora_undelegate" => {
                let signer = LocalSigner::from_label(str_param(params, "wallet")?);
                let amount = f64_param(params, "amount")?;
                let currency = opt_str_param(params, "currency")
                    .unwrap_or(&self.ctx.default_currency);
                let tx = self.ctx.submitter.undelegate(&signer, amount, currency).await?;
                Ok(json!({"tx_hash": tx.to_hex()}))
            }
            "kora_withdrawFees" => {
                let signer = LocalSigner::from_label(str_param(params, "wallet")?);
                let tx = self.ctx.submitter.withdraw_fees(&signer).await?;
                Ok(json!({"tx_hash": tx.to_hex()}))
            }
            "kora_listStakes" => {
                let user_id = user_id_param(params, "user_id")?;
                let stakes = self.ctx.stakes.list_by_user(&user_id);
                Ok(serde_json::to_value(stakes).unwrap_or(Value::Null))
            }

            // === Marketplace ===
            "kora_createOpportunity" => {
                let sponsor_id = user_id_param(params, "sponsor_id")?;
                let kind: OpportunityKind =
                    serde_json::from_value(params.get("kind").cloned().unwrap_or(Value::Null))
                        .map_err(|e| KoraError::InvalidInput(format!("bad kind: {}", e)))?;
                let opportunity = self.ctx.opportunities.create(
                    sponsor_id,
                    str_param(params, "title")?,
                    kind,
                    str_param(params, "description")?,
                    opt_str_param(params, "category").unwrap_or("general"),
                )?;
                Ok(serde_json::to_value(opportunity).unwrap_or(Value::Null))
            }
            "kora_listOpportunities" => {
                let status = match opt_str_param(params, "status") {
                    Some(s) => Some(
                        serde_json::from_value::<OpportunityStatus>(json!(s))
                            .map_err(|e| KoraError::InvalidInput(format!("bad status: {}", e)))?,
                    ),
                    None => None,
                };
                let filter = OpportunityFilter {
                    sponsor_id: opt_uuid_param(params, "sponsor_id")?.map(UserId::from_uuid),
                    kind: opt_str_param(params, "kind").map(str::to_string),
                    status,
                };
                let list = self.ctx.opportunities.list(&filter);
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }
            "kora_closeOpportunity" => {
                let id = OpportunityId::from_uuid(uuid_param(params, "id")?);
                let sponsor_id = user_id_param(params, "sponsor_id")?;
                let closed = self.ctx.opportunities.close(&id, &sponsor_id)?;
                Ok(serde_json::to_value(closed).unwrap_or(Value::Null))
            }
            "kora_deleteOpportunity" => {
                let id = OpportunityId::from_uuid(uuid_param(params, "id")?);
                let sponsor_id = user_id_param(params, "sponsor_id")?;
                self.ctx.opportunities.delete(&id, &sponsor_id)?;
                Ok(json!({"deleted": true}))
            }
            "kora_submit" => {
                let user_id = user_id_param(params, "user_id")?;
                let opportunity_id =
                    OpportunityId::from_uuid(uuid_param(params, "opportunity_id")?);
                let submission = self.ctx.submissions.submit(
                    user_id,
                    opportunity_id,
                    str_param(params, "project_name")?,
                    str_param(params, "project_url")?,
                    opt_str_param(params, "description").unwrap_or(""),
                )?;
                self.ctx.metrics.submissions_received.inc();
                Ok(serde_json::to_value(submission).unwrap_or(Value::Null))
            }
            "kora_reviewSubmission" => {
                let reviewer_id = user_id_param(params, "reviewer_id")?;
                let submission_id =
                    SubmissionId::from_uuid(uuid_param(params, "submission_id")?);
                let status = match str_param(params, "status")? {
                    "approved" => SubmissionStatus::Approved,
                    "rejected" => SubmissionStatus::Rejected,
                    other => {
                        return Err(KoraError::InvalidInput(format!(
                            "review status must be approved or rejected, got {}",
                            other
                        )))
                    }
                };
                let reviewed = self
                    .ctx
                    .submissions
                    .review(&reviewer_id, &submission_id, status)?;
                Ok(serde_json::to_value(reviewed).unwrap_or(Value::Null))
            }
            "kora_listSubmissions" => {
                let reviewer_id = user_id_param(params, "reviewer_id")?;
                let opportunity_id =
                    OpportunityId::from_uuid(uuid_param(params, "opportunity_id")?);
                let list = self
                    .ctx
                    .submissions
                    .list_for_opportunity(&reviewer_id, &opportunity_id)?;
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }
            "kora_mySubmissions" => {
                let user_id = user_id_param(params, "user_id")?;
                let list = self.ctx.submissions.list_for_user(&user_id);
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }

            // === Notifications ===
            "kora_listNotifications" => {
                let user_id = user_id_param(params, "user_id")?;
                let list = self.ctx.notifications.list_for_user(&user_id);
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }
            "kora_markNotificationRead" => {
                let id = uuid_param(params, "id")?;
                self.ctx.notifications.mark_read(&id)?;
                Ok(json!({"read": true}))
            }

            // === Referrals ===
            "kora_recordReferral" => {
                let referrer = user_id_param(params, "referrer")?;
                let referred = user_id_param(params, "referred")?;
                let referral = self.ctx.referrals.record(referrer, referred)?;
                Ok(serde_json::to_value(referral).unwrap_or(Value::Null))
            }
            "kora_referralPoints" => {
                let referrer = user_id_param(params, "referrer")?;
                Ok(json!({"points": self.ctx.referrals.points(&referrer)}))
            }

            // === Roles ===
            "kora_requestSponsorRole" => {
                let user_id = user_id_param(params, "user_id")?;
                let request = self.ctx.roles.request_sponsor(user_id)?;
                Ok(serde_json::to_value(request).unwrap_or(Value::Null))
            }
            "kora_listRoleRequests" => {
                let admin_id = user_id_param(params, "admin_id")?;
                let list = self.ctx.roles.list_pending(&admin_id)?;
                Ok(serde_json::to_value(list).unwrap_or(Value::Null))
            }
            "kora_approveRoleRequest" => {
                let admin_id = user_id_param(params, "admin_id")?;
                let request_id = uuid_param(params, "request_id")?;
                let request = self.ctx.roles.approve(&admin_id, &request_id)?;
                Ok(serde_json::to_value(request).unwrap_or(Value::Null))
            }
            "kora_rejectRoleRequest" => {
                let admin_id = user_id_param(params, "admin_id")?;
                let request_id = uuid_param(params, "request_id")?;
                let request = self.ctx.roles.reject(&admin_id, &request_id)?;
                Ok(serde_json::to_value(request).unwrap_or(Value::Null))
            }

            // === Gateways ===
            "kora_createOnrampSession" => {
                let onramp = self.ctx.onramp.as_ref().ok_or_else(|| {
                    KoraError::Onramp("on-ramp gateway is not configured".to_string())
                })?;
                let amount = f64_param(params, "amount")?;
                let currency = opt_str_param(params, "currency")
                    .unwrap_or(&self.ctx.default_currency);
                let wallet = wallet_param(params, "wallet")?;
                let session = onramp.create_session(amount, currency, wallet).await?;
                Ok(serde_json::to_value(session).unwrap_or(Value::Null))
            }
            "kora_assistantChat" => {
                let assistant = self.ctx.assistant.as_ref().ok_or_else(|| {
                    KoraError::Assistant("assistant gateway is not configured".to_string())
                })?;
                let message = str_param(params, "message")?;
                let history: Vec<ChatTurn> = match params.get("history") {
                    Some(v) => serde_json::from_value(v.clone())
                        .map_err(|e| KoraError::InvalidInput(format!("bad history: {}", e)))?,
                    None => Vec::new(),
                };
                let reply = assistant.ask(message, &history).await?;
                Ok(json!({"reply": reply}))
            }

            _ => Err(KoraError::InvalidInput(format!(
                "method not found: {}",
                method
            ))),
        }
    }

    /// Default response for non-JSON requests
    fn node_info(&self) -> String {
        json!({
            "jsonrpc": "2.0",
            "result": {
                "name": self.ctx.node_name,
                "version": self.ctx.version,
                "methods_prefix": "kora_",
            },
            "id": 1
        })
        .to_string()
    }
}

// === Param helpers ===

fn str_param<'a>(params: &'a Value, key: &'static str) -> Result<&'a str, KoraError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or(KoraError::MissingField(key))
}

fn opt_str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

fn f64_param(params: &Value, key: &'static str) -> Result<f64, KoraError> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or(KoraError::MissingField(key))
}

fn uuid_param(params: &Value, key: &'static str) -> Result<Uuid, KoraError> {
    let raw = str_param(params, key)?;
    raw.parse()
        .map_err(|_| KoraError::InvalidInput(format!("{} is not a valid id", key)))
}

fn opt_uuid_param(params: &Value, key: &'static str) -> Result<Option<Uuid>, KoraError> {
    match opt_str_param(params, key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| KoraError::InvalidInput(format!("{} is not a valid id", key))),
        None => Ok(None),
    }
}

fn user_id_param(params: &Value, key: &'static str) -> Result<UserId, KoraError> {
    Ok(UserId::from_uuid(uuid_param(params, key)?))
}

fn orchestrator_param(params: &Value) -> Result<OrchestratorAddress, KoraError> {
    let raw = str_param(params, "orchestrator")?;
    OrchestratorAddress::from_hex(raw)
        .map_err(|e| KoraError::InvalidInput(format!("bad orchestrator address: {}", e)))
}

fn wallet_param(
    params: &Value,
    key: &'static str,
) -> Result<kora_core::WalletAddress, KoraError> {
    let raw = str_param(params, key)?;
    kora_core::WalletAddress::from_hex(raw)
        .map_err(|e| KoraError::InvalidInput(format!("bad wallet address: {}", e)))
}
