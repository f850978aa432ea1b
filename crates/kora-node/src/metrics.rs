//! Prometheus metrics exporter

use crate::config::MetricsSettings;
use prometheus::{Counter, Encoder, Gauge, Registry, TextEncoder};
use std::io::Write;
use std::net::SocketAddr;

/// Node-wide counters and gauges, registered once at startup
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,

    pub delegations_submitted: Counter,
    pub delegations_failed: Counter,
    pub submissions_received: Counter,
    pub rpc_requests: Counter,
    pub rpc_failures: Counter,
    pub rpc_rate_limited: Counter,
    pub directory_refreshes: Counter,
    pub active_connections: Gauge,
}

impl NodeMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let delegations_submitted =
            Counter::new("kora_delegations_submitted_total", "Delegations attempted")?;
        let delegations_failed =
            Counter::new("kora_delegations_failed_total", "Delegations failed")?;
        let submissions_received =
            Counter::new("kora_submissions_received_total", "Marketplace submissions")?;
        let rpc_requests = Counter::new("kora_rpc_requests_total", "JSON-RPC requests")?;
        let rpc_failures = Counter::new("kora_rpc_failures_total", "JSON-RPC error responses")?;
        let rpc_rate_limited =
            Counter::new("kora_rpc_rate_limited_total", "JSON-RPC requests rate limited")?;
        let directory_refreshes =
            Counter::new("kora_directory_refreshes_total", "Orchestrator directory refreshes")?;
        let active_connections = Gauge::new("kora_rpc_active_connections", "Open RPC connections")?;

        registry.register(Box::new(delegations_submitted.clone()))?;
        registry.register(Box::new(delegations_failed.clone()))?;
        registry.register(Box::new(submissions_received.clone()))?;
        registry.register(Box::new(rpc_requests.clone()))?;
        registry.register(Box::new(rpc_failures.clone()))?;
        registry.register(Box::new(rpc_rate_limited.clone()))?;
        registry.register(Box::new(directory_refreshes.clone()))?;
        registry.register(Box::new(active_connections.clone()))?;

        Ok(Self {
            registry,
            delegations_submitted,
            delegations_failed,
            submissions_received,
            rpc_requests,
            rpc_failures,
            rpc_rate_limited,
            directory_refreshes,
            active_connections,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Plaintext Prometheus exporter
pub struct MetricsServer {
    config: MetricsSettings,
    registry: Registry,
}

impl MetricsServer {
    pub fn new(config: &MetricsSettings, metrics: &NodeMetrics) -> Self {
        Self {
            config: config.clone(),
            registry: metrics.registry().clone(),
        }
    }

    /// Run the exporter
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr: SocketAddr = self.config.listen_addr.parse()?;

        tracing::info!("Starting metrics exporter on {}", addr);

        let listener = std::net::TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;

        loop {
            match listener.accept() {
                Ok((mut stream, _)) => {
                    let registry = self.registry.clone();
                    tokio::task::spawn_blocking(move || {
                        let mut buf = [0u8; 1024];
                        if let Ok(n) = std::io::Read::read(&mut stream, &mut buf) {
                            let request = String::from_utf8_lossy(&buf[..n]);

                            let response = if request.contains("GET /metrics") {
                                let encoder = TextEncoder::new();
                                let families = registry.gather();
                                let mut buffer = Vec::new();
                                if encoder.encode(&families, &mut buffer).is_err() {
                                    buffer.clear();
                                }
                                format!(
                                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                                    buffer.len(),
                                    String::from_utf8_lossy(&buffer)
                                )
                            } else if request.contains("GET /health") {
                                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"status\":\"healthy\"}".to_string()
                            } else {
                                "HTTP/1.1 404 Not Found\r\n\r\n".to_string()
                            };

                            let _ = stream.write_all(response.as_bytes());
                        }
                    });
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_register_and_gather() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.delegations_submitted.inc();
        metrics.rpc_requests.inc();
        metrics.rpc_requests.inc();

        let families = metrics.registry().gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "kora_rpc_requests_total"));
    }
}
