//! # Kora Node
//!
//! Wires the stores, services, chain client, and orchestrator directory
//! into one process, and exposes them over JSON-RPC plus a Prometheus
//! exporter.

pub mod config;
pub mod metrics;
pub mod node;
pub mod rpc_server;

pub use config::KoraConfig;
pub use metrics::{MetricsServer, NodeMetrics};
pub use node::{KoraNode, NodeContext, NodeState};
pub use rpc_server::RpcServer;
