//! Block-query JSON-RPC service for chainview nodes.
//!
//! Serves the same chain data in three API versions (legacy, structured and
//! Ethereum-compatible), each under its own namespace with its own
//! derived-data caches and admission gate.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainview_chain::ChainBackend;
//! use chainview_jsonrpc::{start_server, RpcConfig, RpcMetrics};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn serve<B: ChainBackend>(
//!     backend: Arc<B>,
//! ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = RpcConfig::from_file("rpc.yaml")?;
//!     let shutdown = CancellationToken::new();
//!     let handle = start_server(&config, backend, RpcMetrics::new(), shutdown).await?;
//!     handle.stopped().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod factory;
pub mod gate;
pub mod metrics;
pub mod server;
pub mod service;

// Re-export key types for convenience
pub use api::{EthBlockchainApiServer, LegacyBlockchainApiServer, V2BlockchainApiServer};
pub use config::{validate_config, RpcConfig};
pub use error::{ConfigError, RpcError, RpcResult};
pub use factory::{factory_for, BlockData, BlockFactory, EthFactory, LegacyV1Factory, V2Factory};
pub use gate::{AdmissionGate, DEFAULT_WAIT_TIMEOUT};
pub use metrics::RpcMetrics;
pub use server::{build_module, start_server, BlockchainRpc};
pub use service::{QueryService, MAX_BLOCK_RANGE};
