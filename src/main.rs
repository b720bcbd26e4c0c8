//! LifeLink matching node
//!
//! Opens the audit ledger, checks it and serves the JSON-RPC API.

use clap::Parser;
use lifelink_core::audit::AuditLog;
use lifelink_core::config::NodeConfig;
use lifelink_core::rpc::{start_rpc_server, RpcState};
use lifelink_core::service::{InMemoryDonorPool, MatchingService};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &NodeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = NodeConfig::parse();
    init_tracing(&config);

    let audit = match config.open_store()? {
        Some(store) => {
            info!(path = %config.data_dir.display(), "opening ledger store");
            AuditLog::open(store)?
        }
        None => {
            info!("running with an in-memory ledger");
            AuditLog::new()
        }
    };

    // A tampered chain is reported but the node keeps serving
    let report = audit.chain_report()?;
    if report.is_valid {
        info!(blocks = report.length, tip = ?report.tip_hash, "audit chain verified");
    } else {
        warn!(
            first_violation = ?report.first_violation,
            violation = ?report.violation,
            "audit chain failed verification"
        );
    }

    let service = MatchingService::new(Arc::new(InMemoryDonorPool::new()), audit);
    let state = Arc::new(RpcState::new(service));
    let addr = config.listen_addr();

    tokio::select! {
        result = start_rpc_server(state, &addr) => {
            if let Err(e) = result {
                error!(error = %e, "RPC server stopped");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping node");
        }
    }

    Ok(())
}
