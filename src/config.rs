//! Node configuration
//!
//! Scoring tables live in [`crate::constants`] and are not configurable.
//! Only deployment settings are read here, from flags or environment.

use clap::Parser;
use std::path::PathBuf;

use crate::storage::{LedgerStore, StorageError};

pub const DEFAULT_LOG_FILTER: &str = "lifelink_core=info,lifelink_node=info";

#[derive(Debug, Clone, Parser)]
#[command(name = "lifelink-node", version, about = "LifeLink donor matching node")]
pub struct NodeConfig {
    /// Address to bind the RPC server to
    #[arg(long, env = "LIFELINK_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// RPC port
    #[arg(long, env = "LIFELINK_PORT", default_value_t = 8545)]
    pub port: u16,

    /// Directory of the sled ledger database
    #[arg(long, env = "LIFELINK_DATA_DIR", default_value = "data/ledger")]
    pub data_dir: PathBuf,

    /// Keep the ledger in memory only
    #[arg(long)]
    pub in_memory: bool,

    /// Tracing filter used when RUST_LOG is not set
    #[arg(long, env = "LIFELINK_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl NodeConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Ledger store for this node, `None` when running in memory
    pub fn open_store(&self) -> Result<Option<LedgerStore>, StorageError> {
        if self.in_memory {
            return Ok(None);
        }
        LedgerStore::open(&self.data_dir).map(Some)
    }
}
