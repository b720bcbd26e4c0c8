//! JSON-RPC API Module
//!
//! Provides the HTTP interface hospitals and coordinators use to rank donors,
//! register them and inspect the audit chain.

mod methods;
mod server;

pub use methods::*;
pub use server::*;
