//! Storage module - ledger block persistence

pub mod db;

pub use db::{LedgerStore, StorageError};
